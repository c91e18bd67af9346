//! Settings store: option lists and the custom column schema.
//!
//! Settings persist as a flat key → JSON value map with upsert-by-key writes.
//! [`load`] merges that map with the built-in defaults and hands back a typed
//! [`Settings`]; [`save`] writes only the keys it is given.
//!
//! Two concurrent writers of the same key race and the last write wins.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::fields::{ColumnType, CustomValue};
use crate::{Error, Result};

/// Raw persisted settings.
pub type SettingsMap = BTreeMap<String, Value>;

pub const STATUS_OPTIONS: &str = "status_options";
pub const TYPE_OPTIONS: &str = "type_options";
pub const PRIORITY_OPTIONS: &str = "priority_options";
pub const PRODUCT_OPTIONS: &str = "product_options";
pub const MODULE_OPTIONS: &str = "module_options";
pub const CUSTOM_COLUMNS: &str = "custom_columns";

/// Built-in option lists, used whenever a key is missing from storage.
pub fn default_options() -> [(&'static str, &'static [&'static str]); 5] {
    [
        (STATUS_OPTIONS, &["Not Started", "In Progress", "Completed", "Pending from User", "On Hold"]),
        (TYPE_OPTIONS, &["Bug", "Feature", "Task"]),
        (PRIORITY_OPTIONS, &["Low", "Medium", "High", "Critical"]),
        (PRODUCT_OPTIONS, &["Finance", "Procurement", "OIC", "ROSS", "E-Invoice"]),
        (
            MODULE_OPTIONS,
            &["Authentication", "Dashboard", "Reports", "Settings", "User Management", "Task Management"],
        ),
    ]
}

/// A declared custom column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomColumn {
    pub name: String,
    #[serde(rename = "type", default)]
    pub column_type: ColumnType,
}

impl CustomColumn {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        CustomColumn { name: name.into(), column_type }
    }
}

/// Typed settings, always complete.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    pub status_options: Vec<String>,
    pub type_options: Vec<String>,
    pub priority_options: Vec<String>,
    pub product_options: Vec<String>,
    pub module_options: Vec<String>,
    pub custom_columns: Vec<CustomColumn>,
    /// Any other keys an operator stored.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Settings {
    /// Look up a declared custom column by name.
    pub fn custom_column(&self, name: &str) -> Option<&CustomColumn> {
        self.custom_columns.iter().find(|c| c.name == name)
    }

    /// Names of the declared custom columns, in declaration order.
    pub fn custom_column_names(&self) -> Vec<&str> {
        self.custom_columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Validate a custom-field write against the declared schema.
    pub fn coerce_custom_value(&self, name: &str, raw: &str) -> Result<CustomValue> {
        let column = self
            .custom_column(name)
            .ok_or_else(|| Error::InvalidInput(format!("unknown custom column '{name}'")))?;
        column.column_type.coerce(raw).ok_or_else(|| {
            Error::InvalidInput(format!(
                "'{}' is not a valid {} for column '{}'",
                raw.trim(),
                column.column_type,
                name
            ))
        })
    }
}

/// Normalise any stored shape of `custom_columns` into `{name, type}` records.
///
/// Bare strings become text columns; records keep their type (text when
/// missing); entries without a usable name are dropped. Anything that is not
/// a list normalises to an empty schema.
pub fn normalize_custom_columns(value: &Value) -> Vec<CustomColumn> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(name) => Some(CustomColumn::new(name.trim(), ColumnType::Text)),
            Value::Object(obj) => {
                let name = obj.get("name")?.as_str()?.trim();
                let column_type = obj
                    .get("type")
                    .and_then(Value::as_str)
                    .map(ColumnType::parse)
                    .unwrap_or_default();
                Some(CustomColumn::new(name, column_type))
            }
            _ => None,
        })
        .filter(|c| !c.name.is_empty())
        .collect()
}

fn columns_to_value(columns: &[CustomColumn]) -> Value {
    json!(columns)
}

fn option_list(value: Option<&Value>, default: &[&str]) -> Vec<String> {
    match value.and_then(Value::as_array) {
        Some(items) => items
            .iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        None => default.iter().map(|s| s.to_string()).collect(),
    }
}

/// Merge stored settings with the defaults.
///
/// Missing defaults (and a missing `custom_columns`) are written back into
/// `store`; the returned flag says whether the store changed and needs saving.
pub fn load(store: &mut SettingsMap) -> (Settings, bool) {
    let mut changed = false;

    for (key, default) in default_options() {
        if !store.contains_key(key) {
            debug!(key, "persisting default option list");
            store.insert(key.to_string(), json!(default));
            changed = true;
        }
    }
    if !store.contains_key(CUSTOM_COLUMNS) {
        store.insert(CUSTOM_COLUMNS.to_string(), json!([]));
        changed = true;
    }

    let [status, types, priority, product, module] = default_options();
    let settings = Settings {
        status_options: option_list(store.get(status.0), status.1),
        type_options: option_list(store.get(types.0), types.1),
        priority_options: option_list(store.get(priority.0), priority.1),
        product_options: option_list(store.get(product.0), product.1),
        module_options: option_list(store.get(module.0), module.1),
        custom_columns: store.get(CUSTOM_COLUMNS).map(normalize_custom_columns).unwrap_or_default(),
        extra: store
            .iter()
            .filter(|(k, _)| !is_known_key(k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    };
    (settings, changed)
}

fn is_known_key(key: &str) -> bool {
    key == CUSTOM_COLUMNS || default_options().iter().any(|(k, _)| *k == key)
}

/// Upsert every key of `data` into `store`, normalising `custom_columns` first.
/// Keys not present in `data` are left as they are.
pub fn save(store: &mut SettingsMap, mut data: Map<String, Value>) {
    if let Some(columns) = data.get(CUSTOM_COLUMNS) {
        let normalized = columns_to_value(&normalize_custom_columns(columns));
        data.insert(CUSTOM_COLUMNS.to_string(), normalized);
    }
    for (key, value) in data {
        debug!(%key, "upserting setting");
        store.insert(key, value);
    }
}

/// Declare a new custom column, replacing the type of an existing one.
pub fn add_custom_column(store: &mut SettingsMap, column: CustomColumn) -> Settings {
    let (settings, _) = load(store);
    let mut columns = settings.custom_columns;
    match columns.iter_mut().find(|c| c.name == column.name) {
        Some(existing) => existing.column_type = column.column_type,
        None => columns.push(column),
    }
    let mut data = Map::new();
    data.insert(CUSTOM_COLUMNS.to_string(), columns_to_value(&columns));
    save(store, data);
    load(store).0
}

/// Drop a custom column from the schema. Values already stored on tasks are kept.
pub fn remove_custom_column(store: &mut SettingsMap, name: &str) -> Result<Settings> {
    let (settings, _) = load(store);
    if settings.custom_column(name).is_none() {
        return Err(Error::NotFound(format!("Custom column '{name}' not found")));
    }
    let columns: Vec<CustomColumn> = settings.custom_columns.into_iter().filter(|c| c.name != name).collect();
    let mut data = Map::new();
    data.insert(CUSTOM_COLUMNS.to_string(), columns_to_value(&columns));
    save(store, data);
    Ok(load(store).0)
}

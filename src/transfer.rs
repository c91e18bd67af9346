//! CSV import and export of the full task set.
//!
//! Export writes every stored field, the three due flags as of export time,
//! and one column per custom field. Import is destructive: the imported rows
//! replace every task in the pad, archived ones included.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::csv::{parse_records, write_record};
use crate::dates::{normalize_date, DateInput};
use crate::db::{next_id_for, Database};
use crate::fields::{CustomValue, Status};
use crate::settings::Settings;
use crate::task::Task;
use crate::{Error, Result};

pub const COL_ID: &str = "ID";
pub const COL_TYPE: &str = "Type";
pub const COL_PRODUCT: &str = "Product";
pub const COL_MODULE: &str = "Module";
pub const COL_DESCRIPTION: &str = "Description";
pub const COL_STATUS: &str = "Status";
pub const COL_PRIORITY: &str = "Priority";
pub const COL_CREATED: &str = "Created Date";
pub const COL_DUE: &str = "Due Date";
pub const COL_STATUS_UPDATE: &str = "Status Update Date";
pub const COL_PLAN_STATUS: &str = "Action Plan Status";
pub const COL_PLAN: &str = "Current Action Plan";
pub const COL_HISTORY: &str = "Action Plan History";
pub const COL_CATEGORY: &str = "Category";

/// Stored task fields, in export order.
pub const STANDARD_COLUMNS: [&str; 14] = [
    COL_ID,
    COL_TYPE,
    COL_PRODUCT,
    COL_MODULE,
    COL_DESCRIPTION,
    COL_STATUS,
    COL_PRIORITY,
    COL_CREATED,
    COL_DUE,
    COL_STATUS_UPDATE,
    COL_PLAN_STATUS,
    COL_PLAN,
    COL_HISTORY,
    COL_CATEGORY,
];

/// Derived columns: written on export, ignored on import.
pub const FLAG_COLUMNS: [&str; 3] = ["is_overdue", "due_soon", "due_today"];

/// Default export file name.
pub const DEFAULT_EXPORT_FILE: &str = "tasks_export.csv";

/// Outcome of an import.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct ImportReport {
    pub imported: usize,
    /// Rows that arrived without an ID and were given the next sequential one.
    pub assigned_ids: usize,
}

fn date_cell(d: Option<NaiveDate>) -> String {
    d.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
}

fn text_cell(s: &Option<String>) -> String {
    s.clone().unwrap_or_default()
}

/// Custom column names for export: the declared schema first, then any other
/// keys present on the tasks.
fn custom_columns_for(tasks: &[&Task], settings: &Settings) -> Vec<String> {
    let mut columns: Vec<String> = settings.custom_columns.iter().map(|c| c.name.clone()).collect();
    let extra: BTreeSet<&String> = tasks
        .iter()
        .flat_map(|t| t.custom_fields.keys())
        .filter(|k| !columns.contains(*k))
        .collect();
    columns.extend(extra.into_iter().cloned());
    columns
}

/// Serialise tasks to CSV text.
pub fn export_csv(tasks: &[&Task], settings: &Settings, today: NaiveDate) -> Result<String> {
    if tasks.is_empty() {
        return Err(Error::NoData("No data to export".into()));
    }
    let custom = custom_columns_for(tasks, settings);

    let mut header: Vec<&str> = STANDARD_COLUMNS.to_vec();
    header.extend(FLAG_COLUMNS);
    header.extend(custom.iter().map(String::as_str));

    let mut out = write_record(&header);
    out.push('\n');
    for task in tasks {
        let flags = task.due_flags(today);
        let mut row = vec![
            task.id.clone(),
            text_cell(&task.task_type),
            text_cell(&task.product),
            text_cell(&task.module),
            text_cell(&task.description),
            task.status.to_string(),
            text_cell(&task.priority),
            date_cell(task.created_date),
            date_cell(task.due_date),
            date_cell(task.status_update_date),
            text_cell(&task.action_plan_status),
            text_cell(&task.current_action_plan),
            task.action_plan_history.clone(),
            text_cell(&task.category),
            flags.is_overdue.to_string(),
            flags.due_soon.to_string(),
            flags.due_today.to_string(),
        ];
        row.extend(
            custom
                .iter()
                .map(|name| task.custom_fields.get(name).map(|v| v.to_string()).unwrap_or_default()),
        );
        out.push_str(&write_record(&row));
        out.push('\n');
    }
    Ok(out)
}

/// Reject anything that is not a `.csv` file before touching the pad.
pub fn validate_import_path(path: &Path) -> Result<()> {
    let is_csv = path.file_name().and_then(|n| n.to_str()).is_some_and(|n| n.ends_with(".csv"));
    if is_csv {
        Ok(())
    } else {
        Err(Error::InvalidFormat("Invalid file format".into()))
    }
}

/// Parse CSV text into tasks. Does not touch any pad.
///
/// Rows with an empty ID, or repeating an ID seen on an earlier row, get the
/// next sequential ID. Also returns how many rows were given a fresh ID.
pub fn parse_tasks(content: &str, settings: &Settings) -> (Vec<Task>, usize) {
    let mut records = parse_records(content).into_iter();
    let Some(header) = records.next() else {
        return (Vec::new(), 0);
    };
    let header: Vec<String> = header.into_iter().map(|h| h.trim().to_string()).collect();

    let mut tasks: Vec<Task> = Vec::new();
    let mut pending_ids = Vec::new();
    let mut seen = HashSet::new();
    for record in records {
        let cells: HashMap<&str, &str> = header
            .iter()
            .map(String::as_str)
            .zip(record.iter().map(String::as_str))
            .collect();
        let task = task_from_row(&cells, settings);
        if task.id.is_empty() {
            pending_ids.push(tasks.len());
        } else if !seen.insert(task.id.clone()) {
            warn!(id = %task.id, "duplicate ID in import, assigning a new one");
            pending_ids.push(tasks.len());
        }
        tasks.push(task);
    }

    for &index in &pending_ids {
        let id = next_id_for(&tasks);
        tasks[index].id = id;
    }
    (tasks, pending_ids.len())
}

fn task_from_row(cells: &HashMap<&str, &str>, settings: &Settings) -> Task {
    let text = |col: &str| -> Option<String> {
        cells.get(col).filter(|v| !v.is_empty()).map(|v| v.to_string())
    };
    let date = |col: &str| normalize_date(&DateInput::from(cells.get(col).copied()));

    let mut task = Task::new(cells.get(COL_ID).map(|s| s.trim()).unwrap_or(""));
    task.task_type = text(COL_TYPE);
    task.product = text(COL_PRODUCT);
    task.module = text(COL_MODULE);
    task.description = text(COL_DESCRIPTION);
    task.status = text(COL_STATUS).map(Status::from).unwrap_or_default();
    task.priority = text(COL_PRIORITY);
    task.created_date = date(COL_CREATED);
    task.due_date = date(COL_DUE);
    task.status_update_date = date(COL_STATUS_UPDATE);
    task.action_plan_status = text(COL_PLAN_STATUS);
    task.current_action_plan = text(COL_PLAN);
    task.action_plan_history = text(COL_HISTORY).unwrap_or_default();
    task.category = text(COL_CATEGORY);

    for (&column, &raw) in cells {
        if raw.is_empty() || STANDARD_COLUMNS.contains(&column) || FLAG_COLUMNS.contains(&column) {
            continue;
        }
        let value = match settings.custom_column(column) {
            Some(declared) => declared.column_type.coerce(raw).unwrap_or_else(|| {
                warn!(column, raw, "value does not match declared column type, keeping as text");
                CustomValue::Text(raw.to_string())
            }),
            None => CustomValue::Text(raw.to_string()),
        };
        task.custom_fields.insert(column.to_string(), value);
    }
    task
}

/// Import a CSV file, replacing every task in `db`.
pub fn import_file(db: &mut Database, path: &Path) -> Result<ImportReport> {
    validate_import_path(path)?;
    let content = fs::read_to_string(path)?;
    let settings = db.settings();
    let (tasks, assigned_ids) = parse_tasks(&content, &settings);
    let report = ImportReport { imported: tasks.len(), assigned_ids };
    db.replace_tasks(tasks);
    info!(imported = report.imported, path = %path.display(), "imported tasks");
    Ok(report)
}

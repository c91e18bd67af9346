//! Enumerations and field types for task records.
//!
//! This module defines the task status, the declared types of custom columns
//! and the typed values stored in a task's custom fields.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::normalize_text;

/// Task lifecycle status.
///
/// The built-in statuses are closed variants; operators can add their own to
/// `status_options`, which land in [`Status::Other`]. `Deleted` is the
/// archive state and is never offered as a regular option.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    #[default]
    NotStarted,
    InProgress,
    Completed,
    PendingFromUser,
    OnHold,
    Deleted,
    Other(String),
}

impl Status {
    /// Display label, as stored and as shown in option lists.
    pub fn label(&self) -> &str {
        match self {
            Status::NotStarted => "Not Started",
            Status::InProgress => "In Progress",
            Status::Completed => "Completed",
            Status::PendingFromUser => "Pending from User",
            Status::OnHold => "On Hold",
            Status::Deleted => "Deleted",
            Status::Other(s) => s,
        }
    }

    /// Parse a label. Matching is exact on the trimmed text, so any unknown
    /// label is kept verbatim as [`Status::Other`].
    pub fn parse(s: &str) -> Status {
        match s.trim() {
            "Not Started" => Status::NotStarted,
            "In Progress" => Status::InProgress,
            "Completed" => Status::Completed,
            "Pending from User" => Status::PendingFromUser,
            "On Hold" => Status::OnHold,
            "Deleted" => Status::Deleted,
            other => Status::Other(other.to_string()),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Status::Completed)
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, Status::Deleted)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for Status {
    fn from(s: String) -> Self {
        Status::parse(&s)
    }
}

impl From<&str> for Status {
    fn from(s: &str) -> Self {
        Status::parse(s)
    }
}

impl From<Status> for String {
    fn from(s: Status) -> Self {
        s.label().to_string()
    }
}

/// Declared type of a custom column.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ColumnType {
    #[default]
    Text,
    Number,
    Date,
    Boolean,
    /// A type this version does not know; values are kept as text.
    Other(String),
}

impl ColumnType {
    pub fn label(&self) -> &str {
        match self {
            ColumnType::Text => "text",
            ColumnType::Number => "number",
            ColumnType::Date => "date",
            ColumnType::Boolean => "boolean",
            ColumnType::Other(s) => s,
        }
    }

    pub fn parse(s: &str) -> ColumnType {
        match s.trim().to_lowercase().as_str() {
            "" | "text" => ColumnType::Text,
            "number" => ColumnType::Number,
            "date" => ColumnType::Date,
            "boolean" | "bool" | "checkbox" => ColumnType::Boolean,
            _ => ColumnType::Other(s.trim().to_string()),
        }
    }

    /// Convert raw text into a value of this type.
    /// Returns `None` when the text does not fit the type.
    pub fn coerce(&self, raw: &str) -> Option<CustomValue> {
        let raw = raw.trim();
        match self {
            ColumnType::Text | ColumnType::Other(_) => Some(CustomValue::Text(raw.to_string())),
            ColumnType::Number => raw.parse::<f64>().ok().filter(|n| n.is_finite()).map(CustomValue::Number),
            ColumnType::Date => normalize_text(raw).map(CustomValue::Date),
            ColumnType::Boolean => match raw.to_lowercase().as_str() {
                "true" | "yes" | "y" | "1" => Some(CustomValue::Bool(true)),
                "false" | "no" | "n" | "0" => Some(CustomValue::Bool(false)),
                _ => None,
            },
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for ColumnType {
    fn from(s: String) -> Self {
        ColumnType::parse(&s)
    }
}

impl From<ColumnType> for String {
    fn from(t: ColumnType) -> Self {
        t.label().to_string()
    }
}

/// A typed custom-field value.
///
/// Variant order matters for untagged deserialisation: an ISO date string is
/// read back as a date before falling through to text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CustomValue {
    Bool(bool),
    Number(f64),
    Date(NaiveDate),
    Text(String),
}

impl fmt::Display for CustomValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CustomValue::Bool(b) => write!(f, "{b}"),
            CustomValue::Number(n) => write!(f, "{n}"),
            CustomValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            CustomValue::Text(s) => f.write_str(s),
        }
    }
}

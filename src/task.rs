//! Task data structure and its read-time due flags.
//!
//! This module defines the `Task` record as it is stored, and `TaskView`, the
//! shape every read path hands to the presentation layer. Due flags live only
//! on the view and are computed against the date passed in at read time.

use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::fields::*;
use crate::{Error, Result};

/// A tracked work item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    #[serde(rename = "type")]
    pub task_type: Option<String>,
    pub product: Option<String>,
    pub module: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub status: Status,
    pub priority: Option<String>,
    pub created_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub status_update_date: Option<NaiveDate>,
    pub action_plan_status: Option<String>,
    pub current_action_plan: Option<String>,
    #[serde(default)]
    pub action_plan_history: String,
    pub category: Option<String>,
    #[serde(default)]
    pub custom_fields: BTreeMap<String, CustomValue>,
    pub created_at_utc: i64,
    pub updated_at_utc: i64,
}

impl Task {
    /// Create an empty task with the given ID and default status.
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now().timestamp();
        Task {
            id: id.into(),
            task_type: None,
            product: None,
            module: None,
            description: None,
            status: Status::NotStarted,
            priority: None,
            created_date: None,
            due_date: None,
            status_update_date: None,
            action_plan_status: None,
            current_action_plan: None,
            action_plan_history: String::new(),
            category: None,
            custom_fields: BTreeMap::new(),
            created_at_utc: now,
            updated_at_utc: now,
        }
    }

    /// Bump the update timestamp.
    pub fn touch(&mut self) {
        self.updated_at_utc = Utc::now().timestamp();
    }

    /// Due flags as of `today`.
    pub fn due_flags(&self, today: NaiveDate) -> DueFlags {
        DueFlags::compute(self.due_date, &self.status, today)
    }

    /// Soft-delete: move the task into the archive.
    pub fn archive(&mut self) {
        self.status = Status::Deleted;
        self.touch();
    }

    /// Bring an archived task back as `Not Started`.
    pub fn restore(&mut self) -> Result<()> {
        if !self.status.is_deleted() {
            return Err(Error::NotFound("Task not found or not deleted".into()));
        }
        self.status = Status::NotStarted;
        self.touch();
        Ok(())
    }

    /// Read-side view with due flags computed for `today`.
    pub fn view(&self, today: NaiveDate) -> TaskView<'_> {
        TaskView {
            task: self,
            flags: self.due_flags(today),
        }
    }
}

/// Temporal flags derived from a task's due date and status.
///
/// At most one flag is set. A completed task, or one without a due date, has
/// none.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DueFlags {
    pub is_overdue: bool,
    pub due_today: bool,
    pub due_soon: bool,
}

impl DueFlags {
    /// Window, in days after today, that counts as "due soon".
    pub const SOON_DAYS: i64 = 3;

    pub fn compute(due_date: Option<NaiveDate>, status: &Status, today: NaiveDate) -> Self {
        let mut flags = DueFlags::default();
        let Some(due) = due_date else {
            return flags;
        };
        if status.is_completed() {
            return flags;
        }
        let days = (due - today).num_days();
        if days < 0 {
            flags.is_overdue = true;
        } else if days == 0 {
            flags.due_today = true;
        } else if days <= Self::SOON_DAYS {
            flags.due_soon = true;
        }
        flags
    }

    /// Short label for tables: "overdue", "today", "soon" or "".
    pub fn label(&self) -> &'static str {
        if self.is_overdue {
            "overdue"
        } else if self.due_today {
            "today"
        } else if self.due_soon {
            "soon"
        } else {
            ""
        }
    }
}

/// A task together with its due flags, as handed to every reader.
#[derive(Debug, Clone, Serialize)]
pub struct TaskView<'a> {
    #[serde(flatten)]
    pub task: &'a Task,
    #[serde(flatten)]
    pub flags: DueFlags,
}

/// A field-level partial edit. `None` leaves a field untouched; for optional
/// fields `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub task_type: Option<Option<String>>,
    pub product: Option<Option<String>>,
    pub module: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub status: Option<Status>,
    pub priority: Option<Option<String>>,
    pub created_date: Option<Option<NaiveDate>>,
    pub due_date: Option<Option<NaiveDate>>,
    pub status_update_date: Option<Option<NaiveDate>>,
    pub action_plan_status: Option<Option<String>>,
    pub current_action_plan: Option<Option<String>>,
    pub action_plan_history: Option<String>,
    pub category: Option<Option<String>>,
    pub custom_fields: BTreeMap<String, CustomValue>,
}

impl TaskPatch {
    /// Apply every set field to `task`. Custom fields are merged, not replaced.
    pub fn apply(self, task: &mut Task) {
        if let Some(v) = self.task_type {
            task.task_type = v;
        }
        if let Some(v) = self.product {
            task.product = v;
        }
        if let Some(v) = self.module {
            task.module = v;
        }
        if let Some(v) = self.description {
            task.description = v;
        }
        if let Some(v) = self.status {
            task.status = v;
        }
        if let Some(v) = self.priority {
            task.priority = v;
        }
        if let Some(v) = self.created_date {
            task.created_date = v;
        }
        if let Some(v) = self.due_date {
            task.due_date = v;
        }
        if let Some(v) = self.status_update_date {
            task.status_update_date = v;
        }
        if let Some(v) = self.action_plan_status {
            task.action_plan_status = v;
        }
        if let Some(v) = self.current_action_plan {
            task.current_action_plan = v;
        }
        if let Some(v) = self.action_plan_history {
            task.action_plan_history = v;
        }
        if let Some(v) = self.category {
            task.category = v;
        }
        task.custom_fields.extend(self.custom_fields);
        task.touch();
    }

    pub fn is_empty(&self) -> bool {
        self.task_type.is_none()
            && self.product.is_none()
            && self.module.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.created_date.is_none()
            && self.due_date.is_none()
            && self.status_update_date.is_none()
            && self.action_plan_status.is_none()
            && self.current_action_plan.is_none()
            && self.action_plan_history.is_none()
            && self.category.is_none()
            && self.custom_fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 10).unwrap()
    }

    fn due_in(days: i64, status: Status) -> Task {
        let mut t = Task::new("T001");
        t.due_date = Some(today() + Duration::days(days));
        t.status = status;
        t
    }

    #[test]
    fn test_completed_task_has_no_flags() {
        for days in [-10, -1, 0, 1, 3, 10] {
            let flags = due_in(days, Status::Completed).due_flags(today());
            assert_eq!(flags, DueFlags::default(), "days={days}");
        }
    }

    #[test]
    fn test_due_today_sets_only_due_today() {
        let flags = due_in(0, Status::InProgress).due_flags(today());
        assert!(flags.due_today);
        assert!(!flags.is_overdue);
        assert!(!flags.due_soon);
    }

    #[test]
    fn test_overdue_and_due_soon_window() {
        assert!(due_in(-1, Status::NotStarted).due_flags(today()).is_overdue);
        for days in 1..=3 {
            let flags = due_in(days, Status::NotStarted).due_flags(today());
            assert!(flags.due_soon, "days={days}");
            assert!(!flags.is_overdue && !flags.due_today);
        }
        assert_eq!(due_in(4, Status::NotStarted).due_flags(today()), DueFlags::default());
    }

    #[test]
    fn test_no_due_date_no_flags() {
        let t = Task::new("T001");
        assert_eq!(t.due_flags(today()), DueFlags::default());
    }

    #[test]
    fn test_flags_follow_the_read_date() {
        let t = due_in(2, Status::NotStarted);
        assert!(t.due_flags(today()).due_soon);
        assert!(t.due_flags(today() + Duration::days(2)).due_today);
        assert!(t.due_flags(today() + Duration::days(5)).is_overdue);
    }

    #[test]
    fn test_view_serialises_flags_flat() {
        let t = due_in(-2, Status::OnHold);
        let json = serde_json::to_value(t.view(today())).unwrap();
        assert_eq!(json["id"], "T001");
        assert_eq!(json["status"], "On Hold");
        assert_eq!(json["is_overdue"], true);
        assert_eq!(json["due_soon"], false);
    }

    #[test]
    fn test_archive_and_restore() {
        let mut t = Task::new("T001");
        t.status = Status::InProgress;
        assert!(t.restore().is_err());
        t.archive();
        assert_eq!(t.status, Status::Deleted);
        t.restore().unwrap();
        assert_eq!(t.status, Status::NotStarted);
    }

    #[test]
    fn test_patch_applies_only_set_fields() {
        let mut t = Task::new("T001");
        t.product = Some("Finance".into());
        t.category = Some("Ops".into());
        let patch = TaskPatch {
            product: Some(Some("OIC".into())),
            category: Some(None),
            ..Default::default()
        };
        patch.apply(&mut t);
        assert_eq!(t.product.as_deref(), Some("OIC"));
        assert_eq!(t.category, None);
        assert_eq!(t.status, Status::NotStarted);
    }
}

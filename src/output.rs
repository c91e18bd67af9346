//! Human and JSON rendering for the CLI.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{json, Map, Value};

use progresspad::action_plan::parse_history;
use progresspad::task::Task;
use progresspad::Result;

/// Where command results go: a table for people or JSON for scripts.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
}

impl Output {
    /// Report a successful mutation.
    ///
    /// JSON mode prints `{"status":"success","message":..}` merged with `extra`.
    pub fn success(&self, message: &str, extra: Value) -> Result<()> {
        if self.json {
            let mut body = Map::new();
            body.insert("status".into(), json!("success"));
            body.insert("message".into(), json!(message));
            if let Value::Object(fields) = extra {
                body.extend(fields);
            }
            println!("{}", serde_json::to_string_pretty(&Value::Object(body))?);
        } else {
            println!("{message}");
        }
        Ok(())
    }

    /// Print `value` as JSON, or run `human` to print it for people.
    pub fn data<T: Serialize>(&self, value: &T, human: impl FnOnce()) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            human();
        }
        Ok(())
    }
}

/// Render a failure for the current mode.
pub fn render_error(json: bool, message: &str) {
    if json {
        println!("{}", json!({"status": "error", "message": message}));
    } else {
        eprintln!("Error: {message}");
    }
}

/// Format a due date relative to today ("today", "tomorrow", "in 3d", "2d late").
pub fn format_due_relative(due: Option<NaiveDate>, today: NaiveDate) -> String {
    match due {
        None => "-".into(),
        Some(d) => match (d - today).num_days() {
            0 => "today".into(),
            1 => "tomorrow".into(),
            n if n > 1 => format!("in {n}d"),
            n => format!("{}d late", -n),
        },
    }
}

/// Truncate a string to a maximum width, adding an ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn or_dash(s: &Option<String>) -> &str {
    s.as_deref().filter(|s| !s.is_empty()).unwrap_or("-")
}

fn date_or_dash(d: Option<NaiveDate>) -> String {
    d.map(|d| d.to_string()).unwrap_or_else(|| "-".into())
}

/// Print tasks as an aligned table.
pub fn print_table(tasks: &[&Task], today: NaiveDate) {
    println!(
        "{:<6} {:<18} {:<9} {:<11} {:<8} {:<12} {}",
        "ID", "Status", "Priority", "Due", "Flag", "Product", "Description"
    );
    for t in tasks {
        println!(
            "{:<6} {:<18} {:<9} {:<11} {:<8} {:<12} {}",
            t.id,
            truncate(t.status.label(), 18),
            truncate(or_dash(&t.priority), 9),
            format_due_relative(t.due_date, today),
            t.due_flags(today).label(),
            truncate(or_dash(&t.product), 12),
            or_dash(&t.description)
        );
    }
}

/// Print every field of one task, its custom fields and its plan history.
pub fn print_task(task: &Task, today: NaiveDate) {
    let flags = task.due_flags(today);
    println!("ID:                 {}", task.id);
    println!("Type:               {}", or_dash(&task.task_type));
    println!("Product:            {}", or_dash(&task.product));
    println!("Module:             {}", or_dash(&task.module));
    println!("Category:           {}", or_dash(&task.category));
    println!("Status:             {}", task.status);
    println!("Priority:           {}", or_dash(&task.priority));
    println!("Created:            {}", date_or_dash(task.created_date));
    match task.due_date {
        Some(d) => println!("Due:                {d} ({})", format_due_relative(Some(d), today)),
        None => println!("Due:                -"),
    }
    if !flags.label().is_empty() {
        println!("Flag:               {}", flags.label());
    }
    println!("Status updated:     {}", date_or_dash(task.status_update_date));
    println!("Action plan status: {}", or_dash(&task.action_plan_status));
    for (name, value) in &task.custom_fields {
        println!("{:<19} {}", format!("{name}:"), value);
    }
    println!("Description:\n{}\n", or_dash(&task.description));
    println!("Current action plan:\n{}\n", or_dash(&task.current_action_plan));

    let history = parse_history(&task.action_plan_history);
    if history.is_empty() {
        println!("History: -");
        return;
    }
    println!("History:");
    for entry in history {
        let stamp = match (entry.date, entry.standup) {
            (Some(d), true) => format!("[STANDUP {d}]"),
            (Some(d), false) => format!("[{d}]"),
            (None, _) => "[undated]".to_string(),
        };
        println!("  {stamp}");
        for line in entry.text.lines() {
            println!("    {line}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 10).unwrap()
    }

    #[test]
    fn test_format_due_relative() {
        assert_eq!(format_due_relative(None, today()), "-");
        assert_eq!(format_due_relative(NaiveDate::from_ymd_opt(2025, 6, 10), today()), "today");
        assert_eq!(format_due_relative(NaiveDate::from_ymd_opt(2025, 6, 11), today()), "tomorrow");
        assert_eq!(format_due_relative(NaiveDate::from_ymd_opt(2025, 6, 15), today()), "in 5d");
        assert_eq!(format_due_relative(NaiveDate::from_ymd_opt(2025, 6, 8), today()), "2d late");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Pending from User", 8), "Pending…");
    }
}

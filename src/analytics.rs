//! Aggregate views over a task collection.
//!
//! Everything here is computed on demand from the tasks passed in and never
//! stored. Callers hand in the active (non-archived) tasks.
//!
//! Missing dimension values group under [`UNKNOWN`] in [`Analytics`] but under
//! [`UNCATEGORIZED`] in [`StandupMetrics`]; the two labels are not
//! interchangeable.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::csv::write_record;
use crate::fields::Status;
use crate::task::Task;

/// Group label for a missing value in analytics.
pub const UNKNOWN: &str = "Unknown";
/// Group label for a missing category in standup metrics.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Trailing window for the average-tasks-per-day figure.
pub const THROUGHPUT_WINDOW_DAYS: i64 = 30;
/// Trailing window for "completed this week".
pub const WEEK_DAYS: i64 = 7;

/// Round to one decimal place, halves to even.
fn round1(x: f64) -> f64 {
    (x * 10.0).round_ties_even() / 10.0
}

/// `completed / total` as a percentage with one decimal, 0 for an empty group.
pub fn completion_rate(completed: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round1(completed as f64 / total as f64 * 100.0)
}

fn label_or(value: Option<&str>, fallback: &'static str) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => fallback.to_string(),
    }
}

/// Totals for one value of one dimension.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupStats {
    pub total: usize,
    pub completed: usize,
    pub completion_rate: f64,
}

/// Value → stats for one dimension, ordered by value.
pub type Breakdown = BTreeMap<String, GroupStats>;

/// Analytics snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Analytics {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub in_progress_tasks: usize,
    pub not_started_tasks: usize,
    pub on_hold_tasks: usize,
    pub overdue_tasks: usize,
    pub tasks_by_type: Breakdown,
    pub tasks_by_category: Breakdown,
    pub tasks_by_product: Breakdown,
    pub tasks_by_module: Breakdown,
    pub tasks_by_priority: Breakdown,
    /// Completed tasks counted by their created date.
    pub completion_trend: BTreeMap<String, usize>,
    pub overall_completion_rate: f64,
    pub avg_tasks_per_day: f64,
}

impl Analytics {
    pub fn compute(tasks: &[&Task], today: NaiveDate) -> Self {
        let mut a = Analytics { total_tasks: tasks.len(), ..Default::default() };

        for task in tasks {
            let completed = task.status.is_completed();
            match task.status {
                Status::Completed => a.completed_tasks += 1,
                Status::InProgress => a.in_progress_tasks += 1,
                Status::NotStarted => a.not_started_tasks += 1,
                Status::OnHold => a.on_hold_tasks += 1,
                _ => {}
            }
            if task.due_flags(today).is_overdue {
                a.overdue_tasks += 1;
            }

            for (breakdown, value) in [
                (&mut a.tasks_by_type, task.task_type.as_deref()),
                (&mut a.tasks_by_category, task.category.as_deref()),
                (&mut a.tasks_by_product, task.product.as_deref()),
                (&mut a.tasks_by_module, task.module.as_deref()),
                (&mut a.tasks_by_priority, task.priority.as_deref()),
            ] {
                let group = breakdown.entry(label_or(value, UNKNOWN)).or_default();
                group.total += 1;
                if completed {
                    group.completed += 1;
                }
            }

            if completed {
                if let Some(created) = task.created_date {
                    *a.completion_trend.entry(created.format("%Y-%m-%d").to_string()).or_default() += 1;
                }
            }
        }

        for breakdown in [
            &mut a.tasks_by_type,
            &mut a.tasks_by_category,
            &mut a.tasks_by_product,
            &mut a.tasks_by_module,
            &mut a.tasks_by_priority,
        ] {
            for group in breakdown.values_mut() {
                group.completion_rate = completion_rate(group.completed, group.total);
            }
        }

        a.overall_completion_rate = completion_rate(a.completed_tasks, a.total_tasks);

        let window_start = today - Duration::days(THROUGHPUT_WINDOW_DAYS);
        let recent = tasks
            .iter()
            .filter(|t| t.created_date.is_some_and(|d| d >= window_start))
            .count();
        a.avg_tasks_per_day = if recent == 0 {
            0.0
        } else {
            round1(recent as f64 / THROUGHPUT_WINDOW_DAYS as f64)
        };

        a
    }
}

/// Headline counts for the task list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub completed: usize,
    pub in_progress: usize,
    pub overdue: usize,
    pub total: usize,
}

impl Summary {
    pub fn compute(tasks: &[&Task], today: NaiveDate) -> Self {
        Summary {
            completed: tasks.iter().filter(|t| t.status.is_completed()).count(),
            in_progress: tasks.iter().filter(|t| t.status == Status::InProgress).count(),
            overdue: tasks.iter().filter(|t| t.due_flags(today).is_overdue).count(),
            total: tasks.len(),
        }
    }
}

/// Per-category counts for the standup view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryStandup {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
}

/// Metrics shown at the daily standup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StandupMetrics {
    /// Completed tasks created within the last week.
    pub completed_this_week: usize,
    /// IDs of overdue tasks.
    pub overdue_tasks: Vec<String>,
    /// Open tasks at High or Critical priority.
    pub high_priority_open: usize,
    pub tasks_by_category: BTreeMap<String, CategoryStandup>,
}

impl StandupMetrics {
    pub fn compute(tasks: &[&Task], today: NaiveDate) -> Self {
        let week_ago = today - Duration::days(WEEK_DAYS);
        let mut m = StandupMetrics::default();

        for task in tasks {
            let completed = task.status.is_completed();
            if completed && task.created_date.is_some_and(|d| d >= week_ago) {
                m.completed_this_week += 1;
            }
            if task.due_flags(today).is_overdue {
                m.overdue_tasks.push(task.id.clone());
            }
            if !completed && matches!(task.priority.as_deref(), Some("High" | "Critical")) {
                m.high_priority_open += 1;
            }

            let group = m
                .tasks_by_category
                .entry(label_or(task.category.as_deref(), UNCATEGORIZED))
                .or_default();
            group.total += 1;
            if completed {
                group.completed += 1;
            } else if task.status == Status::InProgress {
                group.in_progress += 1;
            }
        }
        m
    }
}

/// Render the analytics report as CSV.
pub fn report_csv(a: &Analytics, generated_at: NaiveDateTime) -> String {
    let mut out = String::new();
    let mut row = |cells: &[&str]| {
        out.push_str(&write_record(cells));
        out.push('\n');
    };

    row(&["ProgressPad Analytics Report"]);
    let generated = generated_at.format("%Y-%m-%d %H:%M:%S").to_string();
    row(&["Generated on", generated.as_str()]);
    row(&[]);

    row(&["SUMMARY METRICS"]);
    row(&["Metric", "Value"]);
    for (label, value) in [
        ("Total Tasks", a.total_tasks),
        ("Completed Tasks", a.completed_tasks),
        ("In Progress Tasks", a.in_progress_tasks),
        ("Not Started Tasks", a.not_started_tasks),
        ("On Hold Tasks", a.on_hold_tasks),
        ("Overdue Tasks", a.overdue_tasks),
    ] {
        row(&[label, value.to_string().as_str()]);
    }
    row(&["Overall Completion Rate (%)", format_rate(a.overall_completion_rate).as_str()]);
    row(&[]);

    let sections: [(&str, &str, &Breakdown); 4] = [
        ("PRODUCT PERFORMANCE", "Product", &a.tasks_by_product),
        ("MODULE PERFORMANCE", "Module", &a.tasks_by_module),
        ("PRIORITY DISTRIBUTION", "Priority", &a.tasks_by_priority),
        ("TASK TYPES", "Type", &a.tasks_by_type),
    ];
    let count = sections.len();
    for (i, (heading, label, breakdown)) in sections.into_iter().enumerate() {
        row(&[heading]);
        row(&[label, "Total Tasks", "Completed", "Completion Rate (%)"]);
        for (value, stats) in breakdown.iter() {
            row(&[
                value.as_str(),
                stats.total.to_string().as_str(),
                stats.completed.to_string().as_str(),
                format_rate(stats.completion_rate).as_str(),
            ]);
        }
        if i + 1 < count {
            row(&[]);
        }
    }
    out
}

/// Format a percentage with exactly one decimal.
pub fn format_rate(rate: f64) -> String {
    format!("{rate:.1}")
}

/// Render a breakdown as an aligned text table.
pub fn format_breakdown(title: &str, breakdown: &Breakdown) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "  {:<24} {:>6} {:>10} {:>8}", "Value", "Total", "Completed", "Rate %");
    for (value, stats) in breakdown {
        let _ = writeln!(
            out,
            "  {:<24} {:>6} {:>10} {:>8}",
            value,
            stats.total,
            stats.completed,
            format_rate(stats.completion_rate)
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 10).unwrap()
    }

    fn task(id: &str, status: Status, task_type: Option<&str>, created_days_ago: i64) -> Task {
        let mut t = Task::new(id);
        t.status = status;
        t.task_type = task_type.map(String::from);
        t.created_date = Some(today() - Duration::days(created_days_ago));
        t
    }

    #[test]
    fn test_completion_rate_rounds_halves_to_even() {
        assert_eq!(completion_rate(1, 400), 0.2);
        assert_eq!(completion_rate(5, 400), 1.2);
        assert_eq!(completion_rate(1, 3), 33.3);
        assert_eq!(completion_rate(2, 3), 66.7);
        assert_eq!(completion_rate(0, 0), 0.0);
    }

    #[test]
    fn test_empty_collection() {
        let a = Analytics::compute(&[], today());
        assert_eq!(a.total_tasks, 0);
        assert_eq!(a.overall_completion_rate, 0.0);
        assert_eq!(a.avg_tasks_per_day, 0.0);
        assert!(a.tasks_by_type.is_empty());
    }

    #[test]
    fn test_counts_and_rates() {
        let tasks = [
            task("T001", Status::Completed, Some("Bug"), 1),
            task("T002", Status::InProgress, Some("Bug"), 2),
            task("T003", Status::NotStarted, Some("Bug"), 40),
            task("T004", Status::OnHold, None, 3),
            task("T005", Status::PendingFromUser, Some("Feature"), 5),
        ];
        let refs: Vec<&Task> = tasks.iter().collect();
        let a = Analytics::compute(&refs, today());

        assert_eq!(a.total_tasks, 5);
        assert_eq!(a.completed_tasks, 1);
        assert_eq!(a.in_progress_tasks, 1);
        assert_eq!(a.not_started_tasks, 1);
        assert_eq!(a.on_hold_tasks, 1);
        assert_eq!(a.overall_completion_rate, 20.0);

        let bug = &a.tasks_by_type["Bug"];
        assert_eq!((bug.total, bug.completed), (3, 1));
        assert_eq!(bug.completion_rate, 33.3);
        assert_eq!(a.tasks_by_type[UNKNOWN].total, 1);
        assert_eq!(a.tasks_by_category[UNKNOWN].total, 5);

        // four tasks created inside the 30-day window
        assert_eq!(a.avg_tasks_per_day, 0.1);
        assert_eq!(a.completion_trend.get("2025-06-09"), Some(&1));
        assert_eq!(a.completion_trend.len(), 1);
    }

    #[test]
    fn test_overdue_counts_follow_due_flags() {
        let mut late = task("T001", Status::InProgress, None, 1);
        late.due_date = Some(today() - Duration::days(1));
        let mut done_late = task("T002", Status::Completed, None, 1);
        done_late.due_date = Some(today() - Duration::days(1));
        let refs = [&late, &done_late];

        assert_eq!(Analytics::compute(&refs, today()).overdue_tasks, 1);
        assert_eq!(Summary::compute(&refs, today()).overdue, 1);
        assert_eq!(StandupMetrics::compute(&refs, today()).overdue_tasks, vec!["T001".to_string()]);
    }

    #[test]
    fn test_standup_metrics_use_uncategorized() {
        let mut a = task("T001", Status::Completed, None, 2);
        a.category = Some("Ops".into());
        let mut b = task("T002", Status::InProgress, None, 20);
        b.priority = Some("Critical".into());
        let mut c = task("T003", Status::Completed, None, 8);
        c.priority = Some("High".into());
        let refs = [&a, &b, &c];

        let m = StandupMetrics::compute(&refs, today());
        assert_eq!(m.completed_this_week, 1);
        assert_eq!(m.high_priority_open, 1);
        assert_eq!(m.tasks_by_category["Ops"], CategoryStandup { total: 1, completed: 1, in_progress: 0 });
        assert_eq!(m.tasks_by_category[UNCATEGORIZED], CategoryStandup { total: 2, completed: 1, in_progress: 1 });
        assert!(!m.tasks_by_category.contains_key(UNKNOWN));
    }

    #[test]
    fn test_report_sections() {
        let t = task("T001", Status::Completed, Some("Bug"), 1);
        let a = Analytics::compute(&[&t], today());
        let generated = today().and_hms_opt(9, 30, 0).unwrap();
        let report = report_csv(&a, generated);

        assert!(report.starts_with("ProgressPad Analytics Report\nGenerated on,2025-06-10 09:30:00\n"));
        for heading in ["SUMMARY METRICS", "PRODUCT PERFORMANCE", "MODULE PERFORMANCE", "PRIORITY DISTRIBUTION", "TASK TYPES"] {
            assert!(report.contains(heading), "missing {heading}");
        }
        assert!(report.contains("Overall Completion Rate (%),100.0\n"));
        assert!(report.contains("Bug,1,1,100.0\n"));
    }
}

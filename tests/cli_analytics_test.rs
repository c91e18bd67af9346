//! Integration tests for `summary`, `analytics` and `completions`.

mod common;

use std::fs;

use common::TestEnv;
use predicates::prelude::*;
use serde_json::json;

fn seed(env: &TestEnv) {
    env.add(&["A", "--type", "Bug", "--product", "Finance", "--status", "Completed", "--priority", "High"]);
    env.add(&["B", "--type", "Bug", "--product", "Finance", "--status", "In Progress", "--category", "Ops"]);
    env.add(&["C", "--type", "Feature", "--due", "yesterday", "--priority", "Critical"]);
    env.add(&["D", "--status", "On Hold"]);
    env.add(&["E"]);
    env.json(&["delete", "T005"]);
}

#[test]
fn test_analytics_counts_active_tasks() {
    let env = TestEnv::new();
    seed(&env);
    let a = env.json(&["analytics"]);

    assert_eq!(a["total_tasks"], 4);
    assert_eq!(a["completed_tasks"], 1);
    assert_eq!(a["in_progress_tasks"], 1);
    assert_eq!(a["not_started_tasks"], 1);
    assert_eq!(a["on_hold_tasks"], 1);
    assert_eq!(a["overdue_tasks"], 1);
    assert_eq!(a["overall_completion_rate"], json!(25.0));
    assert_eq!(a["tasks_by_type"]["Bug"], json!({"total": 2, "completed": 1, "completion_rate": 50.0}));
    assert_eq!(a["tasks_by_type"]["Unknown"]["total"], 1);
    assert_eq!(a["tasks_by_category"]["Unknown"]["total"], 3);
    // four tasks created today over a 30 day window
    assert_eq!(a["avg_tasks_per_day"], json!(0.1));
}

#[test]
fn test_analytics_on_empty_pad() {
    let env = TestEnv::new();
    let a = env.json(&["analytics"]);
    assert_eq!(a["total_tasks"], 0);
    assert_eq!(a["overall_completion_rate"], json!(0.0));
    assert_eq!(a["avg_tasks_per_day"], json!(0.0));
}

#[test]
fn test_analytics_report_has_every_section() {
    let env = TestEnv::new();
    seed(&env);
    let report = env.work_path().join("report.csv");
    env.pp()
        .args(["analytics", "--report", report.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote analytics report"));

    let text = fs::read_to_string(report).unwrap();
    for heading in [
        "ProgressPad Analytics Report",
        "SUMMARY METRICS",
        "PRODUCT PERFORMANCE",
        "MODULE PERFORMANCE",
        "PRIORITY DISTRIBUTION",
        "TASK TYPES",
    ] {
        assert!(text.contains(heading), "missing {heading}");
    }
    assert!(text.contains("Overall Completion Rate (%),25.0"));
}

#[test]
fn test_summary_and_standup_metrics() {
    let env = TestEnv::new();
    seed(&env);
    let s = env.json(&["summary"]);

    assert_eq!(s["summary"], json!({"completed": 1, "in_progress": 1, "overdue": 1, "total": 4}));
    assert_eq!(s["standup"]["completed_this_week"], 1);
    assert_eq!(s["standup"]["overdue_tasks"], json!(["T003"]));
    assert_eq!(s["standup"]["high_priority_open"], 1);
    assert_eq!(s["standup"]["tasks_by_category"]["Uncategorized"]["total"], 3);
    assert_eq!(s["standup"]["tasks_by_category"]["Ops"]["in_progress"], 1);
}

#[test]
fn test_analytics_human_output() {
    let env = TestEnv::new();
    seed(&env);
    env.pp()
        .arg("analytics")
        .assert()
        .success()
        .stdout(predicate::str::contains("Completion rate:    25.0%"))
        .stdout(predicate::str::contains("By product"));
}

#[test]
fn test_completions_generate() {
    let env = TestEnv::new();
    env.pp()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pp"));
}

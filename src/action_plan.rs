//! Action-plan log.
//!
//! A task carries one current action plan and a history transcript. The
//! transcript is newest-first text; every entry is headed by its date in
//! brackets, with a `STANDUP` marker for entries written by a standup rollover:
//!
//! ```text
//! [STANDUP 2025-06-11]
//! Investigate logs
//!
//! [2025-06-10]
//! Investigate logs
//! ```
//!
//! The two updates archive different text. A direct update records the plan
//! being set; a standup rollover records the plan being replaced.

use chrono::NaiveDate;
use serde::Serialize;

use crate::task::Task;

const STANDUP_MARKER: &str = "STANDUP";

/// Format one history entry.
fn entry(date: NaiveDate, standup: bool, text: &str) -> String {
    let stamp = date.format("%Y-%m-%d");
    if standup {
        format!("[{STANDUP_MARKER} {stamp}]\n{text}\n")
    } else {
        format!("[{stamp}]\n{text}\n")
    }
}

/// Prepend an entry to a transcript and trim the result.
fn prepend(history: &str, new_entry: &str) -> String {
    format!("{new_entry}\n{history}").trim().to_string()
}

/// History seeded when a task is created with a plan.
pub fn initial_history(plan: Option<&str>, today: NaiveDate) -> String {
    match plan.map(str::trim) {
        Some(p) if !p.is_empty() => entry(today, false, p).trim().to_string(),
        _ => String::new(),
    }
}

/// Set a new current plan and record it in the history.
pub fn update_action_plan(task: &mut Task, new_plan: &str, today: NaiveDate) {
    let new_plan = new_plan.trim();
    task.current_action_plan = Some(new_plan.to_string());
    task.action_plan_history = prepend(&task.action_plan_history, &entry(today, false, new_plan));
    task.touch();
}

/// Standup rollover: archive the outgoing plan, then set the new one.
///
/// A blank or missing current plan leaves the history untouched.
pub fn standup_update_action_plan(task: &mut Task, new_plan: &str, today: NaiveDate) {
    let new_plan = new_plan.trim();
    let outgoing = task.current_action_plan.as_deref().map(str::trim).unwrap_or("");
    if !outgoing.is_empty() {
        let standup_entry = entry(today, true, outgoing);
        task.action_plan_history = prepend(&task.action_plan_history, &standup_entry);
    }
    task.current_action_plan = Some(new_plan.to_string());
    task.touch();
}

/// One parsed history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub date: Option<NaiveDate>,
    pub standup: bool,
    pub text: String,
}

/// Split a transcript into entries, newest first.
///
/// Lines before the first header (hand-edited or imported history) become an
/// undated entry.
pub fn parse_history(history: &str) -> Vec<HistoryEntry> {
    let mut entries = Vec::new();
    let mut current: Option<HistoryEntry> = None;
    let mut body: Vec<&str> = Vec::new();

    for line in history.lines() {
        if let Some(header) = parse_header(line) {
            flush(&mut entries, &mut current, &mut body);
            current = Some(header);
        } else {
            body.push(line);
        }
    }
    flush(&mut entries, &mut current, &mut body);
    entries
}

fn flush(entries: &mut Vec<HistoryEntry>, current: &mut Option<HistoryEntry>, body: &mut Vec<&str>) {
    let text = body.join("\n").trim().to_string();
    match current.take() {
        Some(mut e) => {
            e.text = text;
            entries.push(e);
        }
        None if !text.is_empty() => entries.push(HistoryEntry { date: None, standup: false, text }),
        None => {}
    }
    body.clear();
}

fn parse_header(line: &str) -> Option<HistoryEntry> {
    let inner = line.trim().strip_prefix('[')?.strip_suffix(']')?;
    let (standup, stamp) = match inner.strip_prefix(STANDUP_MARKER) {
        Some(rest) => (true, rest.trim()),
        None => (false, inner),
    };
    let date = NaiveDate::parse_from_str(stamp, "%Y-%m-%d").ok()?;
    Some(HistoryEntry { date: Some(date), standup, text: String::new() })
}

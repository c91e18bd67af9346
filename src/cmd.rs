//! Command implementations for the CLI interface.
//!
//! Every handler opens nothing itself: `main` resolves the pad and hands over
//! a [`Store`]. Handlers perform one operation, commit when they changed
//! something, and report through [`Output`].

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use clap::{Args, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use serde_json::{json, Map, Value};

use progresspad::analytics::{format_breakdown, format_rate, report_csv, Analytics, StandupMetrics, Summary};
use progresspad::dates::{parse_due_input, today};
use progresspad::db::{create_backup, NewTask, Store};
use progresspad::fields::{ColumnType, CustomValue, Status};
use progresspad::pad::discover_pads;
use progresspad::settings::{self, CustomColumn, Settings};
use progresspad::task::{Task, TaskPatch, TaskView};
use progresspad::transfer::{self, DEFAULT_EXPORT_FILE};
use progresspad::{Error, Result};

use crate::output::{print_table, print_task, Output};
use crate::tui::board_run::run_board;

#[derive(Subcommand)]
pub enum Commands {
    /// Add a new task.
    Add {
        /// What the task is about.
        description: String,
        /// Initial action plan. Seeds the history with a dated entry.
        #[arg(long)]
        plan: Option<String>,
        #[command(flatten)]
        fields: FieldArgs,
    },

    /// List active tasks with optional filters.
    List {
        #[command(flatten)]
        filter: ListFilter,
        /// Sort key.
        #[arg(long, value_enum, default_value_t = SortKey::Id)]
        sort: SortKey,
        /// Limit number of rows printed.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// List archived (deleted) tasks.
    Archived,

    /// View a single active or archived task.
    View {
        /// Task ID, e.g. T001.
        id: String,
    },

    /// View an archived task. Fails if the task is not archived.
    ArchivedView {
        /// Task ID, e.g. T001.
        id: String,
    },

    /// Edit fields on a task. An empty value clears an optional field.
    Edit {
        /// Task ID, e.g. T001.
        id: String,
        #[arg(long)]
        description: Option<String>,
        /// Status update date.
        #[arg(long)]
        status_update: Option<String>,
        /// Free-text action plan status.
        #[arg(long)]
        plan_status: Option<String>,
        /// Overwrite the current plan without touching history.
        #[arg(long)]
        plan: Option<String>,
        /// Overwrite the whole history transcript.
        #[arg(long)]
        history: Option<String>,
        #[command(flatten)]
        fields: FieldArgs,
    },

    /// Archive a task (soft delete).
    Delete {
        /// Task ID, e.g. T001.
        id: String,
    },

    /// Bring an archived task back as Not Started.
    Restore {
        /// Task ID, e.g. T001.
        id: String,
    },

    /// Replace the current action plan and log the new plan in history.
    Plan {
        /// Task ID, e.g. T001.
        id: String,
        /// The new plan.
        plan: String,
    },

    /// Standup rollover: log the outgoing plan, then set the new one.
    Standup {
        /// Task ID, e.g. T001.
        id: String,
        /// The new plan.
        plan: String,
    },

    /// Dashboard counts plus standup metrics.
    Summary,

    /// Completion statistics per type, category, product, module and priority.
    Analytics {
        /// Also write the analytics report as CSV to this file.
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Show or change option lists and custom columns.
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// Export active tasks to CSV.
    Export {
        /// Output file path (default: tasks_export.csv)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Replace every task with the rows of a CSV file.
    Import {
        /// Input CSV file path
        input: PathBuf,
        /// Skip creating backup before import
        #[arg(long)]
        no_backup: bool,
    },

    /// Create a timestamped backup of the pad.
    Backup,

    /// List user pads in the data directory.
    Users,

    /// Open the status board.
    Board,

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print all settings merged with defaults.
    Show,
    /// Upsert one key. VALUE is JSON, or a comma-separated list.
    Set { key: String, value: String },
    /// Declare a custom column (or change its type).
    AddColumn {
        name: String,
        /// text | number | date | boolean
        #[arg(long = "type", default_value = "text")]
        column_type: String,
    },
    /// Drop a custom column from the schema.
    RemoveColumn { name: String },
}

/// Fields shared by `add` and `edit`.
#[derive(Args, Debug, Default, Clone)]
pub struct FieldArgs {
    /// Task type, e.g. Bug | Feature | Task.
    #[arg(long = "type")]
    pub task_type: Option<String>,
    #[arg(long)]
    pub product: Option<String>,
    #[arg(long)]
    pub module: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    /// Status, e.g. "In Progress".
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub priority: Option<String>,
    /// Created date: YYYY-MM-DD, DD/MM/YYYY, MM/DD/YYYY, DD-MM-YYYY, YYYY/MM/DD or "today".
    #[arg(long)]
    pub created: Option<String>,
    /// Due date: any created-date format, "tomorrow", "in Nd", "in Nw" or "eom".
    #[arg(long)]
    pub due: Option<String>,
    /// Custom field as NAME=VALUE. May be repeated.
    #[arg(long = "field", value_parser = parse_key_value)]
    pub fields: Vec<(String, String)>,
}

/// Filters for `list`.
#[derive(Args, Debug, Default, Clone)]
pub struct ListFilter {
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long = "type")]
    pub task_type: Option<String>,
    #[arg(long)]
    pub product: Option<String>,
    #[arg(long)]
    pub module: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub priority: Option<String>,
    /// Only overdue tasks.
    #[arg(long)]
    pub overdue: bool,
    /// Only tasks due within the next three days.
    #[arg(long)]
    pub due_soon: bool,
    /// Only tasks due today.
    #[arg(long)]
    pub due_today: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum SortKey {
    Id,
    Due,
    Priority,
}

fn parse_key_value(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s.split_once('=').ok_or_else(|| format!("expected NAME=VALUE, got '{s}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing field name in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Trim a value; blank means "no value".
fn non_blank(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Edit semantics for text fields: absent leaves alone, blank clears.
fn clearable(v: Option<String>) -> Option<Option<String>> {
    v.map(|s| Some(s.trim().to_string()).filter(|s| !s.is_empty()))
}

fn parse_date_arg(raw: &str, today: NaiveDate) -> Result<NaiveDate> {
    parse_due_input(raw, today).ok_or_else(|| {
        Error::InvalidInput(format!(
            "unrecognised date '{raw}'. Use YYYY-MM-DD, DD/MM/YYYY, 'today', 'tomorrow' or 'in Nd'"
        ))
    })
}

/// Edit semantics for date fields: absent leaves alone, blank clears.
fn clearable_date(v: Option<String>, today: NaiveDate) -> Result<Option<Option<NaiveDate>>> {
    match v {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(Some(None)),
        Some(s) => Ok(Some(Some(parse_date_arg(&s, today)?))),
    }
}

fn custom_values(settings: &Settings, raw: &[(String, String)]) -> Result<BTreeMap<String, CustomValue>> {
    raw.iter()
        .map(|(name, value)| Ok((name.clone(), settings.coerce_custom_value(name, value)?)))
        .collect()
}

fn find_task<'a>(store: &'a Store, id: &str) -> Result<&'a Task> {
    store.db.get(id).ok_or_else(|| Error::NotFound("Task not found".into()))
}

/// Add a new task.
pub fn cmd_add(store: &mut Store, out: Output, description: String, plan: Option<String>, fields: FieldArgs) -> Result<()> {
    let today = today();
    let settings = store.db.settings();
    let new = NewTask {
        task_type: non_blank(fields.task_type),
        product: non_blank(fields.product),
        module: non_blank(fields.module),
        description: non_blank(Some(description)),
        status: non_blank(fields.status).map(Status::from),
        priority: non_blank(fields.priority),
        created_date: fields.created.as_deref().map(|d| parse_date_arg(d, today)).transpose()?,
        due_date: fields.due.as_deref().map(|d| parse_date_arg(d, today)).transpose()?,
        current_action_plan: non_blank(plan),
        category: non_blank(fields.category),
        custom_fields: custom_values(&settings, &fields.fields)?,
    };
    let id = store.db.add_task(new, today);
    store.commit()?;
    out.success(&format!("Added task {id}"), json!({ "id": id }))
}

fn matches_filter(task: &Task, filter: &ListFilter, today: NaiveDate) -> bool {
    let eq = |field: &Option<String>, wanted: &Option<String>| match wanted {
        Some(w) => field.as_deref() == Some(w.as_str()),
        None => true,
    };
    if let Some(s) = &filter.status {
        if task.status != Status::parse(s) {
            return false;
        }
    }
    if !eq(&task.task_type, &filter.task_type)
        || !eq(&task.product, &filter.product)
        || !eq(&task.module, &filter.module)
        || !eq(&task.category, &filter.category)
        || !eq(&task.priority, &filter.priority)
    {
        return false;
    }
    let flags = task.due_flags(today);
    (!filter.overdue || flags.is_overdue)
        && (!filter.due_soon || flags.due_soon)
        && (!filter.due_today || flags.due_today)
}

/// List active tasks.
pub fn cmd_list(store: &mut Store, out: Output, filter: ListFilter, sort: SortKey, limit: Option<usize>) -> Result<()> {
    let today = today();
    let settings = store.db.settings();
    store.commit_if_dirty()?;

    let mut tasks: Vec<&Task> = store
        .db
        .active_tasks()
        .into_iter()
        .filter(|t| matches_filter(t, &filter, today))
        .collect();

    match sort {
        SortKey::Id => tasks.sort_by(|a, b| (a.id.len(), &a.id).cmp(&(b.id.len(), &b.id))),
        SortKey::Due => tasks.sort_by_key(|t| t.due_date.unwrap_or(NaiveDate::MAX)),
        SortKey::Priority => {
            // Later entries in priority_options rank higher.
            let rank = |t: &Task| {
                t.priority
                    .as_deref()
                    .and_then(|p| settings.priority_options.iter().position(|o| o == p))
                    .map_or(0, |i| i + 1)
            };
            tasks.sort_by(|a, b| rank(b).cmp(&rank(a)));
        }
    }
    if let Some(n) = limit {
        tasks.truncate(n);
    }

    let views: Vec<TaskView> = tasks.iter().map(|t| t.view(today)).collect();
    out.data(&views, || print_table(&tasks, today))
}

/// List archived tasks.
pub fn cmd_archived(store: &Store, out: Output) -> Result<()> {
    let today = today();
    let tasks = store.db.archived_tasks();
    let views: Vec<TaskView> = tasks.iter().map(|t| t.view(today)).collect();
    out.data(&views, || {
        if tasks.is_empty() {
            println!("No archived tasks.");
        } else {
            print_table(&tasks, today);
        }
    })
}

/// View one task by ID.
pub fn cmd_view(store: &Store, out: Output, id: &str) -> Result<()> {
    let today = today();
    let task = find_task(store, id)?;
    out.data(&task.view(today), || print_task(task, today))
}

/// View one archived task by ID.
pub fn cmd_archived_view(store: &Store, out: Output, id: &str) -> Result<()> {
    let today = today();
    let task = store.db.get_archived(id)?;
    out.data(&task.view(today), || print_task(task, today))
}

/// Edit fields on a task.
#[allow(clippy::too_many_arguments)]
pub fn cmd_edit(
    store: &mut Store,
    out: Output,
    id: String,
    description: Option<String>,
    status_update: Option<String>,
    plan_status: Option<String>,
    plan: Option<String>,
    history: Option<String>,
    fields: FieldArgs,
) -> Result<()> {
    let today = today();
    let settings = store.db.settings();
    let patch = TaskPatch {
        task_type: clearable(fields.task_type),
        product: clearable(fields.product),
        module: clearable(fields.module),
        description: clearable(description),
        status: non_blank(fields.status).map(Status::from),
        priority: clearable(fields.priority),
        created_date: clearable_date(fields.created, today)?,
        due_date: clearable_date(fields.due, today)?,
        status_update_date: clearable_date(status_update, today)?,
        action_plan_status: clearable(plan_status),
        current_action_plan: clearable(plan),
        action_plan_history: history,
        category: clearable(fields.category),
        custom_fields: custom_values(&settings, &fields.fields)?,
    };
    if patch.is_empty() {
        return Err(Error::InvalidInput("nothing to change".into()));
    }
    store.db.edit_task(&id, patch)?;
    store.commit()?;
    out.success(&format!("Updated task {id}"), json!({ "id": id }))
}

/// Archive a task.
pub fn cmd_delete(store: &mut Store, out: Output, id: String) -> Result<()> {
    store.db.delete_task(&id)?;
    store.commit()?;
    out.success(&format!("Archived task {id}"), json!({ "id": id }))
}

/// Restore an archived task.
pub fn cmd_restore(store: &mut Store, out: Output, id: String) -> Result<()> {
    store.db.restore_task(&id)?;
    store.commit()?;
    out.success(&format!("Restored task {id}"), json!({ "id": id }))
}

/// Direct action-plan update.
pub fn cmd_plan(store: &mut Store, out: Output, id: String, plan: String) -> Result<()> {
    store.db.update_action_plan(&id, &plan, today())?;
    store.commit()?;
    out.success(&format!("Action plan updated for {id}"), json!({ "id": id }))
}

/// Standup rollover of the action plan.
pub fn cmd_standup(store: &mut Store, out: Output, id: String, plan: String) -> Result<()> {
    store.db.standup_update_action_plan(&id, &plan, today())?;
    store.commit()?;
    out.success(&format!("Standup update recorded for {id}"), json!({ "id": id }))
}

/// Dashboard counts and standup metrics.
pub fn cmd_summary(store: &Store, out: Output) -> Result<()> {
    let today = today();
    let tasks = store.db.active_tasks();
    let summary = Summary::compute(&tasks, today);
    let standup = StandupMetrics::compute(&tasks, today);

    out.data(&json!({ "summary": summary, "standup": standup }), || {
        println!(
            "Total: {}  Completed: {}  In progress: {}  Overdue: {}",
            summary.total, summary.completed, summary.in_progress, summary.overdue
        );
        println!();
        println!("Completed this week:  {}", standup.completed_this_week);
        println!("High priority open:   {}", standup.high_priority_open);
        if standup.overdue_tasks.is_empty() {
            println!("Overdue:              -");
        } else {
            println!("Overdue:              {}", standup.overdue_tasks.join(", "));
        }
        println!();
        println!("{:<24} {:>6} {:>10} {:>12}", "Category", "Total", "Completed", "In progress");
        for (category, c) in &standup.tasks_by_category {
            println!("{:<24} {:>6} {:>10} {:>12}", category, c.total, c.completed, c.in_progress);
        }
    })
}

/// Analytics over active tasks, optionally written out as a CSV report.
pub fn cmd_analytics(store: &Store, out: Output, report: Option<PathBuf>) -> Result<()> {
    let analytics = Analytics::compute(&store.db.active_tasks(), today());

    if let Some(path) = report {
        fs::write(&path, report_csv(&analytics, Local::now().naive_local()))?;
        return out.success(
            &format!("Wrote analytics report to {}", path.display()),
            json!({ "path": path }),
        );
    }

    out.data(&analytics, || {
        println!("Total tasks:        {}", analytics.total_tasks);
        println!("Completed:          {}", analytics.completed_tasks);
        println!("In progress:        {}", analytics.in_progress_tasks);
        println!("Not started:        {}", analytics.not_started_tasks);
        println!("On hold:            {}", analytics.on_hold_tasks);
        println!("Overdue:            {}", analytics.overdue_tasks);
        println!("Completion rate:    {}%", format_rate(analytics.overall_completion_rate));
        println!("Tasks/day (30d):    {}", analytics.avg_tasks_per_day);
        println!();
        for (title, breakdown) in [
            ("By type", &analytics.tasks_by_type),
            ("By category", &analytics.tasks_by_category),
            ("By product", &analytics.tasks_by_product),
            ("By module", &analytics.tasks_by_module),
            ("By priority", &analytics.tasks_by_priority),
        ] {
            println!("{}", format_breakdown(title, breakdown));
        }
        if !analytics.completion_trend.is_empty() {
            println!("Completion trend (by created date)");
            for (day, count) in &analytics.completion_trend {
                println!("  {day}  {count}");
            }
        }
    })
}

/// Parse a `settings set` value: JSON when it parses, else a comma-separated list.
fn parse_setting_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| {
        Value::Array(
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| Value::String(s.to_string()))
                .collect(),
        )
    })
}

fn print_settings(settings: &Settings) {
    for (label, options) in [
        ("Status", &settings.status_options),
        ("Type", &settings.type_options),
        ("Priority", &settings.priority_options),
        ("Product", &settings.product_options),
        ("Module", &settings.module_options),
    ] {
        println!("{:<10} {}", format!("{label}:"), options.join(", "));
    }
    if settings.custom_columns.is_empty() {
        println!("{:<10} -", "Columns:");
    } else {
        let columns: Vec<String> = settings
            .custom_columns
            .iter()
            .map(|c| format!("{} ({})", c.name, c.column_type))
            .collect();
        println!("{:<10} {}", "Columns:", columns.join(", "));
    }
    for (key, value) in &settings.extra {
        println!("{:<10} {}", format!("{key}:"), value);
    }
}

/// Settings subcommands.
pub fn cmd_settings(store: &mut Store, out: Output, action: SettingsAction) -> Result<()> {
    match action {
        SettingsAction::Show => {
            let settings = store.db.settings();
            store.commit_if_dirty()?;
            out.data(&settings, || print_settings(&settings))
        }
        SettingsAction::Set { key, value } => {
            let key = key.trim().to_string();
            if key.is_empty() {
                return Err(Error::InvalidInput("setting key cannot be empty".into()));
            }
            let mut data = Map::new();
            data.insert(key.clone(), parse_setting_value(&value));
            settings::save(&mut store.db.settings, data);
            store.commit()?;
            out.success(&format!("Saved setting {key}"), json!({ "key": key }))
        }
        SettingsAction::AddColumn { name, column_type } => {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(Error::InvalidInput("column name cannot be empty".into()));
            }
            let column_type = ColumnType::parse(&column_type);
            let column = CustomColumn::new(name.clone(), column_type.clone());
            settings::add_custom_column(&mut store.db.settings, column);
            store.commit()?;
            out.success(
                &format!("Custom column {name} ({column_type}) saved"),
                json!({ "name": name, "type": column_type.label() }),
            )
        }
        SettingsAction::RemoveColumn { name } => {
            settings::remove_custom_column(&mut store.db.settings, &name)?;
            store.commit()?;
            out.success(&format!("Custom column {name} removed"), json!({ "name": name }))
        }
    }
}

/// Export active tasks to CSV.
pub fn cmd_export(store: &mut Store, out: Output, output: Option<PathBuf>) -> Result<()> {
    let path = output.unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_FILE));
    let settings = store.db.settings();
    let tasks = store.db.active_tasks();
    let csv = transfer::export_csv(&tasks, &settings, today())?;
    let count = tasks.len();
    fs::write(&path, csv)?;
    store.commit_if_dirty()?;
    out.success(
        &format!("Exported {count} task(s) to {}", path.display()),
        json!({ "count": count, "path": path }),
    )
}

/// Import tasks from CSV, replacing the current set.
pub fn cmd_import(store: &mut Store, out: Output, input: &Path, no_backup: bool) -> Result<()> {
    transfer::validate_import_path(input)?;
    if !input.is_file() {
        return Err(Error::NotFound(format!("File {} not found", input.display())));
    }

    let mut backup = None;
    if !no_backup && store.path.exists() {
        backup = Some(create_backup(&store.path)?);
    }

    let report = transfer::import_file(&mut store.db, input)?;
    store.commit()?;

    let mut message = format!("Imported {} task(s) from {}", report.imported, input.display());
    if report.assigned_ids > 0 {
        message.push_str(&format!(" ({} given new IDs)", report.assigned_ids));
    }
    if let Some(path) = &backup {
        message.push_str(&format!("\nBackup: {}", path.display()));
    }
    out.success(
        &message,
        json!({ "imported": report.imported, "assigned_ids": report.assigned_ids, "backup": backup }),
    )
}

/// Create a backup of the pad.
pub fn cmd_backup(store: &Store, out: Output) -> Result<()> {
    let path = create_backup(&store.path)?;
    out.success(&format!("Backup created: {}", path.display()), json!({ "path": path }))
}

/// List user pads.
pub fn cmd_users(data_dir: &Path, out: Output) -> Result<()> {
    let pads = discover_pads(data_dir)?;
    out.data(&pads, || {
        if pads.is_empty() {
            println!("No user pads in {}", data_dir.display());
            return;
        }
        println!("{:<20} {:<20} {}", "User", "Last modified", "File");
        for pad in &pads {
            let modified = pad
                .modified()
                .map(|t| chrono::DateTime::<Local>::from(t).format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".into());
            println!("{:<20} {:<20} {}", pad.name, modified, pad.file_path.display());
        }
    })
}

/// Open the status board.
pub fn cmd_board(store: Store) -> Result<()> {
    run_board(store)?;
    Ok(())
}

/// Print completions for `shell`.
pub fn cmd_completions(shell: Shell) {
    use crate::cli::Cli;
    use clap::CommandFactory;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(parse_key_value("Owner=Ann").unwrap(), ("Owner".into(), "Ann".into()));
        assert_eq!(parse_key_value("Note=a=b").unwrap(), ("Note".into(), "a=b".into()));
        assert!(parse_key_value("Owner").is_err());
        assert!(parse_key_value("=x").is_err());
    }

    #[test]
    fn test_clearable() {
        assert_eq!(clearable(None), None);
        assert_eq!(clearable(Some("  ".into())), Some(None));
        assert_eq!(clearable(Some(" OIC ".into())), Some(Some("OIC".into())));
    }

    #[test]
    fn test_parse_setting_value() {
        assert_eq!(parse_setting_value("[\"Bug\",\"Chore\"]"), json!(["Bug", "Chore"]));
        assert_eq!(parse_setting_value("Bug, Chore"), json!(["Bug", "Chore"]));
        assert_eq!(parse_setting_value("\"dark\""), json!("dark"));
    }

    #[test]
    fn test_matches_filter_by_flags() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        let mut task = Task::new("T001");
        task.priority = Some("High".into());
        task.due_date = NaiveDate::from_ymd_opt(2025, 6, 9);

        let overdue = ListFilter { overdue: true, ..Default::default() };
        let soon = ListFilter { due_soon: true, ..Default::default() };
        let high = ListFilter { priority: Some("High".into()), ..Default::default() };
        let low = ListFilter { priority: Some("Low".into()), ..Default::default() };
        assert!(matches_filter(&task, &overdue, today));
        assert!(!matches_filter(&task, &soon, today));
        assert!(matches_filter(&task, &high, today));
        assert!(!matches_filter(&task, &low, today));
    }

    #[test]
    fn test_export_persists_settings_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let pad = dir.path().join("pad.json");
        let mut db = progresspad::db::Database::default();
        db.tasks.push(Task::new("T001"));
        db.save(&pad).unwrap();

        let mut store = Store::open(&pad).unwrap();
        assert!(store.db.settings.is_empty());
        let out = Output { json: true };
        cmd_export(&mut store, out, Some(dir.path().join("out.csv"))).unwrap();

        let reloaded = progresspad::db::Database::load(&pad).unwrap();
        assert!(reloaded.settings.contains_key("status_options"));
        assert!(reloaded.settings.contains_key("custom_columns"));
    }
}

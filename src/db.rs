//! Record store and task lifecycle operations.
//!
//! A pad is one JSON file holding every task of one user plus the settings
//! map. Each command opens the pad, performs one operation and writes it back
//! atomically (temp file + rename).

use std::collections::{BTreeMap, HashSet};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::action_plan;
use crate::fields::{CustomValue, Status};
use crate::settings::{self, Settings, SettingsMap};
use crate::task::{Task, TaskPatch};
use crate::{Error, Result};

/// Prefix of auto-assigned task IDs.
pub const ID_PREFIX: char = 'T';

/// In-memory contents of a pad.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Database {
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub settings: SettingsMap,
    /// Set when reading settings wrote defaults back into the map.
    #[serde(skip)]
    settings_dirty: bool,
}

/// Fields accepted when adding a task.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub task_type: Option<String>,
    pub product: Option<String>,
    pub module: Option<String>,
    pub description: Option<String>,
    pub status: Option<Status>,
    pub priority: Option<String>,
    pub created_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub current_action_plan: Option<String>,
    pub category: Option<String>,
    pub custom_fields: BTreeMap<String, CustomValue>,
}

fn not_found() -> Error {
    Error::NotFound("Task not found".into())
}

impl Database {
    /// Load a pad from disk. A missing file is an empty pad.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "pad does not exist yet, starting empty");
            return Ok(Database::default());
        }
        let buf = fs::read_to_string(path)?;
        let db: Database = serde_json::from_str(&buf)?;
        debug!(path = %path.display(), tasks = db.tasks.len(), "loaded pad");
        Ok(db)
    }

    /// Save the pad using an atomic write (temp file + rename).
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("json.tmp");
        let data = serde_json::to_string_pretty(self)?;
        let mut f = File::create(&tmp)?;
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(tmp, path)?;
        debug!(path = %path.display(), tasks = self.tasks.len(), "saved pad");
        Ok(())
    }

    /// Current settings merged with defaults.
    pub fn settings(&mut self) -> Settings {
        let (settings, changed) = settings::load(&mut self.settings);
        self.settings_dirty |= changed;
        settings
    }

    /// Whether reading settings filled in defaults that are not yet on disk.
    pub fn settings_dirty(&self) -> bool {
        self.settings_dirty
    }

    /// Generate the next sequential task ID (`T001`, `T002`, ...).
    pub fn next_id(&self) -> String {
        next_id_for(&self.tasks)
    }

    /// Get a task by ID regardless of status.
    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Get a mutable reference to a task by ID regardless of status.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    /// Tasks that are not archived.
    pub fn active_tasks(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|t| !t.status.is_deleted()).collect()
    }

    /// Archived (soft-deleted) tasks.
    pub fn archived_tasks(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.status.is_deleted()).collect()
    }

    /// Look up an archived task.
    pub fn get_archived(&self, id: &str) -> Result<&Task> {
        self.tasks
            .iter()
            .find(|t| t.id == id && t.status.is_deleted())
            .ok_or_else(not_found)
    }

    /// Add a task and return its assigned ID.
    pub fn add_task(&mut self, new: NewTask, today: NaiveDate) -> String {
        let id = self.next_id();
        let mut task = Task::new(id.clone());
        task.action_plan_history = action_plan::initial_history(new.current_action_plan.as_deref(), today);
        task.task_type = new.task_type;
        task.product = new.product;
        task.module = new.module;
        task.description = new.description;
        task.status = new.status.unwrap_or_default();
        task.priority = new.priority;
        task.created_date = Some(new.created_date.unwrap_or(today));
        task.due_date = new.due_date;
        task.current_action_plan = new.current_action_plan;
        task.category = new.category;
        task.custom_fields = new.custom_fields;
        self.tasks.push(task);
        info!(%id, "added task");
        id
    }

    /// Apply a field-level edit.
    pub fn edit_task(&mut self, id: &str, patch: TaskPatch) -> Result<()> {
        let task = self.get_mut(id).ok_or_else(not_found)?;
        patch.apply(task);
        info!(%id, "edited task");
        Ok(())
    }

    /// Soft-delete a task.
    pub fn delete_task(&mut self, id: &str) -> Result<()> {
        self.get_mut(id).ok_or_else(not_found)?.archive();
        info!(%id, "archived task");
        Ok(())
    }

    /// Restore an archived task to `Not Started`.
    pub fn restore_task(&mut self, id: &str) -> Result<()> {
        self.get_mut(id)
            .ok_or_else(|| Error::NotFound("Task not found or not deleted".into()))?
            .restore()?;
        info!(%id, "restored task");
        Ok(())
    }

    /// Direct action-plan update.
    pub fn update_action_plan(&mut self, id: &str, new_plan: &str, today: NaiveDate) -> Result<()> {
        let task = self.get_mut(id).ok_or_else(not_found)?;
        action_plan::update_action_plan(task, new_plan, today);
        Ok(())
    }

    /// Standup rollover of the action plan.
    pub fn standup_update_action_plan(&mut self, id: &str, new_plan: &str, today: NaiveDate) -> Result<()> {
        let task = self.get_mut(id).ok_or_else(not_found)?;
        action_plan::standup_update_action_plan(task, new_plan, today);
        Ok(())
    }

    /// Replace the whole task set.
    pub fn replace_tasks(&mut self, tasks: Vec<Task>) {
        info!(removed = self.tasks.len(), added = tasks.len(), "replacing task set");
        self.tasks = tasks;
    }
}

/// Next sequential ID for a task set.
///
/// Continues from the highest numeric `T` ID; with none present, or when that
/// ID is already `u64::MAX`, it falls back to the task count. Skips any ID
/// already taken.
pub fn next_id_for(tasks: &[Task]) -> String {
    let highest = tasks
        .iter()
        .filter_map(|t| t.id.strip_prefix(ID_PREFIX)?.parse::<u64>().ok())
        .max();
    let mut n = highest
        .and_then(|n| n.checked_add(1))
        .unwrap_or(tasks.len() as u64 + 1);
    let taken: HashSet<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
    loop {
        let id = format!("{ID_PREFIX}{n:03}");
        if !taken.contains(id.as_str()) {
            return id;
        }
        n += 1;
    }
}

/// A pad opened from a path, saved back to the same path.
pub struct Store {
    pub path: PathBuf,
    pub db: Database,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Store { path: path.to_path_buf(), db: Database::load(path)? })
    }

    pub fn commit(&self) -> Result<()> {
        self.db.save(&self.path)
    }

    /// Persist defaults filled in by a settings read.
    pub fn commit_if_dirty(&self) -> Result<()> {
        if self.db.settings_dirty() {
            self.commit()?;
        }
        Ok(())
    }
}

/// Create a timestamped copy of a pad under `<dir>/backup/`.
pub fn create_backup(path: &Path) -> Result<PathBuf> {
    if !path.exists() {
        return Err(Error::NotFound(format!("Pad file {} does not exist", path.display())));
    }
    let parent_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let backup_dir = parent_dir.join("backup");
    fs::create_dir_all(&backup_dir)?;

    let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("progresspad.json");
    let backup_path = backup_dir.join(format!("{timestamp}_{file_name}"));
    fs::copy(path, &backup_path)?;
    info!(backup = %backup_path.display(), "created backup");
    Ok(backup_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 10).unwrap()
    }

    fn add(db: &mut Database, description: &str) -> String {
        db.add_task(NewTask { description: Some(description.into()), ..Default::default() }, today())
    }

    #[test]
    fn test_sequential_ids() {
        let mut db = Database::default();
        assert_eq!(add(&mut db, "a"), "T001");
        assert_eq!(add(&mut db, "b"), "T002");
        db.tasks.push(Task::new("T041"));
        assert_eq!(add(&mut db, "c"), "T042");
    }

    #[test]
    fn test_next_id_falls_back_to_count_for_foreign_ids() {
        let mut db = Database::default();
        db.tasks.push(Task::new("BUG-7"));
        db.tasks.push(Task::new("X"));
        assert_eq!(db.next_id(), "T003");
    }

    #[test]
    fn test_ids_grow_past_three_digits() {
        let mut db = Database::default();
        db.tasks.push(Task::new("T999"));
        assert_eq!(db.next_id(), "T1000");
        db.tasks.push(Task::new("T1000"));
        assert_eq!(db.next_id(), "T1001");
    }

    #[test]
    fn test_add_defaults() {
        let mut db = Database::default();
        let id = db.add_task(
            NewTask { current_action_plan: Some("Call vendor".into()), ..Default::default() },
            today(),
        );
        let task = db.get(&id).unwrap();
        assert_eq!(task.status, Status::NotStarted);
        assert_eq!(task.created_date, Some(today()));
        assert_eq!(task.action_plan_history, "[2025-06-10]\nCall vendor");
    }

    #[test]
    fn test_delete_restore_and_archive_views() {
        let mut db = Database::default();
        let a = add(&mut db, "a");
        let b = add(&mut db, "b");
        db.delete_task(&a).unwrap();

        assert_eq!(db.active_tasks().len(), 1);
        assert_eq!(db.archived_tasks()[0].id, a);
        assert!(db.get_archived(&a).is_ok());
        assert!(matches!(db.get_archived(&b), Err(Error::NotFound(_))));

        assert!(db.restore_task(&b).is_err());
        db.restore_task(&a).unwrap();
        assert_eq!(db.get(&a).unwrap().status, Status::NotStarted);
        assert!(db.archived_tasks().is_empty());
    }

    #[test]
    fn test_missing_task_is_not_found() {
        let mut db = Database::default();
        assert!(matches!(db.delete_task("T404"), Err(Error::NotFound(_))));
        assert!(matches!(db.edit_task("T404", TaskPatch::default()), Err(Error::NotFound(_))));
        assert!(matches!(db.update_action_plan("T404", "x", today()), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("pad.json");
        let mut db = Database::default();
        add(&mut db, "persist me");
        db.settings();
        db.save(&path).unwrap();

        let mut loaded = Database::load(&path).unwrap();
        assert_eq!(loaded.tasks, db.tasks);
        loaded.settings();
        assert!(!loaded.settings_dirty());
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let db = Database::load(&dir.path().join("absent.json")).unwrap();
        assert!(db.tasks.is_empty());
    }

    #[test]
    fn test_backup_copies_pad() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pad.json");
        Database::default().save(&path).unwrap();
        let backup = create_backup(&path).unwrap();
        assert!(backup.exists());
        assert!(backup.starts_with(dir.path().join("backup")));
    }

    #[test]
    fn test_next_id_after_largest_numeric_id() {
        let tasks = vec![Task::new("T18446744073709551615")];
        assert_eq!(next_id_for(&tasks), "T002");
    }
}

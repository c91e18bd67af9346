//! Per-user pads.
//!
//! Each user owns one pad file in the data directory, named
//! `<user>_pad.json`. The shared default pad is `progresspad.json`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::Serialize;

use crate::Result;

const PAD_SUFFIX: &str = "_pad";

/// A user's pad file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserPad {
    pub name: String,
    pub display_name: String,
    pub file_path: PathBuf,
}

impl UserPad {
    pub fn new(display_name: &str, data_dir: &Path) -> Self {
        let name = sanitize_user_name(display_name);
        let file_path = data_dir.join(format!("{name}{PAD_SUFFIX}.json"));
        UserPad { name, display_name: display_name.trim().to_string(), file_path }
    }

    /// Recognise a pad from its file name.
    pub fn from_file(file_path: PathBuf) -> Option<Self> {
        if file_path.extension()?.to_str()? != "json" {
            return None;
        }
        let name = file_path.file_stem()?.to_str()?.strip_suffix(PAD_SUFFIX)?;
        if name.is_empty() {
            return None;
        }
        Some(UserPad { name: name.to_string(), display_name: name.replace('_', " "), file_path })
    }

    pub fn modified(&self) -> Option<SystemTime> {
        fs::metadata(&self.file_path).and_then(|m| m.modified()).ok()
    }
}

/// Lowercase a user name and collapse every run of non-alphanumerics into `_`.
pub fn sanitize_user_name(display_name: &str) -> String {
    display_name
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Every user pad in `data_dir`, sorted by name.
pub fn discover_pads(data_dir: &Path) -> Result<Vec<UserPad>> {
    let mut pads = Vec::new();
    if !data_dir.exists() {
        return Ok(pads);
    }
    for entry in fs::read_dir(data_dir)? {
        let path = entry?.path();
        if path.is_file() {
            if let Some(pad) = UserPad::from_file(path) {
                pads.push(pad);
            }
        }
    }
    pads.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(pads)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sanitize_user_name() {
        assert_eq!(sanitize_user_name("Ann Lee"), "ann_lee");
        assert_eq!(sanitize_user_name("ops-team_2"), "ops_team_2");
        assert_eq!(sanitize_user_name("  a!!b  "), "a_b");
        assert_eq!(sanitize_user_name(""), "");
    }

    #[test]
    fn test_from_file() {
        let pad = UserPad::from_file(PathBuf::from("/d/ann_lee_pad.json")).unwrap();
        assert_eq!(pad.name, "ann_lee");
        assert_eq!(pad.display_name, "ann lee");
        assert!(UserPad::from_file(PathBuf::from("/d/progresspad.json")).is_none());
        assert!(UserPad::from_file(PathBuf::from("/d/ann_pad.json.tmp")).is_none());
        assert!(UserPad::from_file(PathBuf::from("/d/_pad.json")).is_none());
    }

    #[test]
    fn test_discover_pads_ignores_other_files() {
        let dir = TempDir::new().unwrap();
        for name in ["bob_pad.json", "ann_pad.json", "progresspad.json", "notes.txt"] {
            fs::write(dir.path().join(name), "{}").unwrap();
        }
        fs::create_dir(dir.path().join("backup")).unwrap();

        let pads = discover_pads(dir.path()).unwrap();
        let names: Vec<_> = pads.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["ann", "bob"]);
    }

    #[test]
    fn test_discover_missing_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(discover_pads(&dir.path().join("nope")).unwrap().is_empty());
    }
}

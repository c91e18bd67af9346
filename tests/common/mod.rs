//! Common test utilities for ProgressPad integration tests.
//!
//! `TestEnv` points every `pp` invocation at its own temporary data
//! directory through `PROGRESSPAD_DIR`, so tests never touch
//! `~/.progresspad/` and can run in parallel.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;
pub use tempfile::TempDir;

pub struct TestEnv {
    pub data_dir: TempDir,
    pub work_dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            data_dir: TempDir::new().unwrap(),
            work_dir: TempDir::new().unwrap(),
        }
    }

    /// A `pp` command isolated to this environment.
    pub fn pp(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_pp"));
        cmd.current_dir(self.work_dir.path());
        cmd.env("PROGRESSPAD_DIR", self.data_dir.path());
        cmd.env_remove("PROGRESSPAD_DB");
        cmd.env_remove("PROGRESSPAD_USER");
        cmd.env_remove("PROGRESSPAD_LOG");
        cmd
    }

    /// Run `pp --json <args>`, assert success and parse stdout.
    pub fn json(&self, args: &[&str]) -> Value {
        let output = self.pp().arg("--json").args(args).assert().success().get_output().stdout.clone();
        serde_json::from_slice(&output).unwrap()
    }

    /// Add a task and return its ID.
    pub fn add(&self, args: &[&str]) -> String {
        let mut full = vec!["add"];
        full.extend_from_slice(args);
        self.json(&full)["id"].as_str().unwrap().to_string()
    }

    pub fn data_path(&self) -> &Path {
        self.data_dir.path()
    }

    pub fn work_path(&self) -> &Path {
        self.work_dir.path()
    }

    /// The shared default pad.
    pub fn pad_path(&self) -> PathBuf {
        self.data_dir.path().join("progresspad.json")
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

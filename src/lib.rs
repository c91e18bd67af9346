//! # ProgressPad
//!
//! Task tracking with a running action-plan log, operator-defined option lists
//! and custom columns, and on-demand analytics.
//!
//! The library holds the kernel; the `pp` binary is a thin presentation layer
//! over it.
//!
//! - [`dates`]: lenient date parsing over a fixed list of formats.
//! - [`task`]: the task record and its read-time due flags.
//! - [`action_plan`]: the current plan and its newest-first history transcript.
//! - [`settings`]: option lists and the custom column schema, merged with defaults.
//! - [`analytics`]: per-dimension completion statistics and standup metrics.
//! - [`db`]: the JSON-file record store and task lifecycle operations.
//! - [`transfer`]: CSV import and export of the full task set.
//! - [`pad`] and [`config`]: which pad file a command works on.

pub mod action_plan;
pub mod analytics;
pub mod config;
pub mod csv;
pub mod dates;
pub mod db;
pub mod fields;
pub mod pad;
pub mod settings;
pub mod task;
pub mod transfer;

/// Library-level error type for ProgressPad operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidFormat(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    NoData(String),
}

/// Result type alias for ProgressPad operations.
pub type Result<T> = std::result::Result<T, Error>;

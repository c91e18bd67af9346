use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// File-backed task tracker with action-plan history and analytics.
/// Pads live in ~/.progresspad unless --data-dir or --db says otherwise.
#[derive(Parser)]
#[command(name = "pp", version, about = "ProgressPad task tracker")]
pub struct Cli {
    /// Path to the JSON pad file. Overrides --user.
    #[arg(long, global = true, env = "PROGRESSPAD_DB")]
    pub db: Option<PathBuf>,

    /// Open this user's pad (<data-dir>/<user>_pad.json).
    #[arg(long, short, global = true, env = "PROGRESSPAD_USER")]
    pub user: Option<String>,

    /// Directory holding the pads.
    #[arg(long, global = true, env = "PROGRESSPAD_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Print machine-readable JSON instead of tables.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

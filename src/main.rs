//! # ProgressPad CLI (`pp`)
//!
//! Track tasks, keep a dated log of each task's action plan, and see where
//! the work stands.
//!
//! ## Quick Start
//!
//! ```bash
//! # Add a task with a plan and a due date
//! pp add "Login fails on SSO" --type Bug --priority High --due "in 3d" --plan "Reproduce"
//!
//! # What is late?
//! pp list --overdue
//!
//! # Daily standup: log yesterday's plan, set today's
//! pp standup T001 "Patch token refresh"
//!
//! # Numbers
//! pp summary
//! pp analytics --report analytics.csv
//!
//! # Visual board
//! pp board
//! ```
//!
//! Pads are JSON files in `~/.progresspad/` (override with `--data-dir` or
//! `PROGRESSPAD_DIR`). `--user ann` opens `ann_pad.json`; `--db` points at any
//! file. Add `--json` to any command for machine-readable output.

use clap::Parser;

use progresspad::config::{self, Config};
use progresspad::db::Store;
use progresspad::Result;

pub mod cli;
pub mod cmd;
pub mod output;
pub mod tui {
    pub mod board;
    pub mod board_run;
    pub mod colors;
}

use cli::Cli;
use cmd::*;
use output::{render_error, Output};

fn main() {
    let cli = Cli::parse();
    config::init_logging();

    let json = cli.json;
    if let Err(e) = run(cli) {
        tracing::debug!(error = ?e, "command failed");
        render_error(json, &e.to_string());
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let out = Output { json: cli.json };

    // Commands that don't need a pad.
    if let Commands::Completions { shell } = cli.command {
        cmd_completions(shell);
        return Ok(());
    }

    let config = Config::resolve(cli.db, cli.user, cli.data_dir)?;
    if let Commands::Users = cli.command {
        return cmd_users(&config.data_dir, out);
    }

    let mut store = Store::open(&config.pad_path)?;

    match cli.command {
        Commands::Completions { .. } => unreachable!("completions handled above"),
        Commands::Users => unreachable!("users handled above"),

        Commands::Add { description, plan, fields } => cmd_add(&mut store, out, description, plan, fields),

        Commands::List { filter, sort, limit } => cmd_list(&mut store, out, filter, sort, limit),

        Commands::Archived => cmd_archived(&store, out),

        Commands::View { id } => cmd_view(&store, out, &id),

        Commands::ArchivedView { id } => cmd_archived_view(&store, out, &id),

        Commands::Edit { id, description, status_update, plan_status, plan, history, fields } => {
            cmd_edit(&mut store, out, id, description, status_update, plan_status, plan, history, fields)
        }

        Commands::Delete { id } => cmd_delete(&mut store, out, id),

        Commands::Restore { id } => cmd_restore(&mut store, out, id),

        Commands::Plan { id, plan } => cmd_plan(&mut store, out, id, plan),

        Commands::Standup { id, plan } => cmd_standup(&mut store, out, id, plan),

        Commands::Summary => cmd_summary(&store, out),

        Commands::Analytics { report } => cmd_analytics(&store, out, report),

        Commands::Settings { action } => cmd_settings(&mut store, out, action),

        Commands::Export { output } => cmd_export(&mut store, out, output),

        Commands::Import { input, no_backup } => cmd_import(&mut store, out, &input, no_backup),

        Commands::Backup => cmd_backup(&store, out),

        Commands::Board => cmd_board(store),
    }
}

//! # wkly - Weekly Planner CLI
//!
//! A single-user weekly task planner for the terminal: a Monday-Sunday grid
//! of 30-minute slots from 06:00 to 24:00, an unscheduled-tasks sidebar, and
//! local JSON storage.
//!
//! ## Quick start
//!
//! ```bash
//! # Launch the interactive weekly grid
//! wkly ui
//!
//! # Add a scheduled task via the CLI
//! wkly add "Dentist" --start "2026-01-06 09:00" --duration 30 --category have-to
//!
//! # Add an unscheduled task for the sidebar
//! wkly add "Sort photos"
//!
//! # Show this week's schedule
//! wkly week
//!
//! # Back up everything as JSON
//! wkly export
//! ```
//!
//! Tasks are stored in `~/.wkly/weekly-planner-tasks.json` (override with
//! `--db`), one pretty-printed JSON document rewritten after every change.
//! Cards are color-coded from completion state and category; the grid lays
//! out tasks that share a starting slot side by side.

use std::path::PathBuf;

use clap::Parser;

pub mod calendar;
pub mod cli;
pub mod cmd;
pub mod colors;
pub mod error;
pub mod layout;
pub mod storage;
pub mod store;
pub mod task;
pub mod tui {
    pub mod app;
    pub mod enums;
    pub mod input;
    pub mod run;
    pub mod task_form;
    pub mod utils;
}

use cli::Cli;
use cmd::*;
use storage::JsonFileStorage;
use store::TaskStore;

fn main() {
    let cli = Cli::parse();

    // Completions need no storage at all.
    if let Commands::Completions { shell } = &cli.command {
        cmd_completions(*shell);
        return;
    }

    let db_path = cli.db.unwrap_or_else(|| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        let data_dir = PathBuf::from(home).join(".wkly");
        if let Err(e) = std::fs::create_dir_all(&data_dir) {
            eprintln!("Failed to create data directory {}: {}", data_dir.display(), e);
            std::process::exit(1);
        }
        data_dir.join(storage::STORAGE_FILE)
    });

    let mut store = TaskStore::open(Box::new(JsonFileStorage::new(db_path)));

    match cli.command {
        Commands::Completions { .. } => unreachable!("completions handled above"),

        Commands::Ui => cmd_ui(store),

        Commands::Add { title, notes, details, start, duration, category, color, done } => {
            cmd_add(&mut store, title, notes, details, start, duration, category, color, done)
        }

        Commands::List { all, unscheduled } => cmd_list(&store, all, unscheduled),

        Commands::Week { date } => cmd_week(&store, date),

        Commands::Edit {
            id, title, notes, details, start, clear_start, duration, category,
            clear_category, color, auto_color,
        } => cmd_edit(
            &mut store, id, title, notes, details, start, clear_start, duration,
            category, clear_category, color, auto_color,
        ),

        Commands::Done { id } => cmd_done(&mut store, id),

        Commands::Reopen { id } => cmd_reopen(&mut store, id),

        Commands::Delete { id } => cmd_delete(&mut store, id),

        Commands::Export { output } => cmd_export(&store, output),

        Commands::Colors => cmd_colors(),
    }
}

//! Command implementations for the CLI interface.
//!
//! This module contains the command handlers for the planner's subcommands,
//! from basic CRUD operations through week views, backup export and the
//! TUI entry point.

use std::io;
use std::path::PathBuf;

use chrono::{Local, NaiveDate, Timelike};
use clap::{CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use crate::calendar::{
    format_day_date, format_time, format_week_range, parse_start_input, slot_index, week_bounds,
    week_monday,
};
use crate::cli::Cli;
use crate::colors::color_options;
use crate::store::TaskStore;
use crate::storage::export_backup;
use crate::task::{format_category, Category, Task, TaskDraft, TaskPatch};
use crate::tui::run::run_tui;

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive weekly grid.
    Ui,

    /// Add a new task.
    Add {
        /// Short title for the task.
        title: String,
        /// Note shown on the task card.
        #[arg(long)]
        notes: Option<String>,
        /// Longer text shown only in the editor.
        #[arg(long)]
        details: Option<String>,
        /// Start time: "YYYY-MM-DD HH:MM". Omit to leave the task unscheduled.
        #[arg(long)]
        start: Option<String>,
        /// Duration in minutes (default 60).
        #[arg(long)]
        duration: Option<u32>,
        /// Category: non-negotiable | have-to | want-to.
        #[arg(long, value_enum)]
        category: Option<Category>,
        /// Card color as #RRGGBB; derived from state when omitted.
        #[arg(long)]
        color: Option<String>,
        /// Create the task already completed.
        #[arg(long)]
        done: bool,
    },

    /// List tasks.
    List {
        /// Include completed tasks.
        #[arg(long)]
        all: bool,
        /// Only tasks without a start time.
        #[arg(long)]
        unscheduled: bool,
    },

    /// Show one week's schedule day by day.
    Week {
        /// Any date inside the week, YYYY-MM-DD. Defaults to today.
        date: Option<String>,
    },

    /// Update fields on a task.
    Edit {
        /// Task id to update.
        id: u64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        details: Option<String>,
        /// New start time: "YYYY-MM-DD HH:MM".
        #[arg(long, conflicts_with = "clear_start")]
        start: Option<String>,
        /// Move the task back to the unscheduled sidebar.
        #[arg(long)]
        clear_start: bool,
        #[arg(long)]
        duration: Option<u32>,
        #[arg(long, value_enum, conflicts_with = "clear_category")]
        category: Option<Category>,
        /// Remove the category.
        #[arg(long)]
        clear_category: bool,
        /// Card color as #RRGGBB.
        #[arg(long, conflicts_with = "auto_color")]
        color: Option<String>,
        /// Drop any manual color and re-derive from state.
        #[arg(long)]
        auto_color: bool,
    },

    /// Mark a task as done.
    Done {
        /// Task id to complete.
        id: u64,
    },

    /// Mark a done task as open again.
    Reopen {
        /// Task id to reopen.
        id: u64,
    },

    /// Delete a task permanently.
    Delete {
        /// Task id to delete.
        id: u64,
    },

    /// Write a dated JSON backup of all tasks.
    Export {
        /// Directory for the backup file. Defaults to the current directory.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Print the color palette offered by the editor.
    Colors,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Print a warning when the last mutation could not be persisted.
fn warn_unsaved(store: &mut TaskStore) {
    if let Some(e) = store.take_save_error() {
        eprintln!("Warning: the change is in memory only, saving failed: {e}");
    }
}

fn parse_start_or_exit(s: &str) -> chrono::DateTime<Local> {
    match parse_start_input(s) {
        Some(t) => t,
        None => {
            eprintln!("Could not parse start time {s:?}. Expected \"YYYY-MM-DD HH:MM\".");
            std::process::exit(1);
        }
    }
}

/// Launch the interactive weekly grid.
pub fn cmd_ui(store: TaskStore) {
    if let Err(e) = run_tui(store) {
        eprintln!("TUI error: {e}");
        std::process::exit(1);
    }
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_add(
    store: &mut TaskStore,
    title: String,
    notes: Option<String>,
    details: Option<String>,
    start: Option<String>,
    duration: Option<u32>,
    category: Option<Category>,
    color: Option<String>,
    done: bool,
) {
    let start_time = start.as_deref().map(parse_start_or_exit);
    let draft = TaskDraft {
        title,
        notes: notes.unwrap_or_default(),
        details: details.unwrap_or_default(),
        start_time,
        duration,
        category,
        title_color: color,
        is_done: done,
    };
    match store.create(draft) {
        Ok(id) => {
            println!("Added task {id}");
            warn_unsaved(store);
        }
        Err(e) => {
            eprintln!("Cannot add task: {e}");
            std::process::exit(1);
        }
    }
}

fn format_when(task: &Task) -> String {
    match task.start_time {
        Some(start) => {
            let local = start.naive_local();
            format!(
                "{} {}",
                local.date().format("%Y-%m-%d %a"),
                format_time(&start)
            )
        }
        None => "unscheduled".to_string(),
    }
}

pub fn cmd_list(store: &TaskStore, all: bool, unscheduled: bool) {
    let rows: Vec<&Task> = store
        .tasks()
        .iter()
        .filter(|t| all || !t.is_done)
        .filter(|t| !unscheduled || t.start_time.is_none())
        .collect();

    if rows.is_empty() {
        println!("No tasks.");
        return;
    }

    println!(
        "{:>4}  {:<20}  {:>5}  {:<4}  {:<15}  {}",
        "ID", "WHEN", "MIN", "DONE", "CATEGORY", "TITLE"
    );
    for t in rows {
        println!(
            "{:>4}  {:<20}  {:>5}  {:<4}  {:<15}  {}",
            t.id,
            format_when(t),
            t.duration,
            if t.is_done { "yes" } else { "-" },
            format_category(t.category),
            t.title
        );
    }
}

pub fn cmd_week(store: &TaskStore, date: Option<String>) {
    let anchor = match date {
        Some(s) => match NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d") {
            Ok(d) => d,
            Err(_) => {
                eprintln!("Could not parse date {s:?}. Expected YYYY-MM-DD.");
                std::process::exit(1);
            }
        },
        None => Local::now().date_naive(),
    };

    let monday = week_monday(anchor);
    let (start, end) = week_bounds(anchor);
    println!("Week of {}", format_week_range(start.date(), end.date()));

    let week = store.week_tasks(anchor);
    if week.is_empty() {
        println!("  (empty)");
    } else {
        for day in 0..7 {
            let date = monday + chrono::Duration::days(day);
            let mut day_tasks: Vec<&&Task> = week
                .iter()
                .filter(|t| {
                    t.start_time
                        .map(|s| s.naive_local().date() == date)
                        .unwrap_or(false)
                })
                .collect();
            if day_tasks.is_empty() {
                continue;
            }
            day_tasks.sort_by_key(|t| t.start_time);

            println!("  {} ({})", date.format("%A"), format_day_date(date));
            for t in day_tasks {
                let Some(start) = t.start_time else { continue };
                let local = start.naive_local();
                let marker = if slot_index(local.hour(), local.minute()).is_none() {
                    "  (outside grid)"
                } else {
                    ""
                };
                println!(
                    "    {} [{:>3}m] {}{}{}",
                    format_time(&start),
                    t.duration,
                    if t.is_done { "[x] " } else { "" },
                    t.title,
                    marker
                );
            }
        }
    }

    let sidebar = store.unscheduled();
    if !sidebar.is_empty() {
        println!("Unscheduled:");
        for t in sidebar {
            println!("    {} ({})", t.title, format_category(t.category));
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_edit(
    store: &mut TaskStore,
    id: u64,
    title: Option<String>,
    notes: Option<String>,
    details: Option<String>,
    start: Option<String>,
    clear_start: bool,
    duration: Option<u32>,
    category: Option<Category>,
    clear_category: bool,
    color: Option<String>,
    auto_color: bool,
) {
    let start_time = if clear_start {
        Some(None)
    } else {
        start.as_deref().map(|s| Some(parse_start_or_exit(s)))
    };
    let category = if clear_category {
        Some(None)
    } else {
        category.map(Some)
    };
    let title_color = if auto_color { Some(String::new()) } else { color };

    let patch = TaskPatch {
        title,
        notes,
        details,
        start_time,
        duration,
        category,
        title_color,
        is_done: None,
    };
    apply_patch(store, id, patch, "Updated");
}

pub fn cmd_done(store: &mut TaskStore, id: u64) {
    apply_patch(store, id, TaskPatch::set_done(true), "Completed");
}

pub fn cmd_reopen(store: &mut TaskStore, id: u64) {
    apply_patch(store, id, TaskPatch::set_done(false), "Reopened");
}

fn apply_patch(store: &mut TaskStore, id: u64, patch: TaskPatch, verb: &str) {
    match store.update(id, patch) {
        Ok(true) => {
            println!("{verb} task {id}");
            warn_unsaved(store);
        }
        Ok(false) => {
            eprintln!("No task with id {id}");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Cannot update task {id}: {e}");
            std::process::exit(1);
        }
    }
}

pub fn cmd_delete(store: &mut TaskStore, id: u64) {
    if store.delete(id) {
        println!("Deleted task {id}");
        warn_unsaved(store);
    } else {
        eprintln!("No task with id {id}");
        std::process::exit(1);
    }
}

pub fn cmd_export(store: &TaskStore, output: Option<PathBuf>) {
    let dir = output.unwrap_or_else(|| PathBuf::from("."));
    match export_backup(store.tasks(), &dir) {
        Ok(path) => println!("Exported {} tasks to {}", store.tasks().len(), path.display()),
        Err(e) => {
            eprintln!("Export failed: {e}");
            std::process::exit(1);
        }
    }
}

pub fn cmd_colors() {
    for (label, hex) in color_options() {
        println!("{hex}  {label}");
    }
}

pub fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "wkly", &mut io::stdout());
}

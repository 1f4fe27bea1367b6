use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Weekly task planner for the terminal.
/// Storage defaults to ~/.wkly/weekly-planner-tasks.json or a path passed via --db.
#[derive(Parser)]
#[command(name = "wkly", version, about = "Weekly task planner with a Monday-Sunday slot grid")]
pub struct Cli {
    /// Path to the JSON task file.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

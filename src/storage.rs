//! Durable storage and backup export for the task collection.
//!
//! The planner persists the entire collection as one pretty-printed JSON
//! array in a fixed file. The `Storage` trait keeps the store decoupled
//! from the on-disk format so tests can substitute in-memory or failing
//! implementations.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::error::PlannerError;
use crate::task::Task;

/// Fixed file name of the task document inside the planner data directory.
pub const STORAGE_FILE: &str = "weekly-planner-tasks.json";

/// Durable key-value-style store for the full task collection.
pub trait Storage {
    /// Load the stored collection. Missing or corrupt data yields an empty
    /// collection; this never fails past the boundary.
    fn load_all(&self) -> Vec<Task>;

    /// Overwrite the stored collection with `tasks`.
    fn save_all(&self, tasks: &[Task]) -> Result<(), PlannerError>;
}

/// JSON-file storage: one document, overwritten atomically on every save.
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: PathBuf) -> Self {
        JsonFileStorage { path }
    }

    /// Storage under the standard file name inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(STORAGE_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Storage for JsonFileStorage {
    fn load_all(&self) -> Vec<Task> {
        if !self.path.exists() {
            return Vec::new();
        }
        match fs::read_to_string(&self.path) {
            Ok(buf) => match serde_json::from_str(&buf) {
                Ok(tasks) => tasks,
                Err(e) => {
                    eprintln!("Error parsing task file, starting fresh: {e}");
                    Vec::new()
                }
            },
            Err(e) => {
                eprintln!("Error reading task file, starting fresh: {e}");
                Vec::new()
            }
        }
    }

    fn save_all(&self, tasks: &[Task]) -> Result<(), PlannerError> {
        // Atomic-ish write via temp + rename.
        let tmp = self.path.with_extension("json.tmp");
        let data = serde_json::to_string_pretty(tasks)?;
        let mut f = File::create(&tmp)?;
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(tmp, &self.path)?;
        Ok(())
    }
}

/// Write the current collection to `dir` as a dated backup file and return
/// its path. The date in the name is the export date, not any task date.
pub fn export_backup(tasks: &[Task], dir: &Path) -> Result<PathBuf, PlannerError> {
    let name = format!("weekly-planner-backup-{}.json", Local::now().format("%Y-%m-%d"));
    let path = dir.join(name);
    let data = serde_json::to_string_pretty(tasks)?;
    fs::write(&path, data)?;
    Ok(path)
}

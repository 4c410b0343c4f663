//! Runtime configuration.
//!
//! The only setting is where the task database lives. It comes from the
//! `--db` flag or the `TASKS_DB` environment variable (both handled by clap),
//! falling back to the platform data directory.

use std::path::PathBuf;

/// Directory name under the platform data directory.
const APP_DIR: &str = "tasktide";
const TASKS_FILE: &str = "tasks.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Path to the tasks database file (`tasks.json`).
    pub tasks_path: PathBuf,
}

impl Config {
    /// Resolves the database path.
    ///
    /// The path is determined in the following order:
    /// 1. `db` (from `--db` or `TASKS_DB`).
    /// 2. `~/.local/share/tasktide/tasks.json` (on Linux).
    /// 3. `./tasks.json` (fallback).
    pub fn resolve(db: Option<PathBuf>) -> Self {
        let tasks_path = db.unwrap_or_else(|| {
            dirs::data_local_dir()
                .map(|p| p.join(APP_DIR))
                .unwrap_or_else(|| PathBuf::from("."))
                .join(TASKS_FILE)
        });
        Config { tasks_path }
    }
}

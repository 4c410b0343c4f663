use std::fs::{self, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::Config;
use crate::error::Result;
use crate::models::Task;

/// JSON-file backed task store.
///
/// Every write rewrites the whole file.
#[derive(Debug, Clone)]
pub struct Storage {
    path: PathBuf,
}

impl Storage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Storage { path: path.into() }
    }

    pub fn from_config(config: &Config) -> Self {
        Storage::new(config.tasks_path.clone())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads all tasks from the storage file.
    ///
    /// Returns an empty vector if the file does not exist or is empty. A
    /// file that exists but does not parse is an error, so a corrupt
    /// database is never overwritten with an empty list.
    pub fn load_tasks(&self) -> Result<Vec<Task>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no task database yet");
            return Ok(Vec::new());
        }
        let mut f = OpenOptions::new().read(true).open(&self.path)?;
        let mut s = String::new();
        f.read_to_string(&mut s)?;
        if s.trim().is_empty() {
            return Ok(Vec::new());
        }
        let tasks: Vec<Task> = serde_json::from_str(&s)?;
        debug!(path = %self.path.display(), count = tasks.len(), "loaded tasks");
        Ok(tasks)
    }

    /// Saves or updates a single task.
    ///
    /// If a task with the same id exists it is replaced; otherwise the task is appended.
    pub fn save_task(&self, task: &Task) -> Result<()> {
        let mut tasks = self.load_tasks()?;
        if let Some(t) = tasks.iter_mut().find(|t| t.id == task.id) {
            *t = task.clone();
        } else {
            tasks.push(task.clone());
        }
        self.save_tasks(&tasks)
    }

    /// Saves the given list of tasks, overwriting the existing file.
    pub fn save_tasks(&self, tasks: &[Task]) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }
        let s = serde_json::to_string_pretty(tasks)?;
        let mut f = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)?;
        f.write_all(s.as_bytes())?;
        debug!(path = %self.path.display(), count = tasks.len(), "saved tasks");
        Ok(())
    }

    /// Deletes the tasks database file.
    pub fn delete_database(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

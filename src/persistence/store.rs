use crate::domain::DailyTasks;
use crate::persistence::files::{atomic_write, meta_file, tasks_file};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings stored in meta.json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Whether untracked time is automatically attributed to idle
    #[serde(default = "default_true")]
    pub auto_idle_enabled: bool,
    /// Active tag filter for task views, if any
    #[serde(default)]
    pub tag_filter: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_idle_enabled: true,
            tag_filter: None,
        }
    }
}

/// The persistence gateway: load/save of the full multi-day record and
/// the settings file, rooted at one data directory.
#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Load the saved task record. A missing, unreadable, or unparsable
    /// file degrades to the empty record; the bad-payload case is
    /// reported on stderr rather than surfaced as an error.
    pub fn load_tasks(&self) -> DailyTasks {
        let path = tasks_file(&self.dir);
        if !path.exists() {
            return DailyTasks::new();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(data) => data,
                Err(e) => {
                    eprintln!(
                        "Warning: ignoring unparsable task data in {}: {}",
                        path.display(),
                        e
                    );
                    DailyTasks::new()
                }
            },
            Err(e) => {
                eprintln!("Warning: could not read {}: {}", path.display(), e);
                DailyTasks::new()
            }
        }
    }

    /// Overwrite the full task record
    pub fn save_tasks(&self, data: &DailyTasks) -> Result<()> {
        let json = serde_json::to_string_pretty(data)?;
        atomic_write(tasks_file(&self.dir), &json)
    }

    /// Load settings, falling back to defaults when absent or unparsable
    pub fn load_settings(&self) -> Settings {
        let path = meta_file(&self.dir);
        if !path.exists() {
            return Settings::default();
        }

        std::fs::read_to_string(&path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<()> {
        let json = serde_json::to_string_pretty(settings)?;
        atomic_write(meta_file(&self.dir), &json)
    }
}

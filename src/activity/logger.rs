use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::{self, schema::LoggingConfig};

// ---------------------------------------------------------------------------
// Activity log entry (JSONL)
// ---------------------------------------------------------------------------

/// A single entry in the activity log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub timestamp: String,
    /// `"add"`, `"edit"`, `"remove"`, or `"show_translations"`.
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub lang: Option<String>,
    /// Whether the change was applied.
    #[serde(default = "default_true")]
    pub success: bool,
    /// Error message, or the new preference for `show_translations`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub detail: Option<String>,
}

fn default_true() -> bool {
    true
}

impl ActivityEntry {
    /// Build an entry stamped with the current time.
    pub fn now(action: &str) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            action: action.to_string(),
            key: None,
            lang: None,
            success: true,
            detail: None,
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    /// Mark the entry as failed with `error`.
    pub fn failed(mut self, error: impl Into<String>) -> Self {
        self.success = false;
        self.detail = Some(error.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Logging functions
// ---------------------------------------------------------------------------

/// Append `entry` to the activity log. Does nothing when logging is off.
///
/// Write failures are ignored; a broken log never fails a request.
pub fn log_activity(config: &LoggingConfig, entry: &ActivityEntry) {
    if !config.enabled {
        return;
    }
    let _ = append_entry(&activity_log_path(config), entry);
}

// ---------------------------------------------------------------------------
// Reading log entries
// ---------------------------------------------------------------------------

/// Read all activity entries, oldest first.
///
/// Silently skips malformed lines. Returns an empty vec if the file does not
/// exist or cannot be read.
pub fn read_all_entries(config: &LoggingConfig) -> Vec<ActivityEntry> {
    let Ok(file) = fs::File::open(activity_log_path(config)) else {
        return Vec::new();
    };

    let reader = BufReader::new(file);
    reader
        .lines()
        .map_while(Result::ok)
        .filter_map(|line| serde_json::from_str::<ActivityEntry>(&line).ok())
        .collect()
}

/// The last `limit` entries, oldest first.
pub fn read_recent(config: &LoggingConfig, limit: usize) -> Vec<ActivityEntry> {
    let mut entries = read_all_entries(config);
    let skip = entries.len().saturating_sub(limit);
    entries.drain(..skip);
    entries
}

// ---------------------------------------------------------------------------
// File I/O
// ---------------------------------------------------------------------------

fn append_entry(path: &Path, entry: &ActivityEntry) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let json = serde_json::to_string(entry)?;
    writeln!(file, "{json}")?;

    Ok(())
}

/// Return the path to the activity log file.
pub fn activity_log_path(config: &LoggingConfig) -> PathBuf {
    config::expand_home(&config.path)
}

//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw logging configuration
///
/// ```toml
/// [logging]
/// events_file = "~/.local/share/council/events.jsonl"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Append lifecycle events as JSON lines to this file
    pub events_file: Option<PathBuf>,
}

impl FileLoggingConfig {
    /// `events_file` with a leading `~/` expanded to the home directory.
    pub fn events_path(&self) -> Option<PathBuf> {
        let path = self.events_file.as_ref()?;
        match path.strip_prefix("~") {
            Ok(rest) => dirs::home_dir().map(|home| home.join(rest)),
            Err(_) => Some(path.clone()),
        }
    }
}

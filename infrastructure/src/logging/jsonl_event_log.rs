//! JSONL file writer for council lifecycle events.
//!
//! Each [`CouncilEvent`] is serialized as a single JSON line carrying its
//! `type` tag plus a `timestamp`, appended to the file via a buffered writer.

use council_application::ports::event_sink::EventSink;
use council_domain::CouncilEvent;
use serde_json::Value;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// Event log that appends one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes after every event and
/// on `Drop`.
pub struct JsonlEventLog {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlEventLog {
    /// Open (or create) the log at `path` in append mode.
    ///
    /// Creates parent directories as needed. Returns `None` if the file
    /// cannot be opened; a run without an event log is still a valid run.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!(
                    "Could not create event log directory {}: {}",
                    parent.display(),
                    e
                );
                return None;
            }
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open event log {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EventSink for JsonlEventLog {
    fn emit(&self, event: &CouncilEvent) {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

        let mut record = match serde_json::to_value(event) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => return,
        };
        record.insert("timestamp".to_string(), Value::String(timestamp));

        let Ok(line) = serde_json::to_string(&record) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }
}

impl Drop for JsonlEventLog {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

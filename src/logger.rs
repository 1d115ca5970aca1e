use std::fs::{File, OpenOptions};
use std::io::Write;

use chrono::Utc;
use serde_json::{json, Map, Value};
use tracing::warn;

/// NDJSON capture of device traffic, for protocol debugging against real
/// hardware.
pub enum TrafficLogMode {
    /// Every response body in full.
    Full,
    /// First response in full, then only keys that changed.
    Changes,
}

pub(crate) struct TrafficLogger {
    mode: TrafficLogMode,
    file: File,
    previous_status: Option<Value>,
}

impl TrafficLogger {
    pub fn new(mode: TrafficLogMode, path: &str) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            mode,
            file,
            previous_status: None,
        })
    }

    pub fn log_request(&mut self, method: &str, path: &str, body: Option<&Value>) {
        let entry = json!({
            "ts": Utc::now().to_rfc3339(),
            "dir": "req",
            "method": method,
            "path": path,
            "body": body,
        });
        self.write_line(&entry);
    }

    pub fn log_status(&mut self, status: u16, body: &Value) {
        match self.mode {
            TrafficLogMode::Full => {
                let entry = json!({
                    "ts": Utc::now().to_rfc3339(),
                    "dir": "status",
                    "status": status,
                    "body": body,
                });
                self.write_line(&entry);
            }
            TrafficLogMode::Changes => {
                match self.previous_status.take() {
                    None => {
                        let entry = json!({
                            "ts": Utc::now().to_rfc3339(),
                            "dir": "status",
                            "status": status,
                            "full": true,
                            "body": body,
                        });
                        self.write_line(&entry);
                    }
                    Some(prev) => {
                        let changes = diff_keys(&prev, body);
                        let entry = json!({
                            "ts": Utc::now().to_rfc3339(),
                            "dir": "status",
                            "status": status,
                            "changes": changes,
                        });
                        self.write_line(&entry);
                    }
                }
                self.previous_status = Some(body.clone());
            }
        }
    }

    fn write_line(&mut self, entry: &Value) {
        if let Ok(line) = serde_json::to_string(entry)
            && let Err(e) = writeln!(self.file, "{line}")
        {
            warn!("failed to write traffic log entry: {e}");
        }
    }
}

/// Key-level diff of two status objects. Status bodies are flat, so no
/// recursion is needed.
fn diff_keys(previous: &Value, current: &Value) -> Vec<Value> {
    let empty = Map::new();
    let prev_map = previous.as_object().unwrap_or(&empty);
    let curr_map = current.as_object().unwrap_or(&empty);

    let mut changes = Vec::new();
    for (key, curr_val) in curr_map {
        let prev_val = prev_map.get(key).unwrap_or(&Value::Null);
        if prev_val != curr_val {
            changes.push(json!({
                "key": key,
                "old": prev_val,
                "new": curr_val,
            }));
        }
    }
    for (key, prev_val) in prev_map {
        if !curr_map.contains_key(key) {
            changes.push(json!({
                "key": key,
                "old": prev_val,
                "new": Value::Null,
            }));
        }
    }
    changes
}

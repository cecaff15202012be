/// faceit-watch — Event Logger
/// Append-only JSONL audit trail of what the watcher did, one file per UTC day.

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

pub struct EventLogger {
    log_dir: PathBuf,
}

impl EventLogger {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        let dir = log_dir.into();
        fs::create_dir_all(&dir).ok();
        Self { log_dir: dir }
    }

    pub fn log<T: Serialize>(&self, event: &T) -> Result<()> {
        let date = Utc::now().format("%Y-%m-%d").to_string();
        let path = self.log_dir.join(format!("{date}.jsonl"));
        let line = serde_json::to_string(event)?;
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("open {}", path.display()))?;
        writeln!(f, "{line}")?;
        Ok(())
    }
}

pub fn now_iso() -> String {
    Utc::now().to_rfc3339()
}

// ── Event types ──────────────────────────────────────────────────────────────

#[derive(Serialize, Debug)]
pub struct MatchNotifiedEvent {
    pub ts:       String,
    pub event:    &'static str,   // "MATCH_NOTIFIED"
    pub nickname: String,
    pub match_id: String,
    pub map:      String,
    pub region:   String,
}

#[derive(Serialize, Debug)]
pub struct WatcherCycleEvent {
    pub ts:             String,
    pub event:          &'static str,   // "WATCHER_CYCLE"
    pub cycle:          u64,
    pub phase:          String,         // "unchanged" | "new_match" | "error"
    pub match_id:       Option<String>,
    pub next_poll_secs: u64,
}

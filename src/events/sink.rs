//! Daily log file mirror
//!
//! Appends one formatted line per event log entry to
//! `<log_dir>/agent-YYYY-MM-DD.log`. Write failures are reported through
//! `tracing` and never reach the caller.

use super::LogEntry;
use parking_lot::Mutex;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Formats an entry the way it appears in the log file
pub fn format_entry(entry: &LogEntry) -> String {
    let agent = entry
        .agent_id
        .as_ref()
        .map(|id| format!("[{}] ", id))
        .unwrap_or_default();
    format!(
        "{} {:<7} {}{}",
        entry.timestamp.to_rfc3339(),
        entry.level.as_str().to_uppercase(),
        agent,
        entry.message
    )
}

/// Writer for the daily log file
pub struct FileSink {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File the entry lands in, chosen by its date
    pub fn path_for(&self, entry: &LogEntry) -> PathBuf {
        self.dir
            .join(format!("agent-{}.log", entry.timestamp.format("%Y-%m-%d")))
    }

    fn append(&self, entry: &LogEntry) -> std::io::Result<()> {
        let _guard = self.lock.lock();
        std::fs::create_dir_all(&self.dir)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path_for(entry))?;
        writeln!(file, "{}", format_entry(entry))
    }

    pub fn write(&self, entry: &LogEntry) {
        if let Err(e) = self.append(entry) {
            tracing::warn!(error = %e, dir = %self.dir.display(), "Failed to write log file entry");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::LogLevel;
    use chrono::Utc;
    use tempfile::TempDir;

    fn entry(level: LogLevel, agent_id: Option<&str>, message: &str) -> LogEntry {
        LogEntry {
            id: "log-1".to_string(),
            timestamp: Utc::now(),
            level,
            agent_id: agent_id.map(str::to_string),
            agent_name: None,
            message: message.to_string(),
            data: None,
        }
    }

    #[test]
    fn formats_level_and_agent() {
        let line = format_entry(&entry(LogLevel::Success, Some("agent-001"), "Agent started"));
        assert!(line.contains("SUCCESS [agent-001] Agent started"));

        let line = format_entry(&entry(LogLevel::Info, None, "boot"));
        assert!(line.ends_with("INFO    boot"));
    }

    #[test]
    fn appends_to_daily_file() {
        let dir = TempDir::new().unwrap();
        let sink = FileSink::new(dir.path().join("logs"));
        let first = entry(LogLevel::Info, Some("a1"), "first");
        let second = entry(LogLevel::Error, Some("a1"), "second");

        sink.write(&first);
        sink.write(&second);

        let content = std::fs::read_to_string(sink.path_for(&first)).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("first"));
        assert!(lines[1].contains("ERROR"));
    }
}

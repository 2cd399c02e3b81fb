//! Process-wide event log
//!
//! Two append-only, bounded streams shared by every agent:
//! - leveled log entries (oldest dropped first past `log_capacity`)
//! - transaction records for the UI feed (newest-first, `transaction_capacity`)
//!
//! The composition root creates one [`EventLog`] and hands clones of it to
//! every component. Each entry is also mirrored to `tracing` and, when
//! configured, to a daily log file. Live subscribers receive every event
//! through a broadcast channel.

mod feed;
mod sink;

pub use feed::BoundedFeed;
pub use sink::{format_entry, FileSink};

use crate::config::{EventLogConfig, LoggingConfig};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Log entries retained in memory by default
pub const LOG_FEED_CAPACITY: usize = 100;
/// Transaction records retained in memory by default
pub const TRANSACTION_FEED_CAPACITY: usize = 50;

const SUBSCRIBER_BUFFER: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
    Success,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Success => "success",
        }
    }
}

/// One leveled log message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Send,
    Receive,
    FundRequest,
    Mint,
    TokenTransfer,
    BalanceCheck,
}

impl TransactionKind {
    pub const ALL: [TransactionKind; 6] = [
        TransactionKind::Send,
        TransactionKind::Receive,
        TransactionKind::FundRequest,
        TransactionKind::Mint,
        TransactionKind::TokenTransfer,
        TransactionKind::BalanceCheck,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Success,
    Error,
    Pending,
}

/// Transaction attempt as shown in the UI feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: String,
    pub agent_id: String,
    pub agent_name: String,
    pub kind: TransactionKind,
    pub description: String,
    pub status: TxStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    /// Ledger signature, or empty when the attempt failed
    pub signature: String,
    pub timestamp: DateTime<Utc>,
}

/// Item delivered to live subscribers
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "event", rename_all = "snake_case")]
pub enum Event {
    Log(LogEntry),
    Transaction(TransactionRecord),
}

struct Inner {
    logs: RwLock<VecDeque<LogEntry>>,
    log_capacity: usize,
    transactions: RwLock<BoundedFeed<TransactionRecord>>,
    sink: Option<FileSink>,
    events: broadcast::Sender<Event>,
}

/// Shared handle to the event log
#[derive(Clone)]
pub struct EventLog {
    inner: Arc<Inner>,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(&EventLogConfig::default())
    }
}

impl EventLog {
    /// In-memory event log without a file mirror
    pub fn new(config: &EventLogConfig) -> Self {
        Self::build(config, None)
    }

    /// Event log that also appends to daily files when enabled in `logging`
    pub fn with_logging(config: &EventLogConfig, logging: &LoggingConfig) -> Self {
        let sink = logging
            .enable_file_logging
            .then(|| FileSink::new(logging.log_dir.clone()));
        Self::build(config, sink)
    }

    fn build(config: &EventLogConfig, sink: Option<FileSink>) -> Self {
        let (events, _) = broadcast::channel(SUBSCRIBER_BUFFER);
        let log_capacity = config.log_capacity.max(1);
        Self {
            inner: Arc::new(Inner {
                logs: RwLock::new(VecDeque::with_capacity(log_capacity)),
                log_capacity,
                transactions: RwLock::new(BoundedFeed::new(config.transaction_capacity)),
                sink,
                events,
            }),
        }
    }

    /// Append a log entry
    pub fn log(&self, level: LogLevel, message: impl Into<String>, agent_id: Option<&str>, data: Option<Value>) {
        self.append(LogEntry {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            level,
            agent_id: agent_id.map(str::to_string),
            agent_name: None,
            message: message.into(),
            data,
        });
    }

    pub fn info(&self, message: impl Into<String>, agent_id: Option<&str>) {
        self.log(LogLevel::Info, message, agent_id, None);
    }

    pub fn warn(&self, message: impl Into<String>, agent_id: Option<&str>) {
        self.log(LogLevel::Warn, message, agent_id, None);
    }

    pub fn error(&self, message: impl Into<String>, agent_id: Option<&str>) {
        self.log(LogLevel::Error, message, agent_id, None);
    }

    pub fn success(&self, message: impl Into<String>, agent_id: Option<&str>) {
        self.log(LogLevel::Success, message, agent_id, None);
    }

    /// Logger that stamps every entry with one agent's id and name
    pub fn for_agent(&self, agent_id: impl Into<String>, agent_name: impl Into<String>) -> AgentLogger {
        AgentLogger {
            log: self.clone(),
            agent_id: agent_id.into(),
            agent_name: agent_name.into(),
        }
    }

    /// Append a fully built entry
    pub fn append(&self, entry: LogEntry) {
        mirror_to_tracing(&entry);
        if let Some(sink) = &self.inner.sink {
            sink.write(&entry);
        }

        {
            let mut logs = self.inner.logs.write();
            logs.push_back(entry.clone());
            while logs.len() > self.inner.log_capacity {
                logs.pop_front();
            }
        }

        // No subscribers is fine
        let _ = self.inner.events.send(Event::Log(entry));
    }

    /// Add a record to the transaction feed
    pub fn record_transaction(&self, record: TransactionRecord) {
        self.inner.transactions.write().push(record.clone());
        let _ = self.inner.events.send(Event::Transaction(record));
    }

    /// Last `count` entries, in append order
    pub fn recent_logs(&self, count: usize) -> Vec<LogEntry> {
        let logs = self.inner.logs.read();
        let skip = logs.len().saturating_sub(count);
        logs.iter().skip(skip).cloned().collect()
    }

    /// Last `count` entries of one agent, in append order
    pub fn agent_logs(&self, agent_id: &str, count: usize) -> Vec<LogEntry> {
        let logs = self.inner.logs.read();
        let mut matching: Vec<LogEntry> = logs
            .iter()
            .rev()
            .filter(|e| e.agent_id.as_deref() == Some(agent_id))
            .take(count)
            .cloned()
            .collect();
        matching.reverse();
        matching
    }

    /// Up to `count` newest transaction records, newest-first
    pub fn recent_transactions(&self, count: usize) -> Vec<TransactionRecord> {
        self.inner.transactions.read().newest(count)
    }

    /// Snapshot of the whole transaction feed, newest-first
    pub fn transactions(&self) -> Vec<TransactionRecord> {
        self.inner.transactions.read().to_vec()
    }

    pub fn log_count(&self) -> usize {
        self.inner.logs.read().len()
    }

    /// Live stream of every subsequent log entry and transaction record
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.inner.events.subscribe()
    }

    /// Drop every retained log entry
    pub fn clear(&self) {
        self.inner.logs.write().clear();
    }
}

fn mirror_to_tracing(entry: &LogEntry) {
    let agent_id = entry.agent_id.as_deref().unwrap_or("-");
    match entry.level {
        LogLevel::Info => tracing::info!(agent_id = agent_id, "{}", entry.message),
        LogLevel::Warn => tracing::warn!(agent_id = agent_id, "{}", entry.message),
        LogLevel::Error => tracing::error!(agent_id = agent_id, "{}", entry.message),
        LogLevel::Success => {
            tracing::info!(agent_id = agent_id, outcome = "success", "{}", entry.message)
        }
    }
}

/// Event log handle bound to a single agent
#[derive(Clone)]
pub struct AgentLogger {
    log: EventLog,
    agent_id: String,
    agent_name: String,
}

impl AgentLogger {
    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub fn agent_name(&self) -> &str {
        &self.agent_name
    }

    pub fn event_log(&self) -> &EventLog {
        &self.log
    }

    pub fn log(&self, level: LogLevel, message: impl Into<String>, data: Option<Value>) {
        self.log.append(LogEntry {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            level,
            agent_id: Some(self.agent_id.clone()),
            agent_name: Some(self.agent_name.clone()),
            message: message.into(),
            data,
        });
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message, None);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.log(LogLevel::Warn, message, None);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message, None);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.log(LogLevel::Success, message, None);
    }

    /// Add a record for this agent to the transaction feed
    pub fn record_transaction(
        &self,
        kind: TransactionKind,
        description: impl Into<String>,
        status: TxStatus,
        amount: Option<f64>,
        signature: Option<String>,
    ) {
        self.log.record_transaction(TransactionRecord {
            id: format!("tx-{}", Uuid::new_v4()),
            agent_id: self.agent_id.clone(),
            agent_name: self.agent_name.clone(),
            kind,
            description: description.into(),
            status,
            amount,
            signature: signature.unwrap_or_default(),
            timestamp: Utc::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn small_log(log_capacity: usize, transaction_capacity: usize) -> EventLog {
        EventLog::new(&EventLogConfig {
            log_capacity,
            transaction_capacity,
        })
    }

    #[test]
    fn recent_logs_keep_append_order() {
        let log = EventLog::default();
        log.info("one", None);
        log.warn("two", Some("a1"));
        log.success("three", None);

        let recent: Vec<String> = log.recent_logs(2).into_iter().map(|e| e.message).collect();
        assert_eq!(recent, vec!["two", "three"]);
        assert_eq!(log.recent_logs(10).len(), 3);
    }

    #[test]
    fn retention_drops_oldest_logs() {
        let log = small_log(3, 3);
        for i in 0..5 {
            log.info(format!("m{}", i), None);
        }
        let messages: Vec<String> = log.recent_logs(10).into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["m2", "m3", "m4"]);
        assert_eq!(log.log_count(), 3);
    }

    #[test]
    fn agent_logs_filter_then_take_last() {
        let log = EventLog::default();
        log.info("a-1", Some("a"));
        log.info("b-1", Some("b"));
        log.info("a-2", Some("a"));
        log.error("a-3", Some("a"));
        log.info("system", None);

        let messages: Vec<String> = log.agent_logs("a", 2).into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["a-2", "a-3"]);
        assert!(log.agent_logs("missing", 5).is_empty());
    }

    #[test]
    fn agent_logger_stamps_identity() {
        let log = EventLog::default();
        let agent = log.for_agent("agent-007", "Bond");
        agent.success("licensed");

        let entry = &log.recent_logs(1)[0];
        assert_eq!(entry.level, LogLevel::Success);
        assert_eq!(entry.agent_id.as_deref(), Some("agent-007"));
        assert_eq!(entry.agent_name.as_deref(), Some("Bond"));
    }

    #[test]
    fn transaction_feed_is_bounded_newest_first() {
        let log = small_log(10, 2);
        let agent = log.for_agent("a1", "Alpha");
        for i in 0..3 {
            agent.record_transaction(
                TransactionKind::Send,
                format!("tx{}", i),
                TxStatus::Success,
                Some(0.1),
                Some(format!("sig{}", i)),
            );
        }

        let feed: Vec<String> = log.transactions().into_iter().map(|t| t.description).collect();
        assert_eq!(feed, vec!["tx2", "tx1"]);
        assert_eq!(log.recent_transactions(1)[0].signature, "sig2");
    }

    #[tokio::test]
    async fn subscribers_see_live_events() {
        let log = EventLog::default();
        let mut rx = log.subscribe();

        log.error("boom", Some("a1"));
        log.for_agent("a1", "Alpha").record_transaction(
            TransactionKind::FundRequest,
            "Funding 1 SOL",
            TxStatus::Error,
            Some(1.0),
            None,
        );

        match rx.recv().await.unwrap() {
            Event::Log(entry) => assert_eq!(entry.message, "boom"),
            other => panic!("unexpected event {:?}", other),
        }
        match rx.recv().await.unwrap() {
            Event::Transaction(record) => {
                assert_eq!(record.status, TxStatus::Error);
                assert!(record.signature.is_empty());
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn file_mirror_follows_logging_config() {
        let dir = TempDir::new().unwrap();
        let logging = LoggingConfig {
            log_dir: dir.path().to_path_buf(),
            enable_file_logging: true,
        };
        let log = EventLog::with_logging(&EventLogConfig::default(), &logging);
        log.info("persisted", Some("a1"));

        let files: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(files.len(), 1);

        let disabled = TempDir::new().unwrap();
        let logging = LoggingConfig {
            log_dir: disabled.path().to_path_buf(),
            enable_file_logging: false,
        };
        EventLog::with_logging(&EventLogConfig::default(), &logging).info("memory only", None);
        assert_eq!(std::fs::read_dir(disabled.path()).unwrap().count(), 0);
    }

    #[test]
    fn clear_keeps_transactions() {
        let log = EventLog::default();
        log.info("x", None);
        log.for_agent("a", "A")
            .record_transaction(TransactionKind::Mint, "m", TxStatus::Pending, None, None);
        log.clear();
        assert_eq!(log.log_count(), 0);
        assert_eq!(log.transactions().len(), 1);
    }
}

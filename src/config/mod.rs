//! Configuration for the agentic wallet system
//!
//! Every section has conservative defaults. Values can be overridden from a
//! JSON config file (see `main.rs`) and then from environment variables:
//!
//! ```bash
//! export AGENT_ACTION_INTERVAL_MS=5000
//! export AGENT_MAX_RETRIES=5
//! export AGENT_PERSIST_KEYS=false
//! ```

mod env;

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub use env::env_vars;

/// Agent behavior tuning shared by every agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSettings {
    /// Base delay between two actions of one agent (milliseconds)
    pub action_interval_ms: u64,
    /// Smallest amount a trader will transfer
    pub min_transfer_amount: f64,
    /// Largest amount a trader will transfer
    pub max_transfer_amount: f64,
    /// Amount requested from the faucet when an agent runs low
    pub funding_amount: f64,
}

impl AgentSettings {
    pub fn action_interval(&self) -> Duration {
        Duration::from_millis(self.action_interval_ms)
    }
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            action_interval_ms: 10_000,
            min_transfer_amount: 0.001,
            max_transfer_amount: 0.1,
            funding_amount: 1.0,
        }
    }
}

/// Retry policy for ledger operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionConfig {
    /// Total attempts per operation, including the first
    pub max_retries: u32,
    /// Base backoff; attempt `n` waits `retry_delay_ms * n`
    pub retry_delay_ms: u64,
    /// Upper bound on a single attempt before it counts as failed; 0 disables
    #[serde(default = "default_confirmation_timeout_ms")]
    pub confirmation_timeout_ms: u64,
}

fn default_confirmation_timeout_ms() -> u64 {
    30_000
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay_ms: 1_000,
            confirmation_timeout_ms: default_confirmation_timeout_ms(),
        }
    }
}

/// Key storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Write generated keypairs to `keystore_dir`
    pub persist_keys: bool,
    /// Directory holding one JSON file per wallet
    pub keystore_dir: PathBuf,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            persist_keys: true,
            keystore_dir: PathBuf::from("./data/wallets"),
        }
    }
}

/// Log mirroring settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Directory for daily log files
    pub log_dir: PathBuf,
    /// Append every event log entry to `log_dir/agent-YYYY-MM-DD.log`
    pub enable_file_logging: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("./data/logs"),
            enable_file_logging: true,
        }
    }
}

/// Retention windows for the in-memory event log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogConfig {
    /// Log entries kept in memory
    pub log_capacity: usize,
    /// Transaction records kept in memory
    pub transaction_capacity: usize,
}

impl Default for EventLogConfig {
    fn default() -> Self {
        Self {
            log_capacity: crate::events::LOG_FEED_CAPACITY,
            transaction_capacity: crate::events::TRANSACTION_FEED_CAPACITY,
        }
    }
}

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub agent: AgentSettings,
    #[serde(default)]
    pub transactions: TransactionConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub event_log: EventLogConfig,
}

impl Config {
    /// Defaults overridden by any `AGENT_*` environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Reject settings the executor and agents cannot work with
    pub fn validate(&self) -> Result<()> {
        let agent = &self.agent;
        if agent.action_interval_ms == 0 {
            return Err(Error::Config(
                "action_interval_ms must be greater than zero".to_string(),
            ));
        }
        if !(agent.min_transfer_amount > 0.0) {
            return Err(Error::Config(format!(
                "min_transfer_amount must be positive, got {}",
                agent.min_transfer_amount
            )));
        }
        if agent.max_transfer_amount < agent.min_transfer_amount {
            return Err(Error::Config(format!(
                "max_transfer_amount ({}) is below min_transfer_amount ({})",
                agent.max_transfer_amount, agent.min_transfer_amount
            )));
        }
        if !(agent.funding_amount > 0.0) {
            return Err(Error::Config(format!(
                "funding_amount must be positive, got {}",
                agent.funding_amount
            )));
        }
        if self.transactions.max_retries == 0 {
            return Err(Error::Config("max_retries must be at least 1".to_string()));
        }
        if self.security.persist_keys && self.security.keystore_dir.as_os_str().is_empty() {
            return Err(Error::Config(
                "keystore_dir is required when persist_keys is enabled".to_string(),
            ));
        }
        if self.event_log.log_capacity == 0 || self.event_log.transaction_capacity == 0 {
            return Err(Error::Config(
                "event log capacities must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

//! Environment variable overrides
//!
//! Each recognized variable replaces the matching field of [`Config`].
//! Unset variables leave the current value untouched; malformed values are
//! reported as configuration errors instead of being silently ignored.

use super::Config;
use crate::{Error, Result};
use std::path::PathBuf;
use std::str::FromStr;

/// Environment variable names
pub mod env_vars {
    pub const ACTION_INTERVAL_MS: &str = "AGENT_ACTION_INTERVAL_MS";
    pub const MIN_TRANSFER_AMOUNT: &str = "AGENT_MIN_TRANSFER_AMOUNT";
    pub const MAX_TRANSFER_AMOUNT: &str = "AGENT_MAX_TRANSFER_AMOUNT";
    pub const FUNDING_AMOUNT: &str = "AGENT_FUNDING_AMOUNT";
    pub const MAX_RETRIES: &str = "AGENT_MAX_RETRIES";
    pub const RETRY_DELAY_MS: &str = "AGENT_RETRY_DELAY_MS";
    pub const PERSIST_KEYS: &str = "AGENT_PERSIST_KEYS";
    pub const KEYSTORE_DIR: &str = "AGENT_KEYSTORE_DIR";
    pub const LOG_DIR: &str = "AGENT_LOG_DIR";
    pub const FILE_LOGGING: &str = "AGENT_FILE_LOGGING";
}

fn parse<T>(name: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| Error::Config(format!("{}={:?}: {}", name, raw, e)))
}

impl Config {
    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary lookup (used by tests)
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(env_vars::ACTION_INTERVAL_MS) {
            self.agent.action_interval_ms = parse(env_vars::ACTION_INTERVAL_MS, &v)?;
        }
        if let Some(v) = lookup(env_vars::MIN_TRANSFER_AMOUNT) {
            self.agent.min_transfer_amount = parse(env_vars::MIN_TRANSFER_AMOUNT, &v)?;
        }
        if let Some(v) = lookup(env_vars::MAX_TRANSFER_AMOUNT) {
            self.agent.max_transfer_amount = parse(env_vars::MAX_TRANSFER_AMOUNT, &v)?;
        }
        if let Some(v) = lookup(env_vars::FUNDING_AMOUNT) {
            self.agent.funding_amount = parse(env_vars::FUNDING_AMOUNT, &v)?;
        }
        if let Some(v) = lookup(env_vars::MAX_RETRIES) {
            self.transactions.max_retries = parse(env_vars::MAX_RETRIES, &v)?;
        }
        if let Some(v) = lookup(env_vars::RETRY_DELAY_MS) {
            self.transactions.retry_delay_ms = parse(env_vars::RETRY_DELAY_MS, &v)?;
        }
        if let Some(v) = lookup(env_vars::PERSIST_KEYS) {
            self.security.persist_keys = parse(env_vars::PERSIST_KEYS, &v)?;
        }
        if let Some(v) = lookup(env_vars::KEYSTORE_DIR) {
            tracing::debug!(keystore_dir = %v, "Using keystore directory from environment");
            self.security.keystore_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup(env_vars::LOG_DIR) {
            self.logging.log_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup(env_vars::FILE_LOGGING) {
            self.logging.enable_file_logging = parse(env_vars::FILE_LOGGING, &v)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup<'a>(vars: &'a HashMap<&'a str, &'a str>) -> impl Fn(&str) -> Option<String> + 'a {
        move |name| vars.get(name).map(|v| v.to_string())
    }

    #[test]
    fn overrides_only_present_variables() {
        let vars = HashMap::from([
            (env_vars::ACTION_INTERVAL_MS, "2500"),
            (env_vars::PERSIST_KEYS, "false"),
            (env_vars::KEYSTORE_DIR, "/var/lib/wallets"),
        ]);
        let mut config = Config::default();
        config.apply_env_from(lookup(&vars)).unwrap();

        assert_eq!(config.agent.action_interval_ms, 2500);
        assert!(!config.security.persist_keys);
        assert_eq!(config.security.keystore_dir, PathBuf::from("/var/lib/wallets"));
        assert_eq!(config.transactions.max_retries, 3);
        assert_eq!(config.agent.funding_amount, 1.0);
    }

    #[test]
    fn malformed_value_is_a_config_error() {
        let vars = HashMap::from([(env_vars::MAX_RETRIES, "three")]);
        let mut config = Config::default();
        let err = config.apply_env_from(lookup(&vars)).unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg.contains(env_vars::MAX_RETRIES)));
    }
}

//! Error types for the agentic wallet system

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Agent {0} not found")]
    NotFound(String),

    #[error("Agent {0} already exists")]
    DuplicateAgent(String),

    #[error("Unknown agent behavior: {0}")]
    UnknownBehavior(String),

    #[error("Keypair not initialized for agent {0}")]
    Uninitialized(String),

    #[error("{operation} failed after {attempts} attempts: {message}")]
    LedgerOperation {
        operation: String,
        attempts: u32,
        message: String,
    },

    #[error("Agent task failed: {0}")]
    AgentTask(String),

    #[error("Ledger error: {0}")]
    Ledger(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Key storage error: {0}")]
    KeyStore(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

//! Agentic Wallet
//!
//! A set of autonomous wallet agents that, on their own schedule:
//! - Request funding when their balance runs low
//! - Transfer funds to counterparties or fresh accounts
//! - Create token mints and mint tokens
//! - Watch their balance
//!
//! # Execution Model
//!
//! - Every agent runs an independent tokio task, one action at a time
//! - Ledger calls go through a retrying executor with linear backoff
//! - Outcomes land in the agent's action history and in a shared, bounded
//!   event log that a presentation layer can poll or tail
//! - Private keys never leave the wallet module except to be persisted

pub mod agents;
pub mod config;
pub mod events;
pub mod executor;
pub mod ledger;
pub mod simulation;
pub mod wallet;

mod error;

// Re-export commonly used types
pub use agents::{Agent, AgentConfig, AgentContext, AgentRegistry, AgentStatus, BehaviorKind};
pub use config::Config;
pub use error::{Error, Result};
pub use events::{EventLog, LogEntry, LogLevel, TransactionRecord, TxStatus};
pub use executor::TransactionExecutor;
pub use ledger::{AccountId, InMemoryLedger, LedgerClient, TransactionResult};
pub use simulation::{simulate_tick, SimulationState, Simulator};
pub use wallet::{FileKeyStore, KeyStore, Keypair, MemoryKeyStore};

//! Ledger client interface
//!
//! The ledger is an external service. Agents never call it directly: every
//! call goes through [`crate::executor::TransactionExecutor`], which adds
//! bounded retries. Implementations report transport-level failures as
//! `Err(..)` (these are retried) and business-level rejections such as
//! insufficient funds as `Ok(TransactionResult::failed(..))` (these are not).

mod memory;

pub use memory::InMemoryLedger;

use crate::wallet::Keypair;
use crate::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Public account identifier on the ledger
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First characters of the id, for log lines
    pub fn short(&self) -> &str {
        self.0
            .char_indices()
            .nth(8)
            .map_or(self.0.as_str(), |(end, _)| &self.0[..end])
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a token mint created on the ledger
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MintId(String);

impl MintId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of a ledger transaction
///
/// Exactly one of `signature` and `error` is set; use the constructors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionResult {
    pub success: bool,
    /// Reference signature of the confirmed transaction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    /// Human-readable failure description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl TransactionResult {
    pub fn succeeded(signature: impl Into<String>) -> Self {
        Self {
            success: true,
            signature: Some(signature.into()),
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            signature: None,
            error: Some(error.into()),
            timestamp: Utc::now(),
        }
    }
}

/// Balance, transfer, funding and token primitives of the ledger
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Native balance of `account`
    async fn get_balance(&self, account: &AccountId) -> Result<f64>;

    /// Move `amount` native units from `from` to `to`
    async fn transfer(
        &self,
        from: &Keypair,
        to: &AccountId,
        amount: f64,
    ) -> Result<TransactionResult>;

    /// Ask the faucet to credit `amount` to `account`
    async fn request_funding(&self, account: &AccountId, amount: f64)
        -> Result<TransactionResult>;

    /// Create a token mint controlled by `authority`
    async fn create_token_mint(&self, authority: &Keypair, decimals: u8) -> Result<MintId>;

    /// Mint `amount` raw token units of `mint` to `destination`
    async fn mint_token(
        &self,
        mint: &MintId,
        destination: &AccountId,
        authority: &Keypair,
        amount: u64,
    ) -> Result<TransactionResult>;

    /// Move `amount` raw token units of `mint` from `from` to `to`
    async fn transfer_token(
        &self,
        mint: &MintId,
        from: &Keypair,
        to: &AccountId,
        amount: u64,
    ) -> Result<TransactionResult>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn succeeded_carries_only_signature() {
        let result = TransactionResult::succeeded("5h3x");
        assert!(result.success);
        assert_eq!(result.signature.as_deref(), Some("5h3x"));
        assert!(result.error.is_none());
    }

    #[test]
    fn failed_carries_only_error() {
        let result = TransactionResult::failed("insufficient funds");
        assert!(!result.success);
        assert!(result.signature.is_none());
        assert_eq!(result.error.as_deref(), Some("insufficient funds"));
    }

    #[test]
    fn serialization_omits_missing_side() {
        let json = serde_json::to_value(TransactionResult::failed("boom")).unwrap();
        assert!(json.get("signature").is_none());
        assert_eq!(json["error"], "boom");
    }

    #[test]
    fn short_account_id_is_bounded() {
        assert_eq!(AccountId::new("abcdef0123456789").short(), "abcdef01");
        assert_eq!(AccountId::new("abc").short(), "abc");
    }

    #[test]
    fn short_account_id_counts_characters() {
        assert_eq!(AccountId::new("aéééééééééé").short(), "aééééééé");
        assert_eq!(AccountId::new("ééé").short(), "ééé");
    }
}

//! Retrying transaction executor
//!
//! The only caller of the [`LedgerClient`]. Every operation gets up to
//! `max_retries` attempts with linear backoff (`retry_delay_ms * attempt`).
//! An attempt still pending after `confirmation_timeout_ms` counts as a
//! failure; zero disables the bound.

use crate::config::TransactionConfig;
use crate::ledger::{AccountId, LedgerClient, MintId, TransactionResult};
use crate::wallet::Keypair;
use crate::{Error, Result};
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Deferred ledger operation for [`TransactionExecutor::batch_transactions`]
pub type TransactionOp<'a> =
    Box<dyn FnMut() -> BoxFuture<'a, Result<TransactionResult>> + Send + 'a>;

pub struct TransactionExecutor {
    ledger: Arc<dyn LedgerClient>,
    config: TransactionConfig,
}

impl TransactionExecutor {
    pub fn new(ledger: Arc<dyn LedgerClient>, config: TransactionConfig) -> Self {
        Self { ledger, config }
    }

    pub fn config(&self) -> &TransactionConfig {
        &self.config
    }

    pub fn ledger(&self) -> &Arc<dyn LedgerClient> {
        &self.ledger
    }

    fn attempts(&self) -> u32 {
        self.config.max_retries.max(1)
    }

    async fn attempt<T, Fut>(&self, future: Fut) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        let timeout_ms = self.config.confirmation_timeout_ms;
        if timeout_ms == 0 {
            return future.await;
        }
        tokio::time::timeout(Duration::from_millis(timeout_ms), future)
            .await
            .unwrap_or_else(|_| {
                Err(Error::Ledger(format!(
                    "no confirmation within {}ms",
                    timeout_ms
                )))
            })
    }

    /// Run `operation` until it succeeds or the attempts run out
    ///
    /// The last error is returned wrapped in [`Error::LedgerOperation`].
    pub async fn execute_with_retry<T, F, Fut>(&self, label: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_retries = self.attempts();
        let mut last_error = None;

        for attempt in 1..=max_retries {
            match self.attempt(operation()).await {
                Ok(value) => {
                    if attempt > 1 {
                        tracing::debug!(label = label, attempt = attempt, "Operation recovered");
                    }
                    return Ok(value);
                }
                Err(e) => {
                    tracing::warn!(
                        label = label,
                        attempt = attempt,
                        max_retries = max_retries,
                        error = %e,
                        "Ledger operation failed"
                    );
                    last_error = Some(e);
                    if attempt < max_retries {
                        let delay = self.config.retry_delay_ms.saturating_mul(u64::from(attempt));
                        tokio::time::sleep(Duration::from_millis(delay)).await;
                    }
                }
            }
        }

        Err(Error::LedgerOperation {
            operation: label.to_string(),
            attempts: max_retries,
            message: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no attempt made".to_string()),
        })
    }

    /// Like [`Self::execute_with_retry`], but exhaustion becomes a failed result
    pub async fn execute_transaction<F, Fut>(&self, label: &str, operation: F) -> TransactionResult
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<TransactionResult>>,
    {
        match self.execute_with_retry(label, operation).await {
            Ok(result) => result,
            Err(e) => TransactionResult::failed(e.to_string()),
        }
    }

    /// Run each operation in order; one failure does not stop the rest
    pub async fn batch_transactions(&self, operations: Vec<TransactionOp<'_>>) -> Vec<TransactionResult> {
        let mut results = Vec::with_capacity(operations.len());
        for (index, operation) in operations.into_iter().enumerate() {
            let label = format!("batch[{}]", index);
            results.push(self.execute_transaction(&label, operation).await);
        }
        results
    }

    pub async fn get_balance(&self, account: &AccountId) -> Result<f64> {
        self.execute_with_retry("get_balance", move || self.ledger.get_balance(account))
            .await
    }

    pub async fn request_funding(&self, account: &AccountId, amount: f64) -> TransactionResult {
        self.execute_transaction("request_funding", move || {
            self.ledger.request_funding(account, amount)
        })
        .await
    }

    pub async fn transfer(&self, from: &Keypair, to: &AccountId, amount: f64) -> TransactionResult {
        self.execute_transaction("transfer", move || self.ledger.transfer(from, to, amount))
            .await
    }

    pub async fn create_token_mint(&self, authority: &Keypair, decimals: u8) -> Result<MintId> {
        self.execute_with_retry("create_token_mint", move || {
            self.ledger.create_token_mint(authority, decimals)
        })
        .await
    }

    pub async fn mint_token(
        &self,
        mint: &MintId,
        destination: &AccountId,
        authority: &Keypair,
        amount: u64,
    ) -> TransactionResult {
        self.execute_transaction("mint_token", move || {
            self.ledger.mint_token(mint, destination, authority, amount)
        })
        .await
    }

    pub async fn transfer_token(
        &self,
        mint: &MintId,
        from: &Keypair,
        to: &AccountId,
        amount: u64,
    ) -> TransactionResult {
        self.execute_transaction("transfer_token", move || {
            self.ledger.transfer_token(mint, from, to, amount)
        })
        .await
    }
}

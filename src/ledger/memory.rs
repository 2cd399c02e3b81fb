//! In-process ledger
//!
//! Keeps native balances and token holdings in memory. Used by the demo
//! binary and by tests; it can be told to fail the next N calls so retry
//! and error paths are observable.

use super::{AccountId, LedgerClient, MintId, TransactionResult};
use crate::wallet::Keypair;
use crate::{Error, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

struct MintState {
    authority: AccountId,
    decimals: u8,
    supply: u64,
    holdings: HashMap<AccountId, u64>,
}

#[derive(Default)]
struct LedgerState {
    balances: HashMap<AccountId, f64>,
    mints: HashMap<MintId, MintState>,
    nonce: u64,
    /// Calls that still succeed before the injected failures start
    failure_delay: u32,
    /// Remaining calls that fail with a transport error
    pending_failures: u32,
}

impl LedgerState {
    fn next_nonce(&mut self) -> u64 {
        self.nonce += 1;
        self.nonce
    }

    fn take_failure(&mut self, operation: &str) -> Result<()> {
        if self.failure_delay > 0 {
            self.failure_delay -= 1;
            return Ok(());
        }
        if self.pending_failures > 0 {
            self.pending_failures -= 1;
            return Err(Error::Ledger(format!("{}: ledger unavailable", operation)));
        }
        Ok(())
    }
}

/// Ledger held entirely in process memory
#[derive(Default)]
pub struct InMemoryLedger {
    state: Mutex<LedgerState>,
    calls: AtomicU64,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the native balance of `account`
    pub fn set_balance(&self, account: &AccountId, balance: f64) {
        self.state.lock().balances.insert(account.clone(), balance);
    }

    /// Native balance without going through the client interface
    pub fn balance_of(&self, account: &AccountId) -> f64 {
        self.state
            .lock()
            .balances
            .get(account)
            .copied()
            .unwrap_or(0.0)
    }

    /// Token holdings of `account` for `mint`
    pub fn token_balance(&self, mint: &MintId, account: &AccountId) -> u64 {
        self.state
            .lock()
            .mints
            .get(mint)
            .and_then(|m| m.holdings.get(account).copied())
            .unwrap_or(0)
    }

    /// Total minted supply of `mint`
    pub fn token_supply(&self, mint: &MintId) -> Option<u64> {
        self.state.lock().mints.get(mint).map(|m| m.supply)
    }

    /// Decimals `mint` was created with
    pub fn token_decimals(&self, mint: &MintId) -> Option<u8> {
        self.state.lock().mints.get(mint).map(|m| m.decimals)
    }

    /// Make the next `count` calls fail with a transport error
    pub fn fail_next(&self, count: u32) {
        self.fail_next_after(0, count);
    }

    /// Let `skip` calls through, then fail the following `count`
    pub fn fail_next_after(&self, skip: u32, count: u32) {
        let mut state = self.state.lock();
        state.failure_delay = skip;
        state.pending_failures = count;
    }

    /// Number of client calls received so far
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    fn begin(&self, operation: &str) -> Result<parking_lot::MutexGuard<'_, LedgerState>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock();
        state.take_failure(operation)?;
        Ok(state)
    }
}

fn reference(parts: &[&str], nonce: u64) -> String {
    let mut hasher = blake3::Hasher::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update(b":");
    }
    hasher.update(&nonce.to_le_bytes());
    hasher.finalize().to_hex().to_string()
}

#[async_trait]
impl LedgerClient for InMemoryLedger {
    async fn get_balance(&self, account: &AccountId) -> Result<f64> {
        let state = self.begin("get_balance")?;
        Ok(state.balances.get(account).copied().unwrap_or(0.0))
    }

    async fn transfer(
        &self,
        from: &Keypair,
        to: &AccountId,
        amount: f64,
    ) -> Result<TransactionResult> {
        let mut state = self.begin("transfer")?;
        if !(amount > 0.0) {
            return Ok(TransactionResult::failed(format!(
                "invalid transfer amount {}",
                amount
            )));
        }
        let source = from.public_key().clone();
        let available = state.balances.get(&source).copied().unwrap_or(0.0);
        if available < amount {
            return Ok(TransactionResult::failed(format!(
                "insufficient funds: have {:.4}, need {:.4}",
                available, amount
            )));
        }
        state.balances.insert(source.clone(), available - amount);
        *state.balances.entry(to.clone()).or_insert(0.0) += amount;

        let nonce = state.next_nonce();
        let message = format!("transfer:{}:{}:{}:{}", source, to, amount, nonce);
        Ok(TransactionResult::succeeded(from.sign(message.as_bytes())))
    }

    async fn request_funding(
        &self,
        account: &AccountId,
        amount: f64,
    ) -> Result<TransactionResult> {
        let mut state = self.begin("request_funding")?;
        if !(amount > 0.0) {
            return Ok(TransactionResult::failed(format!(
                "invalid funding amount {}",
                amount
            )));
        }
        *state.balances.entry(account.clone()).or_insert(0.0) += amount;
        let nonce = state.next_nonce();
        let amount = amount.to_string();
        Ok(TransactionResult::succeeded(reference(
            &["fund", account.as_str(), &amount],
            nonce,
        )))
    }

    async fn create_token_mint(&self, authority: &Keypair, decimals: u8) -> Result<MintId> {
        let mut state = self.begin("create_token_mint")?;
        let nonce = state.next_nonce();
        let mint = MintId::new(reference(&["mint", authority.public_key().as_str()], nonce));
        state.mints.insert(
            mint.clone(),
            MintState {
                authority: authority.public_key().clone(),
                decimals,
                supply: 0,
                holdings: HashMap::new(),
            },
        );
        Ok(mint)
    }

    async fn mint_token(
        &self,
        mint: &MintId,
        destination: &AccountId,
        authority: &Keypair,
        amount: u64,
    ) -> Result<TransactionResult> {
        let mut state = self.begin("mint_token")?;
        let nonce = state.next_nonce();
        let Some(mint_state) = state.mints.get_mut(mint) else {
            return Ok(TransactionResult::failed(format!("unknown mint {}", mint)));
        };
        if &mint_state.authority != authority.public_key() {
            return Ok(TransactionResult::failed(
                "signer is not the mint authority",
            ));
        }
        mint_state.supply = mint_state.supply.saturating_add(amount);
        *mint_state.holdings.entry(destination.clone()).or_insert(0) += amount;

        let message = format!("mint_to:{}:{}:{}:{}", mint, destination, amount, nonce);
        Ok(TransactionResult::succeeded(authority.sign(message.as_bytes())))
    }

    async fn transfer_token(
        &self,
        mint: &MintId,
        from: &Keypair,
        to: &AccountId,
        amount: u64,
    ) -> Result<TransactionResult> {
        let mut state = self.begin("transfer_token")?;
        let nonce = state.next_nonce();
        let Some(mint_state) = state.mints.get_mut(mint) else {
            return Ok(TransactionResult::failed(format!("unknown mint {}", mint)));
        };
        let source = from.public_key();
        let held = mint_state.holdings.get(source).copied().unwrap_or(0);
        if held < amount {
            return Ok(TransactionResult::failed(format!(
                "insufficient token balance: have {}, need {}",
                held, amount
            )));
        }
        mint_state.holdings.insert(source.clone(), held - amount);
        *mint_state.holdings.entry(to.clone()).or_insert(0) += amount;

        let message = format!("transfer_token:{}:{}:{}:{}:{}", mint, source, to, amount, nonce);
        Ok(TransactionResult::succeeded(from.sign(message.as_bytes())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn transfer_moves_funds() {
        let ledger = InMemoryLedger::new();
        let alice = Keypair::generate();
        let bob = Keypair::generate();
        ledger.set_balance(alice.public_key(), 1.0);

        let result = ledger.transfer(&alice, bob.public_key(), 0.25).await.unwrap();
        assert!(result.success);
        assert!(result.signature.is_some());
        assert!((ledger.balance_of(alice.public_key()) - 0.75).abs() < 1e-9);
        assert!((ledger.balance_of(bob.public_key()) - 0.25).abs() < 1e-9);
    }

    #[tokio::test]
    async fn overdraft_is_a_failed_result_not_an_error() {
        let ledger = InMemoryLedger::new();
        let alice = Keypair::generate();
        let bob = Keypair::generate();
        ledger.set_balance(alice.public_key(), 0.1);

        let result = ledger.transfer(&alice, bob.public_key(), 0.5).await.unwrap();
        assert!(!result.success);
        assert!(result.error.unwrap().contains("insufficient funds"));
        assert_eq!(ledger.balance_of(bob.public_key()), 0.0);
    }

    #[tokio::test]
    async fn injected_failures_are_consumed_in_order() {
        let ledger = InMemoryLedger::new();
        let account = AccountId::new("acct");
        ledger.fail_next(2);

        assert!(ledger.get_balance(&account).await.is_err());
        assert!(ledger.get_balance(&account).await.is_err());
        assert_eq!(ledger.get_balance(&account).await.unwrap(), 0.0);
        assert_eq!(ledger.call_count(), 3);
    }

    #[tokio::test]
    async fn delayed_failures_skip_the_first_calls() {
        let ledger = InMemoryLedger::new();
        let account = AccountId::new("acct");
        ledger.fail_next_after(1, 1);

        assert!(ledger.get_balance(&account).await.is_ok());
        assert!(ledger.get_balance(&account).await.is_err());
        assert!(ledger.get_balance(&account).await.is_ok());
    }

    #[tokio::test]
    async fn only_mint_authority_can_mint() {
        let ledger = InMemoryLedger::new();
        let authority = Keypair::generate();
        let intruder = Keypair::generate();

        let mint = ledger.create_token_mint(&authority, 9).await.unwrap();
        assert_eq!(ledger.token_decimals(&mint), Some(9));

        let denied = ledger
            .mint_token(&mint, intruder.public_key(), &intruder, 10)
            .await
            .unwrap();
        assert!(!denied.success);

        let minted = ledger
            .mint_token(&mint, authority.public_key(), &authority, 5_000)
            .await
            .unwrap();
        assert!(minted.success);
        assert_eq!(ledger.token_supply(&mint), Some(5_000));

        let moved = ledger
            .transfer_token(&mint, &authority, intruder.public_key(), 1_200)
            .await
            .unwrap();
        assert!(moved.success);
        assert_eq!(ledger.token_balance(&mint, authority.public_key()), 3_800);
        assert_eq!(ledger.token_balance(&mint, intruder.public_key()), 1_200);
    }
}

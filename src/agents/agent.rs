//! Agent core: identity, action loop and ledger helpers

use super::behavior::Behavior;
use super::{ActionKind, AgentAction, AgentConfig, BehaviorKind};
use crate::config::AgentSettings;
use crate::events::{AgentLogger, EventLog, TransactionKind, TxStatus};
use crate::executor::TransactionExecutor;
use crate::ledger::{AccountId, MintId, TransactionResult};
use crate::wallet::{KeyStore, Keypair};
use crate::{Error, Result};
use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use rand::rngs::StdRng;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Pause after an iteration that returned an error
pub const ERROR_COOLDOWN: Duration = Duration::from_millis(5_000);

/// Unit name used in log lines for native amounts
pub const NATIVE_SYMBOL: &str = "SOL";

/// Collaborators shared by every agent of a registry
#[derive(Clone)]
pub struct AgentContext {
    pub executor: Arc<TransactionExecutor>,
    pub keystore: Arc<dyn KeyStore>,
    pub events: EventLog,
    pub settings: AgentSettings,
}

/// Address and current balance of an agent's account
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountInfo {
    pub address: AccountId,
    pub balance: f64,
}

struct AgentCore {
    behavior: Behavior,
    rng: StdRng,
}

struct LoopHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// One autonomous wallet agent
///
/// Iterations never overlap: the behavior state and RNG sit behind an async
/// mutex held for the whole of [`Agent::step`].
pub struct Agent {
    config: RwLock<AgentConfig>,
    context: AgentContext,
    logger: AgentLogger,
    keypair: RwLock<Option<Arc<Keypair>>>,
    history: RwLock<Vec<AgentAction>>,
    core: tokio::sync::Mutex<AgentCore>,
    running: Mutex<Option<LoopHandle>>,
}

impl Agent {
    pub fn new(config: AgentConfig, behavior: Behavior, context: AgentContext, rng: StdRng) -> Self {
        let logger = context.events.for_agent(config.id.clone(), config.name.clone());
        Self {
            config: RwLock::new(config),
            context,
            logger,
            keypair: RwLock::new(None),
            history: RwLock::new(Vec::new()),
            core: tokio::sync::Mutex::new(AgentCore { behavior, rng }),
            running: Mutex::new(None),
        }
    }

    pub fn id(&self) -> String {
        self.config.read().id.clone()
    }

    pub fn name(&self) -> String {
        self.config.read().name.clone()
    }

    pub fn behavior_kind(&self) -> BehaviorKind {
        self.config.read().behavior
    }

    /// Snapshot of the agent's config
    pub fn config(&self) -> AgentConfig {
        self.config.read().clone()
    }

    pub fn is_active(&self) -> bool {
        self.config.read().is_active
    }

    pub fn is_running(&self) -> bool {
        self.running.lock().is_some()
    }

    pub fn settings(&self) -> &AgentSettings {
        &self.context.settings
    }

    pub fn logger(&self) -> &AgentLogger {
        &self.logger
    }

    pub fn events(&self) -> &EventLog {
        &self.context.events
    }

    /// Public account id, once initialized
    pub fn public_key(&self) -> Option<AccountId> {
        self.keypair.read().as_ref().map(|k| k.public_key().clone())
    }

    fn keypair(&self) -> Result<Arc<Keypair>> {
        self.keypair
            .read()
            .clone()
            .ok_or_else(|| Error::Uninitialized(self.id()))
    }

    /// Load the account identity from key storage, or create and persist one
    pub async fn initialize(&self) -> Result<()> {
        if self.keypair.read().is_some() {
            return Ok(());
        }

        let wallet_id = self.config.read().wallet_id.clone();
        let keypair = match self.context.keystore.load(&wallet_id).await? {
            Some(keypair) => keypair,
            None => {
                let keypair = {
                    let mut core = self.core.lock().await;
                    Keypair::generate_with(&mut core.rng)
                };
                self.context.keystore.save(&keypair, &wallet_id).await?;
                self.record_action(ActionKind::CreateWallet, "Wallet created", None);
                keypair
            }
        };

        self.logger.info(format!(
            "Agent initialized with wallet: {}",
            keypair.public_key()
        ));
        *self.keypair.write() = Some(Arc::new(keypair));
        Ok(())
    }

    /// Spawn the action loop; a warning no-op when already running
    pub fn start(self: &Arc<Self>) -> Result<()> {
        self.keypair()?;

        let mut running = self.running.lock();
        if running.is_some() {
            self.logger.warn("Agent is already running");
            return Ok(());
        }

        let (shutdown, signal) = watch::channel(false);
        self.config.write().is_active = true;
        self.logger.success("Agent started");

        let agent = Arc::clone(self);
        let task = tokio::spawn(async move { agent.run_loop(signal).await });
        *running = Some(LoopHandle { shutdown, task });
        Ok(())
    }

    /// Cancel the pending wake-up and wait for the loop to exit
    ///
    /// An iteration already in flight finishes and is recorded.
    pub async fn stop(&self) -> Result<()> {
        let handle = self.running.lock().take();
        self.config.write().is_active = false;

        if let Some(LoopHandle { shutdown, task }) = handle {
            let _ = shutdown.send(true);
            task.await
                .map_err(|e| Error::AgentTask(format!("{}: {}", self.id(), e)))?;
        }

        self.logger.info("Agent stopped");
        Ok(())
    }

    async fn run_loop(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        loop {
            if *shutdown.borrow() {
                break;
            }

            let delay = match self.step().await {
                Ok(delay) => delay,
                Err(e) => {
                    self.logger.error(format!("Error in agent loop: {}", e));
                    ERROR_COOLDOWN
                }
            };

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown.changed() => break,
            }
        }
        tracing::debug!(agent_id = %self.id(), "Agent loop exited");
    }

    /// Run one decide-act iteration and return the delay before the next
    pub async fn step(&self) -> Result<Duration> {
        self.keypair()?;
        let mut core = self.core.lock().await;
        let AgentCore { behavior, rng } = &mut *core;
        behavior.perform(self, rng).await?;
        Ok(behavior.action_interval(&self.context.settings, rng))
    }

    /// Point a trader at the accounts it pays; `false` for other behaviors
    pub async fn set_counterparties(&self, counterparties: Vec<AccountId>) -> bool {
        match &mut self.core.lock().await.behavior {
            Behavior::Trader(trader) => {
                trader.set_counterparties(counterparties);
                true
            }
            _ => false,
        }
    }

    /// Mint created by a token manager, if any
    pub async fn token_mint(&self) -> Option<MintId> {
        match &self.core.lock().await.behavior {
            Behavior::TokenManager(manager) => manager.mint().cloned(),
            _ => None,
        }
    }

    /// Current balance, not recorded in the history
    pub async fn balance(&self) -> Result<f64> {
        let keypair = self.keypair()?;
        self.context.executor.get_balance(keypair.public_key()).await
    }

    pub async fn account_info(&self) -> Result<AccountInfo> {
        let keypair = self.keypair()?;
        let balance = self.context.executor.get_balance(keypair.public_key()).await?;
        Ok(AccountInfo {
            address: keypair.public_key().clone(),
            balance,
        })
    }

    /// Ask the faucet for `amount`
    pub async fn request_funding(&self, amount: f64) -> Result<TransactionResult> {
        let keypair = self.keypair()?;
        self.logger
            .info(format!("Requesting funding of {} {}", amount, NATIVE_SYMBOL));
        let result = self
            .context
            .executor
            .request_funding(keypair.public_key(), amount)
            .await;
        self.record_outcome(
            ActionKind::RequestFunding,
            TransactionKind::FundRequest,
            format!("Funding {} {}", amount, NATIVE_SYMBOL),
            Some(amount),
            &result,
        );
        Ok(result)
    }

    /// Send `amount` native units to `to`
    pub async fn transfer_funds(&self, to: &AccountId, amount: f64) -> Result<TransactionResult> {
        let keypair = self.keypair()?;
        self.logger.info(format!(
            "Sending {:.4} {} to {}",
            amount,
            NATIVE_SYMBOL,
            to.short()
        ));
        let result = self.context.executor.transfer(&keypair, to, amount).await;
        self.record_outcome(
            ActionKind::SendFunds,
            TransactionKind::Send,
            format!("Sent {:.4} {} to {}", amount, NATIVE_SYMBOL, to.short()),
            Some(amount),
            &result,
        );
        Ok(result)
    }

    /// Read the balance and record the check
    pub async fn query_balance(&self) -> Result<f64> {
        let balance = self.balance().await?;
        self.record_action(
            ActionKind::QueryBalance,
            format!("Balance: {:.4} {}", balance, NATIVE_SYMBOL),
            None,
        );
        Ok(balance)
    }

    /// Create a token mint with this agent as authority
    pub async fn create_token_mint(&self, decimals: u8) -> Result<MintId> {
        let keypair = self.keypair()?;
        let mint = self
            .context
            .executor
            .create_token_mint(&keypair, decimals)
            .await?;
        self.record_action(
            ActionKind::InteractProgram,
            format!("Created token: {}", mint),
            None,
        );
        Ok(mint)
    }

    /// Mint `amount` units of `mint` into this agent's own account
    pub async fn mint_tokens(&self, mint: &MintId, amount: u64) -> Result<TransactionResult> {
        let keypair = self.keypair()?;
        self.logger.info(format!("Minting {} tokens", amount));
        let result = self
            .context
            .executor
            .mint_token(mint, keypair.public_key(), &keypair, amount)
            .await;
        self.record_outcome(
            ActionKind::MintToken,
            TransactionKind::Mint,
            format!("Minted {} tokens", amount),
            Some(amount as f64),
            &result,
        );
        Ok(result)
    }

    /// Move `amount` units of `mint` to `to`
    pub async fn transfer_tokens(
        &self,
        mint: &MintId,
        to: &AccountId,
        amount: u64,
    ) -> Result<TransactionResult> {
        let keypair = self.keypair()?;
        self.logger
            .info(format!("Transferring {} tokens to {}", amount, to.short()));
        let result = self
            .context
            .executor
            .transfer_token(mint, &keypair, to, amount)
            .await;
        self.record_outcome(
            ActionKind::TransferToken,
            TransactionKind::TokenTransfer,
            format!("Transferred {} tokens to {}", amount, to.short()),
            Some(amount as f64),
            &result,
        );
        Ok(result)
    }

    /// Append to the history; a present result is also logged by outcome
    pub fn record_action(
        &self,
        kind: ActionKind,
        description: impl Into<String>,
        result: Option<TransactionResult>,
    ) {
        let description = description.into();
        if let Some(result) = &result {
            if result.success {
                self.logger.success(description.clone());
            } else {
                self.logger.error(format!(
                    "{} - {}",
                    description,
                    result.error.as_deref().unwrap_or("unknown error")
                ));
            }
        }

        self.history.write().push(AgentAction {
            kind,
            timestamp: Utc::now(),
            description,
            result,
        });
    }

    fn record_outcome(
        &self,
        kind: ActionKind,
        tx_kind: TransactionKind,
        description: String,
        amount: Option<f64>,
        result: &TransactionResult,
    ) {
        let status = if result.success {
            TxStatus::Success
        } else {
            TxStatus::Error
        };
        self.logger.record_transaction(
            tx_kind,
            description.clone(),
            status,
            amount,
            result.signature.clone(),
        );
        self.record_action(kind, description, Some(result.clone()));
    }

    /// Full action history, oldest first
    pub fn action_history(&self) -> Vec<AgentAction> {
        self.history.read().clone()
    }

    /// Last `count` actions, oldest first
    pub fn recent_actions(&self, count: usize) -> Vec<AgentAction> {
        let history = self.history.read();
        let skip = history.len().saturating_sub(count);
        history[skip..].to_vec()
    }

    pub fn action_count(&self) -> usize {
        self.history.read().len()
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("config", &*self.config.read())
            .field("public_key", &self.public_key())
            .field("actions", &self.action_count())
            .finish()
    }
}

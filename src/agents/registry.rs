//! Agent registry
//!
//! Creates agents with shared collaborators, keeps them in insertion order,
//! and drives their lifecycle. Start/stop of all agents runs sequentially in
//! insertion order and stops at the first error.

use super::agent::{AccountInfo, Agent, AgentContext};
use super::behavior::Behavior;
use super::{AgentAction, AgentConfig, BehaviorKind};
use crate::{Error, Result};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Actions included in a status snapshot
pub const STATUS_RECENT_ACTIONS: usize = 5;

/// Point-in-time view of one agent
#[derive(Debug, Clone, Serialize)]
pub struct AgentStatus {
    pub config: AgentConfig,
    /// `None` when the balance could not be read
    pub account: Option<AccountInfo>,
    pub recent_actions: Vec<AgentAction>,
    pub total_actions: usize,
}

pub struct AgentRegistry {
    agents: RwLock<Vec<Arc<Agent>>>,
    context: AgentContext,
    /// Source of per-agent seeds when the registry is seeded
    seeds: Option<Mutex<StdRng>>,
}

impl AgentRegistry {
    pub fn new(context: AgentContext) -> Self {
        Self {
            agents: RwLock::new(Vec::new()),
            context,
            seeds: None,
        }
    }

    /// Registry whose agents draw reproducible random sequences
    pub fn with_seed(context: AgentContext, seed: u64) -> Self {
        Self {
            seeds: Some(Mutex::new(StdRng::seed_from_u64(seed))),
            ..Self::new(context)
        }
    }

    pub fn context(&self) -> &AgentContext {
        &self.context
    }

    fn agent_rng(&self) -> StdRng {
        match &self.seeds {
            Some(seeds) => StdRng::seed_from_u64(seeds.lock().gen()),
            None => StdRng::from_entropy(),
        }
    }

    /// Build, initialize and register a new agent
    pub async fn create_agent(
        &self,
        id: impl Into<String>,
        name: impl Into<String>,
        behavior: BehaviorKind,
    ) -> Result<Arc<Agent>> {
        let config = AgentConfig::new(id, name, behavior);
        let mut agents = self.agents.write().await;
        if agents.iter().any(|a| a.id() == config.id) {
            return Err(Error::DuplicateAgent(config.id));
        }

        let (id, name) = (config.id.clone(), config.name.clone());
        let agent = Arc::new(Agent::new(
            config,
            Behavior::new(behavior),
            self.context.clone(),
            self.agent_rng(),
        ));
        agent.initialize().await?;
        agents.push(Arc::clone(&agent));

        self.context.events.success(
            format!("Agent {} ({}) created with ID: {}", name, behavior, id),
            None,
        );
        Ok(agent)
    }

    /// Like [`Self::create_agent`] with a textual behavior name
    pub async fn create_agent_named(
        &self,
        id: impl Into<String>,
        name: impl Into<String>,
        behavior: &str,
    ) -> Result<Arc<Agent>> {
        let behavior = behavior.parse::<BehaviorKind>()?;
        self.create_agent(id, name, behavior).await
    }

    fn require(agent: Option<Arc<Agent>>, id: &str) -> Result<Arc<Agent>> {
        agent.ok_or_else(|| Error::NotFound(id.to_string()))
    }

    pub async fn start_agent(&self, id: &str) -> Result<()> {
        Self::require(self.get_agent(id).await, id)?.start()
    }

    pub async fn stop_agent(&self, id: &str) -> Result<()> {
        Self::require(self.get_agent(id).await, id)?.stop().await
    }

    pub async fn start_all_agents(&self) -> Result<()> {
        for agent in self.get_all_agents().await {
            agent.start()?;
        }
        Ok(())
    }

    pub async fn stop_all_agents(&self) -> Result<()> {
        for agent in self.get_all_agents().await {
            agent.stop().await?;
        }
        Ok(())
    }

    pub async fn get_agent(&self, id: &str) -> Option<Arc<Agent>> {
        self.agents
            .read()
            .await
            .iter()
            .find(|a| a.id() == id)
            .cloned()
    }

    /// Every agent, in creation order
    pub async fn get_all_agents(&self) -> Vec<Arc<Agent>> {
        self.agents.read().await.clone()
    }

    pub async fn get_active_agents(&self) -> Vec<Arc<Agent>> {
        self.agents
            .read()
            .await
            .iter()
            .filter(|a| a.is_active())
            .cloned()
            .collect()
    }

    pub async fn get_agent_status(&self, id: &str) -> Option<AgentStatus> {
        let agent = self.get_agent(id).await?;
        Some(Self::status_of(&agent).await)
    }

    pub async fn get_all_agent_statuses(&self) -> Vec<AgentStatus> {
        let mut statuses = Vec::new();
        for agent in self.get_all_agents().await {
            statuses.push(Self::status_of(&agent).await);
        }
        statuses
    }

    async fn status_of(agent: &Agent) -> AgentStatus {
        let account = match agent.account_info().await {
            Ok(info) => Some(info),
            Err(e) => {
                tracing::warn!(agent_id = %agent.id(), error = %e, "Could not read account");
                None
            }
        };
        AgentStatus {
            config: agent.config(),
            account,
            recent_actions: agent.recent_actions(STATUS_RECENT_ACTIONS),
            total_actions: agent.action_count(),
        }
    }

    pub async fn len(&self) -> usize {
        self.agents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.agents.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AgentSettings, TransactionConfig};
    use crate::events::EventLog;
    use crate::executor::TransactionExecutor;
    use crate::ledger::InMemoryLedger;
    use crate::wallet::MemoryKeyStore;

    fn registry() -> AgentRegistry {
        let executor = TransactionExecutor::new(
            Arc::new(InMemoryLedger::new()),
            TransactionConfig::default(),
        );
        AgentRegistry::new(AgentContext {
            executor: Arc::new(executor),
            keystore: Arc::new(MemoryKeyStore::new()),
            events: EventLog::default(),
            settings: AgentSettings::default(),
        })
    }

    #[tokio::test]
    async fn creation_keeps_insertion_order() {
        let registry = registry();
        for (id, kind) in [
            ("agent-003", BehaviorKind::Idle),
            ("agent-001", BehaviorKind::Trader),
            ("agent-002", BehaviorKind::TokenManager),
        ] {
            registry.create_agent(id, id, kind).await.unwrap();
        }

        let ids: Vec<String> = registry
            .get_all_agents()
            .await
            .iter()
            .map(|a| a.id())
            .collect();
        assert_eq!(ids, vec!["agent-003", "agent-001", "agent-002"]);
        assert_eq!(registry.len().await, 3);
        assert!(registry.get_agent("agent-001").await.unwrap().public_key().is_some());

        let created = registry.context().events.recent_logs(1).pop().unwrap();
        assert_eq!(
            created.message,
            "Agent agent-002 (token_manager) created with ID: agent-002"
        );
    }

    #[tokio::test]
    async fn duplicate_id_is_rejected() {
        let registry = registry();
        registry
            .create_agent("agent-001", "First", BehaviorKind::Trader)
            .await
            .unwrap();
        let err = registry
            .create_agent("agent-001", "Second", BehaviorKind::Idle)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateAgent(id) if id == "agent-001"));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn unknown_behavior_name_is_rejected() {
        let registry = registry();
        let err = registry
            .create_agent_named("agent-001", "Bad", "arbitrageur")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnknownBehavior(_)));
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn lookups_of_missing_agents() {
        let registry = registry();
        assert!(matches!(
            registry.start_agent("ghost").await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            registry.stop_agent("ghost").await,
            Err(Error::NotFound(_))
        ));
        assert!(registry.get_agent("ghost").await.is_none());
        assert!(registry.get_agent_status("ghost").await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn active_agents_follow_start_and_stop() {
        let registry = registry();
        registry
            .create_agent("agent-001", "Alpha", BehaviorKind::Idle)
            .await
            .unwrap();
        registry
            .create_agent("agent-002", "Beta", BehaviorKind::Idle)
            .await
            .unwrap();

        registry.start_agent("agent-002").await.unwrap();
        let active: Vec<String> = registry
            .get_active_agents()
            .await
            .iter()
            .map(|a| a.id())
            .collect();
        assert_eq!(active, vec!["agent-002"]);

        registry.start_all_agents().await.unwrap();
        assert_eq!(registry.get_active_agents().await.len(), 2);

        registry.stop_all_agents().await.unwrap();
        assert!(registry.get_active_agents().await.is_empty());
    }

    #[tokio::test]
    async fn status_shows_last_five_actions() {
        let registry = registry();
        let agent = registry
            .create_agent("agent-001", "Alpha", BehaviorKind::Trader)
            .await
            .unwrap();
        for _ in 0..7 {
            agent.query_balance().await.unwrap();
        }

        let status = registry.get_agent_status("agent-001").await.unwrap();
        assert_eq!(status.total_actions, 8);
        assert_eq!(status.recent_actions.len(), STATUS_RECENT_ACTIONS);
        assert_eq!(status.account.unwrap().balance, 0.0);
        assert_eq!(registry.get_all_agent_statuses().await.len(), 1);
    }

    #[tokio::test]
    async fn seeded_registries_derive_identical_wallets() {
        let first = AgentRegistry::with_seed(registry().context().clone(), 11);
        let second = AgentRegistry::with_seed(registry().context().clone(), 11);

        let a = first
            .create_agent("agent-001", "A", BehaviorKind::Idle)
            .await
            .unwrap();
        let b = second
            .create_agent("agent-001", "B", BehaviorKind::Idle)
            .await
            .unwrap();
        assert_eq!(a.public_key(), b.public_key());
    }
}

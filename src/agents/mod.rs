//! Autonomous wallet agents
//!
//! Every agent owns one account identity and runs its own action loop. What
//! it does on each iteration depends on its behavior:
//!
//! - **Trader**: keeps a funding floor and pays random amounts to counterparties
//! - **RandomActor**: funding requests, balance checks and transfers at random
//! - **TokenManager**: creates a token mint, then mints to itself
//! - **Idle**: mostly watches, checks its balance every few iterations

mod agent;
mod behavior;
mod registry;

pub mod idle;
pub mod random_actor;
pub mod token_manager;
pub mod trader;

pub use agent::{AccountInfo, Agent, AgentContext, ERROR_COOLDOWN, NATIVE_SYMBOL};
pub use behavior::Behavior;
pub use idle::IdleBehavior;
pub use random_actor::{RandomAction, RandomActorBehavior};
pub use registry::{AgentRegistry, AgentStatus};
pub use token_manager::TokenManagerBehavior;
pub use trader::TraderBehavior;

use crate::ledger::TransactionResult;
use crate::Error;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorKind {
    Trader,
    RandomActor,
    TokenManager,
    Idle,
}

impl BehaviorKind {
    pub const ALL: [BehaviorKind; 4] = [
        BehaviorKind::Trader,
        BehaviorKind::RandomActor,
        BehaviorKind::TokenManager,
        BehaviorKind::Idle,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BehaviorKind::Trader => "trader",
            BehaviorKind::RandomActor => "random_actor",
            BehaviorKind::TokenManager => "token_manager",
            BehaviorKind::Idle => "idle",
        }
    }
}

impl fmt::Display for BehaviorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BehaviorKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "trader" => Ok(BehaviorKind::Trader),
            "random_actor" | "randomactor" => Ok(BehaviorKind::RandomActor),
            "token_manager" | "tokenmanager" => Ok(BehaviorKind::TokenManager),
            "idle" => Ok(BehaviorKind::Idle),
            _ => Err(Error::UnknownBehavior(s.to_string())),
        }
    }
}

/// What an agent did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    CreateWallet,
    RequestFunding,
    SendFunds,
    TransferToken,
    MintToken,
    QueryBalance,
    InteractProgram,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::CreateWallet => "create_wallet",
            ActionKind::RequestFunding => "request_funding",
            ActionKind::SendFunds => "send_funds",
            ActionKind::TransferToken => "transfer_token",
            ActionKind::MintToken => "mint_token",
            ActionKind::QueryBalance => "query_balance",
            ActionKind::InteractProgram => "interact_program",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity and lifecycle flag of one agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub id: String,
    pub name: String,
    pub behavior: BehaviorKind,
    /// Key storage reference, always `wallet-<id>`
    pub wallet_id: String,
    /// True while the action loop is scheduled
    pub is_active: bool,
}

impl AgentConfig {
    pub fn new(id: impl Into<String>, name: impl Into<String>, behavior: BehaviorKind) -> Self {
        let id = id.into();
        Self {
            wallet_id: format!("wallet-{}", id),
            id,
            name: name.into(),
            behavior,
            is_active: false,
        }
    }
}

/// Entry in an agent's action history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentAction {
    pub kind: ActionKind,
    pub timestamp: DateTime<Utc>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<TransactionResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn behavior_kind_parses_common_spellings() {
        assert_eq!("trader".parse::<BehaviorKind>().unwrap(), BehaviorKind::Trader);
        assert_eq!(
            "Random-Actor".parse::<BehaviorKind>().unwrap(),
            BehaviorKind::RandomActor
        );
        assert_eq!(
            "token_manager".parse::<BehaviorKind>().unwrap(),
            BehaviorKind::TokenManager
        );
        for kind in BehaviorKind::ALL {
            assert_eq!(kind.as_str().parse::<BehaviorKind>().unwrap(), kind);
        }
    }

    #[test]
    fn unknown_behavior_is_rejected() {
        match "market_maker".parse::<BehaviorKind>() {
            Err(Error::UnknownBehavior(kind)) => assert_eq!(kind, "market_maker"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn wallet_id_follows_agent_id() {
        let config = AgentConfig::new("agent-001", "Trader Alpha", BehaviorKind::Trader);
        assert_eq!(config.wallet_id, "wallet-agent-001");
        assert!(!config.is_active);
    }

    #[test]
    fn action_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ActionKind::RequestFunding).unwrap();
        assert_eq!(json, "\"request_funding\"");
    }

    #[test]
    fn action_kinds_are_limited_to_recorded_actions() {
        assert!(serde_json::from_str::<ActionKind>("\"receive_funds\"").is_err());
        assert!(serde_json::from_str::<ActionKind>("\"sign_transaction\"").is_err());
        let kind: ActionKind = serde_json::from_str("\"interact_program\"").unwrap();
        assert_eq!(kind.as_str(), "interact_program");
    }
}

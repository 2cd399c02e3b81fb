//! Initial dashboard state

use super::catalog::{self, balance_history, random_address, random_signature};
use super::{DashboardAgent, RunState};
use crate::agents::BehaviorKind;
use crate::events::{LogEntry, TransactionRecord, TxStatus};
use chrono::{Duration, Utc};
use rand::Rng;

pub const SEED_TRANSACTION_COUNT: usize = 20;
pub const SEED_LOG_COUNT: usize = 30;
/// Id number given to the first spawned agent
pub const FIRST_SPAWNED_AGENT: u32 = 5;

struct Preset {
    id: &'static str,
    name: &'static str,
    behavior: BehaviorKind,
    state: RunState,
    balance: f64,
    tx_count: u64,
    success_rate: u8,
    last_action: &'static str,
    seconds_ago: i64,
}

const PRESETS: [Preset; 4] = [
    Preset {
        id: "agent-001",
        name: "Trader Alpha",
        behavior: BehaviorKind::Trader,
        state: RunState::Running,
        balance: 2.4819,
        tx_count: 142,
        success_rate: 94,
        last_action: "Sent 0.05 SOL to agent-002",
        seconds_ago: 12,
    },
    Preset {
        id: "agent-002",
        name: "Random Rex",
        behavior: BehaviorKind::RandomActor,
        state: RunState::Running,
        balance: 1.1034,
        tx_count: 87,
        success_rate: 78,
        last_action: "Random transfer 0.02 SOL",
        seconds_ago: 5,
    },
    Preset {
        id: "agent-003",
        name: "Token Queen",
        behavior: BehaviorKind::TokenManager,
        state: RunState::Running,
        balance: 0.8821,
        tx_count: 63,
        success_rate: 98,
        last_action: "Minted 1000 AGW tokens",
        seconds_ago: 28,
    },
    Preset {
        id: "agent-004",
        name: "Idle Watcher",
        behavior: BehaviorKind::Idle,
        state: RunState::Idle,
        balance: 3.0,
        tx_count: 7,
        success_rate: 100,
        last_action: "Balance check",
        seconds_ago: 60,
    },
];

/// Name and behavior of agents spawned from the dashboard
const SPAWN_TEMPLATES: [(&str, BehaviorKind); 4] = [
    ("Phantom Trader", BehaviorKind::Trader),
    ("Chaos Bot", BehaviorKind::RandomActor),
    ("Mint Master", BehaviorKind::TokenManager),
    ("Sentinel", BehaviorKind::Idle),
];

/// The four demo agents: three running, one idle
pub fn seed_agents<R: Rng + ?Sized>(rng: &mut R) -> Vec<DashboardAgent> {
    let now = Utc::now();
    PRESETS
        .iter()
        .map(|preset| DashboardAgent {
            id: preset.id.to_string(),
            name: preset.name.to_string(),
            behavior: preset.behavior,
            state: preset.state,
            address: random_address(rng),
            balance: preset.balance,
            balance_history: balance_history(rng),
            tx_count: preset.tx_count,
            success_rate: preset.success_rate,
            last_action: preset.last_action.to_string(),
            last_action_time: now - Duration::seconds(preset.seconds_ago),
        })
        .collect()
}

/// Status of a simulated transaction; `success_probability` of success,
/// otherwise error or pending with equal odds
pub fn random_status<R: Rng + ?Sized>(rng: &mut R, success_probability: f64) -> TxStatus {
    if rng.gen_bool(success_probability) {
        TxStatus::Success
    } else if rng.gen_bool(0.5) {
        TxStatus::Error
    } else {
        TxStatus::Pending
    }
}

/// Past transactions spread over the last few minutes, newest-first
pub fn seed_transactions<R: Rng + ?Sized>(agents: &[DashboardAgent], rng: &mut R) -> Vec<TransactionRecord> {
    if agents.is_empty() {
        return Vec::new();
    }

    let now = Utc::now();
    let mut records: Vec<TransactionRecord> = (0..SEED_TRANSACTION_COUNT)
        .map(|i| {
            let agent = &agents[rng.gen_range(0..agents.len())];
            let kind = catalog::random_kind(rng);
            let age_ms = i as i64 * 7_500 + rng.gen_range(0..5_000);
            TransactionRecord {
                id: format!("tx-{}", i),
                agent_id: agent.id.clone(),
                agent_name: agent.name.clone(),
                kind,
                description: catalog::describe(kind, rng),
                status: random_status(rng, 0.88),
                amount: None,
                signature: random_signature(rng),
                timestamp: now - Duration::milliseconds(age_ms),
            }
        })
        .collect();
    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    records
}

/// Past log entries from the catalog, newest-first
pub fn seed_logs<R: Rng + ?Sized>(agents: &[DashboardAgent], rng: &mut R) -> Vec<LogEntry> {
    if agents.is_empty() {
        return Vec::new();
    }

    let now = Utc::now();
    let mut logs: Vec<LogEntry> = (0..SEED_LOG_COUNT)
        .map(|i| {
            let agent = &agents[rng.gen_range(0..agents.len())];
            let (message, level) = catalog::random_log_message(rng);
            let age_ms = i as i64 * 4_500 + rng.gen_range(0..3_000);
            LogEntry {
                id: format!("log-{}", i),
                timestamp: now - Duration::milliseconds(age_ms),
                level,
                agent_id: Some(agent.id.clone()),
                agent_name: Some(agent.name.clone()),
                message,
                data: None,
            }
        })
        .collect();
    logs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    logs
}

/// Fresh idle agent with a random template; `number` becomes `agent-NNN`
pub fn generate_new_agent<R: Rng + ?Sized>(number: u32, rng: &mut R) -> DashboardAgent {
    let (name, behavior) = SPAWN_TEMPLATES[rng.gen_range(0..SPAWN_TEMPLATES.len())];
    DashboardAgent {
        id: format!("agent-{:03}", number),
        name: name.to_string(),
        behavior,
        state: RunState::Idle,
        address: random_address(rng),
        balance: catalog::round4(rng.gen::<f64>() * 2.0 + 0.5),
        balance_history: balance_history(rng),
        tx_count: 0,
        success_rate: 100,
        last_action: "Initialized".to_string(),
        last_action_time: Utc::now(),
    }
}

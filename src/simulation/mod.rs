//! Dashboard simulation
//!
//! A UI-side stand-in for the live system: agent snapshots drift in small
//! random steps and the transaction and log feeds receive synthetic entries.
//! [`simulate_tick`] is a pure function of the previous state and the RNG;
//! [`Simulator`] owns the state and a seeded RNG and applies ticks in place.

mod catalog;
mod seed;

pub use catalog::{random_address, random_signature, BALANCE_HISTORY_LEN};
pub use seed::{
    generate_new_agent, random_status, seed_agents, seed_logs, seed_transactions,
    FIRST_SPAWNED_AGENT,
};

use crate::agents::BehaviorKind;
use crate::events::{
    BoundedFeed, LogEntry, TransactionRecord, LOG_FEED_CAPACITY, TRANSACTION_FEED_CAPACITY,
};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-tick balance step is `(u - BALANCE_DRIFT_CENTER) * BALANCE_DRIFT_SCALE`
const BALANCE_DRIFT_CENTER: f64 = 0.48;
const BALANCE_DRIFT_SCALE: f64 = 0.08;
/// Lowest balance a simulated agent can drift to
pub const MIN_SIMULATED_BALANCE: f64 = 0.001;
/// Chance a tick produces a transaction and a log entry
pub const ACTIVITY_PROBABILITY: f64 = 0.7;
/// Chance a synthesized transaction succeeds
pub const TICK_SUCCESS_PROBABILITY: f64 = 0.87;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Running,
    Idle,
    Stopped,
}

/// Agent as shown on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardAgent {
    pub id: String,
    pub name: String,
    pub behavior: BehaviorKind,
    pub state: RunState,
    pub address: String,
    pub balance: f64,
    /// Most recent balances, oldest first
    pub balance_history: Vec<f64>,
    pub tx_count: u64,
    /// Percentage of successful transactions
    pub success_rate: u8,
    pub last_action: String,
    pub last_action_time: DateTime<Utc>,
}

/// Everything the dashboard renders
#[derive(Debug, Clone, Serialize)]
pub struct SimulationState {
    pub agents: Vec<DashboardAgent>,
    /// Newest-first
    pub transactions: BoundedFeed<TransactionRecord>,
    /// Newest-first
    pub logs: BoundedFeed<LogEntry>,
}

impl SimulationState {
    /// Demo agents plus seeded feeds
    pub fn seeded<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let agents = seed_agents(rng);
        let transactions = seed_transactions(&agents, rng);
        let logs = seed_logs(&agents, rng);
        Self {
            transactions: BoundedFeed::from_newest_first(transactions, TRANSACTION_FEED_CAPACITY),
            logs: BoundedFeed::from_newest_first(logs, LOG_FEED_CAPACITY),
            agents,
        }
    }

    pub fn empty() -> Self {
        Self {
            agents: Vec::new(),
            transactions: BoundedFeed::new(TRANSACTION_FEED_CAPACITY),
            logs: BoundedFeed::new(LOG_FEED_CAPACITY),
        }
    }
}

fn drift<R: Rng + ?Sized>(agent: &DashboardAgent, now: DateTime<Utc>, rng: &mut R) -> DashboardAgent {
    let delta = (rng.gen::<f64>() - BALANCE_DRIFT_CENTER) * BALANCE_DRIFT_SCALE;
    let balance = catalog::round4(agent.balance + delta).max(MIN_SIMULATED_BALANCE);

    let keep = agent.balance_history.len().min(BALANCE_HISTORY_LEN - 1);
    let mut balance_history = agent.balance_history[agent.balance_history.len() - keep..].to_vec();
    balance_history.push(balance);

    let tx_count = agent.tx_count + u64::from(rng.gen_bool(0.5));
    let last_action = catalog::describe(catalog::random_kind(rng), rng);

    DashboardAgent {
        balance,
        balance_history,
        tx_count,
        last_action,
        last_action_time: now,
        ..agent.clone()
    }
}

/// Next dashboard state
///
/// Running agents drift; with [`ACTIVITY_PROBABILITY`] one running agent
/// contributes a transaction and a log entry, prepended to the feeds.
/// Agents that are not running are returned unchanged.
pub fn simulate_tick<R: Rng + ?Sized>(state: &SimulationState, rng: &mut R) -> SimulationState {
    let now = Utc::now();
    let agents: Vec<DashboardAgent> = state
        .agents
        .iter()
        .map(|agent| {
            if agent.state == RunState::Running {
                drift(agent, now, rng)
            } else {
                agent.clone()
            }
        })
        .collect();

    let mut transactions = state.transactions.clone();
    let mut logs = state.logs.clone();

    let running: Vec<&DashboardAgent> = agents
        .iter()
        .filter(|a| a.state == RunState::Running)
        .collect();
    if !running.is_empty() && rng.gen_bool(ACTIVITY_PROBABILITY) {
        let agent = running[rng.gen_range(0..running.len())];
        let kind = catalog::random_kind(rng);
        transactions.push(TransactionRecord {
            id: format!("tx-{}", Uuid::new_v4()),
            agent_id: agent.id.clone(),
            agent_name: agent.name.clone(),
            kind,
            description: catalog::describe(kind, rng),
            status: random_status(rng, TICK_SUCCESS_PROBABILITY),
            amount: None,
            signature: random_signature(rng),
            timestamp: now,
        });

        let (message, level) = catalog::random_log_message(rng);
        logs.push(LogEntry {
            id: format!("log-{}", Uuid::new_v4()),
            timestamp: now,
            level,
            agent_id: Some(agent.id.clone()),
            agent_name: Some(agent.name.clone()),
            message,
            data: None,
        });
    }

    SimulationState {
        agents,
        transactions,
        logs,
    }
}

/// Owns a dashboard state and the RNG driving it
pub struct Simulator {
    state: SimulationState,
    rng: StdRng,
    next_agent: u32,
}

impl Simulator {
    /// Seeded demo state; `seed` makes every tick reproducible
    pub fn new(seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            state: SimulationState::seeded(&mut rng),
            rng,
            next_agent: FIRST_SPAWNED_AGENT,
        }
    }

    pub fn from_state(state: SimulationState, seed: u64) -> Self {
        Self {
            state,
            rng: StdRng::seed_from_u64(seed),
            next_agent: FIRST_SPAWNED_AGENT,
        }
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn tick(&mut self) -> &SimulationState {
        self.state = simulate_tick(&self.state, &mut self.rng);
        &self.state
    }

    /// Add an idle agent from a random template
    pub fn spawn_agent(&mut self) -> DashboardAgent {
        let agent = generate_new_agent(self.next_agent, &mut self.rng);
        self.next_agent += 1;
        self.state.agents.push(agent.clone());
        agent
    }

    pub fn set_state(&mut self, agent_id: &str, state: RunState) -> Result<()> {
        let agent = self
            .state
            .agents
            .iter_mut()
            .find(|a| a.id == agent_id)
            .ok_or_else(|| Error::NotFound(agent_id.to_string()))?;
        agent.state = state;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::TxStatus;

    fn running_agent(balance: f64) -> DashboardAgent {
        DashboardAgent {
            id: "agent-001".to_string(),
            name: "Trader Alpha".to_string(),
            behavior: BehaviorKind::Trader,
            state: RunState::Running,
            address: "addr".to_string(),
            balance,
            balance_history: vec![balance; BALANCE_HISTORY_LEN],
            tx_count: 0,
            success_rate: 100,
            last_action: "Initialized".to_string(),
            last_action_time: Utc::now(),
        }
    }

    fn state_with(agents: Vec<DashboardAgent>) -> SimulationState {
        SimulationState {
            agents,
            ..SimulationState::empty()
        }
    }

    #[test]
    fn balance_stays_floored_rounded_and_bounded() {
        let mut rng = StdRng::seed_from_u64(17);
        let mut state = state_with(vec![running_agent(0.002)]);

        for _ in 0..1_000 {
            let before = state.agents[0].balance;
            state = simulate_tick(&state, &mut rng);
            let agent = &state.agents[0];

            assert!(agent.balance >= MIN_SIMULATED_BALANCE);
            assert_eq!(catalog::round4(agent.balance), agent.balance);
            assert!((agent.balance - before).abs() <= 0.0421);
            assert_eq!(agent.balance_history.len(), BALANCE_HISTORY_LEN);
            assert_eq!(agent.balance_history.last(), Some(&agent.balance));
        }
    }

    #[test]
    fn short_history_grows_to_the_cap() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut agent = running_agent(1.0);
        agent.balance_history.clear();
        let mut state = state_with(vec![agent]);

        state = simulate_tick(&state, &mut rng);
        assert_eq!(state.agents[0].balance_history.len(), 1);
        for _ in 0..30 {
            state = simulate_tick(&state, &mut rng);
        }
        assert_eq!(state.agents[0].balance_history.len(), BALANCE_HISTORY_LEN);
    }

    #[test]
    fn non_running_agents_are_untouched() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut idle = running_agent(1.5);
        idle.state = RunState::Idle;
        let mut stopped = running_agent(0.7);
        stopped.state = RunState::Stopped;
        let state = state_with(vec![idle.clone(), stopped.clone()]);

        for _ in 0..50 {
            let next = simulate_tick(&state, &mut rng);
            assert_eq!(next.agents, vec![idle.clone(), stopped.clone()]);
            assert!(next.transactions.is_empty());
            assert!(next.logs.is_empty());
        }
    }

    #[test]
    fn activity_and_success_rates_match_their_probabilities() {
        let mut rng = StdRng::seed_from_u64(23);
        let state = state_with(vec![running_agent(1.0), running_agent(2.0)]);

        let ticks = 10_000;
        let mut produced = 0;
        let mut successes = 0;
        let mut tx_increments = 0;
        for _ in 0..ticks {
            let next = simulate_tick(&state, &mut rng);
            tx_increments += next.agents[0].tx_count;
            if let Some(tx) = next.transactions.latest() {
                produced += 1;
                assert_eq!(next.logs.len(), 1);
                if tx.status == TxStatus::Success {
                    successes += 1;
                }
            }
        }

        let activity = produced as f64 / ticks as f64;
        assert!((0.67..0.73).contains(&activity), "activity {}", activity);
        let success = successes as f64 / produced as f64;
        assert!((0.84..0.90).contains(&success), "success {}", success);
        let increments = tx_increments as f64 / ticks as f64;
        assert!((0.47..0.53).contains(&increments), "increments {}", increments);
    }

    #[test]
    fn feeds_are_prepended_and_capped() {
        let mut simulator = Simulator::from_state(state_with(vec![running_agent(1.0)]), 5);
        let mut previous_latest = None;
        for _ in 0..500 {
            let state = simulator.tick();
            let latest = state.transactions.latest().map(|t| t.id.clone());
            if latest != previous_latest {
                assert_eq!(state.transactions.latest().unwrap().timestamp, state.logs.latest().unwrap().timestamp);
            }
            previous_latest = latest;
        }

        let state = simulator.state();
        assert_eq!(state.transactions.len(), TRANSACTION_FEED_CAPACITY);
        assert_eq!(state.logs.len(), LOG_FEED_CAPACITY);
    }

    #[test]
    fn simulator_spawns_numbered_agents_and_controls_state() {
        let mut simulator = Simulator::new(Some(1));
        assert_eq!(simulator.state().agents.len(), 4);
        assert_eq!(simulator.state().transactions.len(), 20);
        assert_eq!(simulator.state().logs.len(), 30);

        let first = simulator.spawn_agent();
        let second = simulator.spawn_agent();
        assert_eq!(first.id, "agent-005");
        assert_eq!(second.id, "agent-006");
        assert_eq!(simulator.state().agents.len(), 6);

        simulator.set_state("agent-005", RunState::Running).unwrap();
        assert_eq!(simulator.state().agents[4].state, RunState::Running);
        assert!(matches!(
            simulator.set_state("agent-999", RunState::Stopped),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn seeded_simulators_agree() {
        let mut a = Simulator::new(Some(77));
        let mut b = Simulator::new(Some(77));
        for _ in 0..20 {
            a.tick();
            b.tick();
        }
        let balances =
            |s: &Simulator| s.state().agents.iter().map(|agent| agent.balance).collect::<Vec<_>>();
        assert_eq!(balances(&a), balances(&b));
    }
}

//! Random actor agent
//!
//! Picks one of three actions uniformly on every iteration and waits a
//! jittered interval in between.

use super::Agent;
use crate::wallet::Keypair;
use crate::Result;
use rand::rngs::StdRng;
use rand::Rng;
use std::time::Duration;

/// Chance a chosen funding action actually requests funds
pub const FUNDING_PROBABILITY: f64 = 0.3;
/// Upper bound of the extra delay added to the base interval
pub const MAX_JITTER_MS: u64 = 5_000;
/// Largest share of the balance a single transfer may move
pub const MAX_BALANCE_SHARE: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RandomAction {
    RequestFunding,
    QueryBalance,
    Transfer,
}

#[derive(Debug, Clone, Default)]
pub struct RandomActorBehavior;

impl RandomActorBehavior {
    /// Uniform pick among the three actions
    pub fn choose_action(rng: &mut StdRng) -> RandomAction {
        match rng.gen_range(0..3) {
            0 => RandomAction::RequestFunding,
            1 => RandomAction::QueryBalance,
            _ => RandomAction::Transfer,
        }
    }

    pub fn action_interval(base: Duration, rng: &mut StdRng) -> Duration {
        base + Duration::from_millis(rng.gen_range(0..MAX_JITTER_MS))
    }

    pub(crate) async fn perform(&mut self, agent: &Agent, rng: &mut StdRng) -> Result<()> {
        match Self::choose_action(rng) {
            RandomAction::RequestFunding => {
                if rng.gen_bool(FUNDING_PROBABILITY) {
                    agent.request_funding(agent.settings().funding_amount).await?;
                }
            }
            RandomAction::QueryBalance => {
                agent.query_balance().await?;
            }
            RandomAction::Transfer => self.random_transfer(agent, rng).await?,
        }
        Ok(())
    }

    async fn random_transfer(&self, agent: &Agent, rng: &mut StdRng) -> Result<()> {
        let balance = agent.balance().await?;
        let settings = agent.settings();
        if balance < settings.min_transfer_amount * 2.0 {
            agent.logger().info("Insufficient balance for transfer");
            return Ok(());
        }

        let destination = Keypair::generate_with(&mut *rng).public_key().clone();
        let amount = (rng.gen::<f64>() * settings.max_transfer_amount).min(balance * MAX_BALANCE_SHARE);
        agent.transfer_funds(&destination, amount).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn actions_are_roughly_uniform() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut counts = [0usize; 3];
        for _ in 0..3_000 {
            let index = match RandomActorBehavior::choose_action(&mut rng) {
                RandomAction::RequestFunding => 0,
                RandomAction::QueryBalance => 1,
                RandomAction::Transfer => 2,
            };
            counts[index] += 1;
        }
        for count in counts {
            assert!((800..1_200).contains(&count), "skewed counts {:?}", counts);
        }
    }

    #[test]
    fn interval_jitter_stays_in_window() {
        let mut rng = StdRng::seed_from_u64(3);
        let base = Duration::from_millis(10_000);
        for _ in 0..500 {
            let interval = RandomActorBehavior::action_interval(base, &mut rng);
            assert!(interval >= base);
            assert!(interval < base + Duration::from_millis(MAX_JITTER_MS));
        }
    }
}

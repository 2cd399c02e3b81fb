//! Trader agent
//!
//! Keeps its balance above a funding floor and pays random amounts within
//! the configured transfer bounds to one of its counterparties.

use super::Agent;
use crate::ledger::AccountId;
use crate::Result;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

/// Balance below which a trader asks for funding instead of trading
pub const TRADER_MIN_BALANCE: f64 = 0.1;

#[derive(Debug, Clone)]
pub struct TraderBehavior {
    min_balance: f64,
    counterparties: Vec<AccountId>,
}

impl Default for TraderBehavior {
    fn default() -> Self {
        Self {
            min_balance: TRADER_MIN_BALANCE,
            counterparties: Vec::new(),
        }
    }
}

impl TraderBehavior {
    pub fn counterparties(&self) -> &[AccountId] {
        &self.counterparties
    }

    pub fn set_counterparties(&mut self, counterparties: Vec<AccountId>) {
        self.counterparties = counterparties;
    }

    pub(crate) async fn perform(&mut self, agent: &Agent, rng: &mut StdRng) -> Result<()> {
        let balance = agent.balance().await?;
        let settings = agent.settings();

        if balance < self.min_balance {
            agent.logger().info("Balance low, requesting funding");
            agent.request_funding(settings.funding_amount).await?;
            return Ok(());
        }

        let Some(target) = self.counterparties.choose(&mut *rng).cloned() else {
            agent.logger().info("No counterparties configured, waiting...");
            return Ok(());
        };

        let (min, max) = (settings.min_transfer_amount, settings.max_transfer_amount);
        let amount = if max > min { rng.gen_range(min..=max) } else { min };
        agent.transfer_funds(&target, amount).await?;
        Ok(())
    }
}

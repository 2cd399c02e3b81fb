//! Idle agent: watches its wallet and only acts when the balance is critical

use super::{ActionKind, Agent, NATIVE_SYMBOL};
use crate::Result;

/// Iterations between two balance checks
pub const CHECK_EVERY: u64 = 5;
/// Balance below which the idle agent asks for funding
pub const CRITICAL_BALANCE: f64 = 0.01;

#[derive(Debug, Clone, Default)]
pub struct IdleBehavior {
    checks: u64,
}

impl IdleBehavior {
    pub fn checks(&self) -> u64 {
        self.checks
    }

    pub(crate) async fn perform(&mut self, agent: &Agent) -> Result<()> {
        self.checks += 1;
        if self.checks % CHECK_EVERY != 0 {
            agent.logger().info("Idle - monitoring wallet");
            return Ok(());
        }

        let balance = agent.balance().await?;
        agent.record_action(
            ActionKind::QueryBalance,
            format!("Periodic balance check: {:.4} {}", balance, NATIVE_SYMBOL),
            None,
        );

        if balance < CRITICAL_BALANCE {
            agent
                .logger()
                .info("Balance critically low, requesting funding");
            agent.request_funding(agent.settings().funding_amount).await?;
        }
        Ok(())
    }
}

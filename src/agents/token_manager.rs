//! Token manager agent
//!
//! Creates a token mint once its account is funded, then mints random
//! amounts to itself on about half of its iterations.

use super::Agent;
use crate::ledger::MintId;
use crate::Result;
use rand::rngs::StdRng;
use rand::Rng;
use std::ops::RangeInclusive;

/// Balance below which token operations wait for funding
pub const TOKEN_MANAGER_MIN_BALANCE: f64 = 0.1;
/// Decimals of the mint the agent creates
pub const TOKEN_DECIMALS: u8 = 9;
/// Raw units minted per mint action
pub const MINT_AMOUNT_RANGE: RangeInclusive<u64> = 1_000..=1_000_000;

#[derive(Debug, Clone)]
pub struct TokenManagerBehavior {
    min_balance: f64,
    mint: Option<MintId>,
}

impl Default for TokenManagerBehavior {
    fn default() -> Self {
        Self {
            min_balance: TOKEN_MANAGER_MIN_BALANCE,
            mint: None,
        }
    }
}

impl TokenManagerBehavior {
    pub fn mint(&self) -> Option<&MintId> {
        self.mint.as_ref()
    }

    pub(crate) async fn perform(&mut self, agent: &Agent, rng: &mut StdRng) -> Result<()> {
        let balance = agent.balance().await?;
        if balance < self.min_balance {
            agent
                .logger()
                .info("Balance low, requesting funding for token operations");
            agent.request_funding(agent.settings().funding_amount).await?;
            return Ok(());
        }

        match self.mint.clone() {
            None => {
                agent.logger().info("Creating new token mint");
                match agent.create_token_mint(TOKEN_DECIMALS).await {
                    Ok(mint) => self.mint = Some(mint),
                    Err(e) => agent
                        .logger()
                        .error(format!("Failed to create token: {}", e)),
                }
            }
            Some(mint) => {
                if rng.gen_bool(0.5) {
                    let amount = rng.gen_range(MINT_AMOUNT_RANGE);
                    agent.mint_tokens(&mint, amount).await?;
                }
            }
        }
        Ok(())
    }
}

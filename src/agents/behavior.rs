//! Dispatch over the behavior variants

use super::idle::IdleBehavior;
use super::random_actor::RandomActorBehavior;
use super::token_manager::TokenManagerBehavior;
use super::trader::TraderBehavior;
use super::{Agent, BehaviorKind};
use crate::config::AgentSettings;
use crate::Result;
use rand::rngs::StdRng;
use std::time::Duration;

/// Decision policy of an agent, with whatever state it keeps between iterations
#[derive(Debug, Clone)]
pub enum Behavior {
    Trader(TraderBehavior),
    RandomActor(RandomActorBehavior),
    TokenManager(TokenManagerBehavior),
    Idle(IdleBehavior),
}

impl Behavior {
    /// Fresh behavior state for `kind`
    pub fn new(kind: BehaviorKind) -> Self {
        match kind {
            BehaviorKind::Trader => Behavior::Trader(TraderBehavior::default()),
            BehaviorKind::RandomActor => Behavior::RandomActor(RandomActorBehavior),
            BehaviorKind::TokenManager => Behavior::TokenManager(TokenManagerBehavior::default()),
            BehaviorKind::Idle => Behavior::Idle(IdleBehavior::default()),
        }
    }

    pub fn kind(&self) -> BehaviorKind {
        match self {
            Behavior::Trader(_) => BehaviorKind::Trader,
            Behavior::RandomActor(_) => BehaviorKind::RandomActor,
            Behavior::TokenManager(_) => BehaviorKind::TokenManager,
            Behavior::Idle(_) => BehaviorKind::Idle,
        }
    }

    pub(crate) async fn perform(&mut self, agent: &Agent, rng: &mut StdRng) -> Result<()> {
        match self {
            Behavior::Trader(trader) => trader.perform(agent, rng).await,
            Behavior::RandomActor(actor) => actor.perform(agent, rng).await,
            Behavior::TokenManager(manager) => manager.perform(agent, rng).await,
            Behavior::Idle(idle) => idle.perform(agent).await,
        }
    }

    /// Delay before the next iteration
    pub fn action_interval(&self, settings: &AgentSettings, rng: &mut StdRng) -> Duration {
        let base = settings.action_interval();
        match self {
            Behavior::Trader(_) => base,
            Behavior::RandomActor(_) => RandomActorBehavior::action_interval(base, rng),
            Behavior::TokenManager(_) => base * 2,
            Behavior::Idle(_) => base * 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn new_matches_kind() {
        for kind in BehaviorKind::ALL {
            assert_eq!(Behavior::new(kind).kind(), kind);
        }
    }

    #[test]
    fn intervals_scale_with_the_base() {
        let settings = AgentSettings {
            action_interval_ms: 1_000,
            ..AgentSettings::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        let interval =
            |kind| Behavior::new(kind).action_interval(&settings, &mut StdRng::seed_from_u64(1));

        assert_eq!(interval(BehaviorKind::Trader), Duration::from_millis(1_000));
        assert_eq!(interval(BehaviorKind::TokenManager), Duration::from_millis(2_000));
        assert_eq!(interval(BehaviorKind::Idle), Duration::from_millis(3_000));

        for _ in 0..100 {
            let jittered = Behavior::new(BehaviorKind::RandomActor).action_interval(&settings, &mut rng);
            assert!(jittered >= Duration::from_millis(1_000));
            assert!(jittered < Duration::from_millis(6_000));
        }
    }
}

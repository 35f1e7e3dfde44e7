//! Match-intent acceptance policy.
//!
//! Whether a right-swipe turns into an offer is decided by a policy injected
//! into the offer engine, not by the engine itself. Production uses the
//! probabilistic policy (the simulated counterpart "likes back" most of the
//! time); tests inject a fixed one.

use rand::Rng;

use swapdeck_shared::Item;

/// Decides whether a match intent becomes an offer.
pub trait MatchPolicy: Send + Sync {
    fn should_match(&self, candidate: &Item) -> bool;
}

/// Accepts a match intent with a fixed probability.
#[derive(Debug, Clone)]
pub struct RandomPolicy {
    probability: f64,
}

impl RandomPolicy {
    /// `probability` is clamped to `0.0..=1.0`.
    pub fn new(probability: f64) -> Self {
        Self {
            probability: probability.clamp(0.0, 1.0),
        }
    }
}

impl Default for RandomPolicy {
    fn default() -> Self {
        Self::new(0.7)
    }
}

impl MatchPolicy for RandomPolicy {
    fn should_match(&self, _candidate: &Item) -> bool {
        rand::thread_rng().gen_bool(self.probability)
    }
}

/// Always (or never) matches. Test double.
#[derive(Debug, Clone, Copy)]
pub struct FixedPolicy(pub bool);

impl MatchPolicy for FixedPolicy {
    fn should_match(&self, _candidate: &Item) -> bool {
        self.0
    }
}

//! Exploration stage: scores → sampling distribution → sampled action.

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::data::MultiExample;
use crate::error::BanditError;
use crate::weights::WeightStore;

use super::cb_adf::CbAdf;
use super::{learn_stages, predict_stages, Prediction, Stage};

/// Rule converting per-action cost estimates into a sampling distribution.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ExplorationPolicy {
    /// Probability `1 - ε + ε/k` on the minimum-cost action, `ε/k`
    /// elsewhere.
    EpsilonGreedy {
        /// Exploration fraction in `[0, 1]`.
        epsilon: f32,
    },
    /// `p(a) ∝ exp(-λ · score(a))`: lower cost, higher probability.
    Softmax {
        /// Inverse temperature, `>= 0`. Zero is uniform.
        lambda: f32,
    },
}

impl Default for ExplorationPolicy {
    fn default() -> Self {
        ExplorationPolicy::EpsilonGreedy { epsilon: 0.05 }
    }
}

impl ExplorationPolicy {
    /// Turn cost estimates into a probability distribution over actions.
    ///
    /// The result has the same length as `scores` and sums to 1 within
    /// floating tolerance.
    pub fn distribution(&self, scores: &[f32]) -> Vec<f32> {
        let k = scores.len();
        debug_assert!(k > 0);
        match *self {
            ExplorationPolicy::EpsilonGreedy { epsilon } => {
                let mut probabilities = vec![epsilon / k as f32; k];
                probabilities[argmin(scores)] += 1.0 - epsilon;
                probabilities
            }
            ExplorationPolicy::Softmax { lambda } => {
                // Shift by the minimum so the largest exponent is 0.
                let min = scores.iter().copied().fold(f32::INFINITY, f32::min);
                let mut probabilities: Vec<f32> = scores
                    .iter()
                    .map(|&score| (-lambda * (score - min)).exp())
                    .collect();
                let total: f32 = probabilities.iter().sum();
                for probability in &mut probabilities {
                    *probability /= total;
                }
                probabilities
            }
        }
    }

    /// Validate configured parameters.
    pub(crate) fn validate(&self) -> Result<(), BanditError> {
        match *self {
            ExplorationPolicy::EpsilonGreedy { epsilon } => {
                if !(0.0..=1.0).contains(&epsilon) {
                    return Err(BanditError::InvalidConfig(format!(
                        "epsilon must be in [0, 1], got {epsilon}"
                    )));
                }
            }
            ExplorationPolicy::Softmax { lambda } => {
                if !lambda.is_finite() || lambda < 0.0 {
                    return Err(BanditError::InvalidConfig(format!(
                        "softmax lambda must be finite and >= 0, got {lambda}"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Converts the inner stage's scores into an action-probability
/// distribution and samples the chosen action.
///
/// Sampling goes through a seeded generator owned by the stage, so a
/// fixed call sequence is fully reproducible. The sampled action always
/// carries strictly positive probability, as required for valid
/// importance weighting downstream.
///
/// learn() forwards unchanged.
#[derive(Debug, Clone)]
pub struct CbExploreAdf {
    policy: ExplorationPolicy,
    rng: Xoshiro256PlusPlus,
}

impl CbExploreAdf {
    /// Create the stage with a seeded sampler.
    pub fn new(policy: ExplorationPolicy, seed: u64) -> Self {
        CbExploreAdf {
            policy,
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
        }
    }

    /// Produce the exploration distribution and sample from it.
    pub fn predict(
        &mut self,
        rest: &mut [Stage],
        base: &CbAdf,
        store: &WeightStore,
        decision: &MultiExample,
    ) -> Result<Prediction, BanditError> {
        let mut prediction = predict_stages(rest, base, store, decision)?;
        let probabilities = self.policy.distribution(&prediction.scores);
        let chosen = sample(&mut self.rng, &probabilities);
        prediction.probabilities = probabilities;
        prediction.chosen = chosen;
        debug_assert!(prediction.chosen_probability() > 0.0);
        Ok(prediction)
    }

    /// Forward to the inner stages unchanged.
    pub fn learn(
        &mut self,
        rest: &mut [Stage],
        base: &CbAdf,
        store: &mut WeightStore,
        decision: &MultiExample,
    ) -> Result<f32, BanditError> {
        learn_stages(rest, base, store, decision)
    }
}

/// Draw one action index from a distribution with a single uniform draw.
///
/// Walks the CDF; an action with zero probability can never be returned,
/// and float shortfall at the tail falls back to the last positive-mass
/// action.
fn sample<R: Rng>(rng: &mut R, probabilities: &[f32]) -> usize {
    let draw: f32 = rng.gen();
    let mut cumulative = 0.0f32;
    let mut last_positive = 0;
    for (action, &probability) in probabilities.iter().enumerate() {
        if probability > 0.0 {
            last_positive = action;
            cumulative += probability;
            if draw < cumulative {
                return action;
            }
        }
    }
    last_positive
}

fn argmin(scores: &[f32]) -> usize {
    let mut best = 0;
    for (index, &score) in scores.iter().enumerate().skip(1) {
        if score < scores[best] {
            best = index;
        }
    }
    best
}

//! Coin-betting per-weight updates.

use crate::weights::{WeightStore, STRIDE};

// Block slot layout. Slot 0 is the weight itself; the rest are the
// betting statistics the weight is derived from.
const W: usize = 0;
const THETA: usize = 1; // negative gradient sum
const ABS_G: usize = 2; // sum of |gradient|
const MAX_G: usize = 3; // running max |gradient| (scale estimate)
const REWARD: usize = 4; // accumulated reward
const SQ_G: usize = 5; // sum of gradient^2

/// Coin-betting optimizer configuration.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CoinConfig {
    /// Betting-fraction damping. Early steps are scaled down until the
    /// cumulative gradient mass exceeds `alpha ×` the gradient scale.
    pub alpha: f32,
}

impl Default for CoinConfig {
    fn default() -> Self {
        CoinConfig { alpha: 100.0 }
    }
}

/// Parameter-free coin-betting optimizer.
///
/// For each feature touched by an example the update reads the feature's
/// block, folds the new gradient into the betting statistics, and derives
/// the new weight from them:
///
/// ```text
/// g       = slope × x                          (per-feature gradient)
/// max_g   = max(max_g, |g|)
/// abs_g  += |g|
/// sq_g   += g²
/// theta  += -g
/// reward  = max(reward - g × w_old, 0)
/// w       = theta / (max_g × max(abs_g + max_g, alpha × max_g))
///                 × (max_g + reward)
/// ```
///
/// The example's scalar `slope` (loss derivative × importance) is computed
/// once from the pre-update prediction, so a feature's resulting weight is
/// invariant to the order in which the *other* features of the example are
/// processed, and each feature is updated exactly once per learn() call.
///
/// Overflow/NaN is not locally recovered; it surfaces in subsequent
/// predictions.
#[derive(Debug, Clone, Copy)]
pub struct CoinBetting {
    config: CoinConfig,
}

impl CoinBetting {
    /// Create an optimizer from its configuration.
    pub fn new(config: CoinConfig) -> Self {
        CoinBetting { config }
    }

    /// Slots per weight block this optimizer requires.
    #[inline]
    pub fn stride(&self) -> usize {
        STRIDE
    }

    /// Dot product of the stored weights with a hashed feature vector.
    pub fn raw_prediction(&self, store: &WeightStore, features: &[(u32, f32)]) -> f32 {
        features
            .iter()
            .map(|&(index, value)| store.weight(index) * value)
            .sum()
    }

    /// Apply one gradient step for every feature of an example.
    ///
    /// `slope` is the example's loss derivative with respect to the raw
    /// prediction, already scaled by the importance weight.
    pub fn update(&self, store: &mut WeightStore, features: &[(u32, f32)], slope: f32) {
        for &(index, value) in features {
            let block = store.get_or_create(index);
            Self::update_block(block, slope * value, self.config.alpha);
        }
    }

    fn update_block(block: &mut [f32], gradient: f32, alpha: f32) {
        debug_assert_eq!(block.len(), STRIDE);
        if gradient == 0.0 && block[MAX_G] == 0.0 {
            return;
        }
        let old_weight = block[W];
        block[MAX_G] = block[MAX_G].max(gradient.abs());
        block[ABS_G] += gradient.abs();
        block[SQ_G] += gradient * gradient;
        block[THETA] -= gradient;
        block[REWARD] = (block[REWARD] - gradient * old_weight).max(0.0);

        let scale = block[MAX_G] * (block[ABS_G] + block[MAX_G]).max(alpha * block[MAX_G]);
        if scale > 0.0 {
            block[W] = block[THETA] / scale * (block[MAX_G] + block[REWARD]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn optimizer() -> CoinBetting {
        CoinBetting::new(CoinConfig::default())
    }

    #[test]
    fn zero_gradient_is_a_no_op() {
        let mut store = WeightStore::new(STRIDE);
        optimizer().update(&mut store, &[(3, 1.0)], 0.0);
        assert!(store.nonzero_rows().is_empty());
    }

    #[test]
    fn update_moves_weight_against_gradient() {
        let mut store = WeightStore::new(STRIDE);
        // Positive slope (prediction too high) must push the weight down.
        optimizer().update(&mut store, &[(3, 1.0)], 0.5);
        assert!(store.weight(3) < 0.0);

        let mut store = WeightStore::new(STRIDE);
        optimizer().update(&mut store, &[(3, 1.0)], -0.5);
        assert!(store.weight(3) > 0.0);
    }

    #[test]
    fn update_is_deterministic() {
        let run = || {
            let mut store = WeightStore::new(STRIDE);
            for step in 0..10 {
                let slope = if step % 2 == 0 { 0.3 } else { -0.2 };
                optimizer().update(&mut store, &[(1, 1.0), (2, 0.5)], slope);
            }
            store
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn feature_update_independent_of_sibling_order() {
        let mut forward = WeightStore::new(STRIDE);
        let mut backward = WeightStore::new(STRIDE);
        let features = [(10u32, 1.0f32), (20, 2.0), (30, -0.5)];
        let mut reversed = features;
        reversed.reverse();

        optimizer().update(&mut forward, &features, 0.7);
        optimizer().update(&mut backward, &reversed, 0.7);

        assert_eq!(forward, backward);
    }

    #[test]
    fn accumulators_track_gradient_stream() {
        let mut store = WeightStore::new(STRIDE);
        let opt = optimizer();
        opt.update(&mut store, &[(0, 1.0)], 0.25);
        opt.update(&mut store, &[(0, 1.0)], -0.75);

        let block = store.get(0).unwrap();
        assert_relative_eq!(block[ABS_G], 1.0);
        assert_relative_eq!(block[MAX_G], 0.75);
        assert_relative_eq!(block[THETA], 0.5);
        assert_relative_eq!(block[SQ_G], 0.625);
    }
}

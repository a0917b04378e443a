//! Action-mask filtering stage.

use crate::data::MultiExample;
use crate::error::BanditError;
use crate::weights::WeightStore;

use super::cb_adf::CbAdf;
use super::{learn_stages, predict_stages, Prediction, Stage};

/// Applies a decision's [`ActionMask`](crate::data::ActionMask) to the
/// predictions coming out of the inner stages.
///
/// Masked actions end up with probability exactly 0 and the remaining
/// distribution is renormalized to sum to 1; the chosen action is never a
/// masked index. A decision without a mask passes through untouched.
///
/// learn() forwards unchanged; whether a supplied label references a
/// masked action is out of scope.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionsMask;

impl ActionsMask {
    /// Create the stage.
    pub fn new() -> Self {
        ActionsMask
    }

    /// Filter the inner prediction through the decision's mask.
    pub fn predict(
        &self,
        rest: &mut [Stage],
        base: &CbAdf,
        store: &WeightStore,
        decision: &MultiExample,
    ) -> Result<Prediction, BanditError> {
        let mut prediction = predict_stages(rest, base, store, decision)?;

        let Some(mask) = &decision.mask else {
            return Ok(prediction);
        };
        if mask.is_empty() {
            return Ok(prediction);
        }
        mask.validate(decision.n_actions())?;

        let mut remaining = 0.0f32;
        for (action, probability) in prediction.probabilities.iter_mut().enumerate() {
            if mask.is_masked(action) {
                *probability = 0.0;
            } else {
                remaining += *probability;
            }
        }

        if remaining > 0.0 {
            for probability in &mut prediction.probabilities {
                *probability /= remaining;
            }
        } else {
            // The inner stages put all mass on masked actions (possible
            // with a fully greedy inner distribution). Fall back to
            // uniform over what the mask allows.
            let allowed = decision.n_actions() - mask.len();
            for (action, probability) in prediction.probabilities.iter_mut().enumerate() {
                if !mask.is_masked(action) {
                    *probability = 1.0 / allowed as f32;
                }
            }
        }

        if mask.is_masked(prediction.chosen) {
            prediction.chosen = argmax_unmasked(&prediction.probabilities);
        }
        Ok(prediction)
    }

    /// Forward to the inner stages unchanged.
    pub fn learn(
        &self,
        rest: &mut [Stage],
        base: &CbAdf,
        store: &mut WeightStore,
        decision: &MultiExample,
    ) -> Result<f32, BanditError> {
        learn_stages(rest, base, store, decision)
    }
}

/// Index of the maximum probability; zero-probability (masked) actions
/// can never win because some unmasked action holds positive mass.
fn argmax_unmasked(probabilities: &[f32]) -> usize {
    let mut best = 0;
    for (action, &probability) in probabilities.iter().enumerate().skip(1) {
        if probability > probabilities[best] {
            best = action;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ActionMask, Example, Namespace};
    use crate::hashing::FeatureHasher;
    use crate::learner::Interaction;
    use crate::training::{CoinBetting, CoinConfig};
    use crate::weights::STRIDE;

    fn base() -> CbAdf {
        CbAdf::new(
            FeatureHasher::new(18),
            vec![Interaction::Quadratic("User".into(), "Action".into())],
            CoinBetting::new(CoinConfig::default()),
            None,
        )
    }

    fn decision(mask: ActionMask) -> MultiExample {
        let mut decision = MultiExample::new()
            .with_shared(
                Example::new().with_namespace(Namespace::new("User").with_feature("user=Tom")),
            )
            .with_mask(mask);
        for article in ["sports", "politics", "music"] {
            decision = decision.with_action(Example::new().with_namespace(
                Namespace::new("Action").with_feature(format!("article={article}")),
            ));
        }
        decision
    }

    #[test]
    fn masked_actions_get_zero_probability() {
        let store = WeightStore::new(STRIDE);
        let decision = decision(ActionMask::new([0]));
        let prediction = ActionsMask::new()
            .predict(&mut [], &base(), &store, &decision)
            .unwrap();

        assert_eq!(prediction.probabilities[0], 0.0);
        let total: f32 = prediction.probabilities.iter().sum();
        approx::assert_relative_eq!(total, 1.0);
        assert_ne!(prediction.chosen, 0);
        assert!(prediction.chosen_probability() > 0.0);
    }

    #[test]
    fn no_mask_passes_through() {
        let store = WeightStore::new(STRIDE);
        let mut decision = decision(ActionMask::new([]));
        decision.mask = None;
        let prediction = ActionsMask::new()
            .predict(&mut [], &base(), &store, &decision)
            .unwrap();
        assert_eq!(prediction.probabilities, vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn out_of_range_mask_is_an_error() {
        let store = WeightStore::new(STRIDE);
        let decision = decision(ActionMask::new([7]));
        assert!(matches!(
            ActionsMask::new().predict(&mut [], &base(), &store, &decision),
            Err(BanditError::MaskOutOfRange { index: 7, n_actions: 3 })
        ));
    }

    #[test]
    fn fully_masked_decision_is_an_error() {
        let store = WeightStore::new(STRIDE);
        let decision = decision(ActionMask::new([0, 1, 2]));
        assert!(matches!(
            ActionsMask::new().predict(&mut [], &base(), &store, &decision),
            Err(BanditError::MaskAllActions { n_actions: 3 })
        ));
    }

    #[test]
    fn greedy_mass_on_masked_action_renormalizes_uniformly() {
        // The greedy base puts all mass on action 0; masking it leaves no
        // mass to renormalize, so the stage falls back to uniform.
        let store = WeightStore::new(STRIDE);
        let decision = decision(ActionMask::new([0]));
        let prediction = ActionsMask::new()
            .predict(&mut [], &base(), &store, &decision)
            .unwrap();
        approx::assert_relative_eq!(prediction.probabilities[1], 0.5);
        approx::assert_relative_eq!(prediction.probabilities[2], 0.5);
    }
}

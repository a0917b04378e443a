//! The composable learner chain.
//!
//! A learner is an ordered chain of stages over a base scorer. Stages are
//! tagged variants ([`Stage`]), not trait objects: the chain is interpreted
//! by recursive descent, each stage delegating to the stages after it and
//! transforming the prediction on the way back out.
//!
//! The canonical composition is:
//!
//! ```text
//! ActionsMask → CbExploreAdf → CbAdf (base)
//! ```
//!
//! Mutability encodes the mutation contract: `predict` takes the weight
//! store by shared reference and therefore cannot mutate it under any
//! mode; only `learn` takes `&mut WeightStore`.

mod actions_mask;
mod cb_adf;
mod cb_explore;
mod features;

pub use actions_mask::ActionsMask;
pub use cb_adf::CbAdf;
pub use cb_explore::{CbExploreAdf, ExplorationPolicy};
pub use features::Interaction;

pub(crate) use features::assemble_features;

use crate::data::MultiExample;
use crate::error::BanditError;
use crate::weights::WeightStore;

/// What a stage participates in.
///
/// A stage without the `learn` capability is passed over entirely on the
/// learn path; every stage in the canonical chain carries both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Stage participates in learn().
    pub learn: bool,
    /// Stage participates in predict().
    pub predict: bool,
}

/// One stage of the chain, as a tagged variant.
#[derive(Debug, Clone)]
pub enum Stage {
    /// Filters masked actions out of outgoing predictions.
    ActionsMask(ActionsMask),
    /// Converts scores into a sampling distribution and samples an action.
    Explore(CbExploreAdf),
}

impl Stage {
    /// The stage's capability set.
    pub fn capabilities(&self) -> Capabilities {
        match self {
            // The mask stage forwards learn() unchanged but still claims
            // the capability: it sits on the learn path.
            Stage::ActionsMask(_) => Capabilities { learn: true, predict: true },
            Stage::Explore(_) => Capabilities { learn: true, predict: true },
        }
    }
}

/// Per-decision prediction: ordered action scores, a probability
/// distribution over the actions, and the chosen action index.
///
/// Invariants maintained by the chain: `scores.len()` and
/// `probabilities.len()` equal the decision's action-row count, the
/// probabilities sum to 1 within floating tolerance, and
/// `probabilities[chosen] > 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Raw per-action scores (cost estimates; lower is better).
    pub scores: Vec<f32>,
    /// Sampling distribution over actions, in action-row order.
    pub probabilities: Vec<f32>,
    /// Sampled/chosen action index.
    pub chosen: usize,
}

impl Prediction {
    /// Probability attached to the chosen action.
    #[inline]
    pub fn chosen_probability(&self) -> f32 {
        self.probabilities[self.chosen]
    }
}

/// An ordered stage chain over a base scorer.
#[derive(Debug, Clone)]
pub struct LearnerStack {
    stages: Vec<Stage>,
    base: CbAdf,
}

impl LearnerStack {
    /// Compose a chain. `stages` run outer-to-inner over `base`.
    pub fn new(stages: Vec<Stage>, base: CbAdf) -> Self {
        LearnerStack { stages, base }
    }

    /// Score the decision and produce a prediction.
    ///
    /// Fails on a decision with zero action rows.
    pub fn predict(
        &mut self,
        store: &WeightStore,
        decision: &MultiExample,
    ) -> Result<Prediction, BanditError> {
        if decision.n_actions() == 0 {
            return Err(BanditError::EmptyDecision);
        }
        predict_stages(&mut self.stages, &self.base, store, decision)
    }

    /// Update the weight store from a labeled decision.
    ///
    /// Returns the progressive (pre-update) loss at the labeled action.
    pub fn learn(
        &mut self,
        store: &mut WeightStore,
        decision: &MultiExample,
    ) -> Result<f32, BanditError> {
        if decision.n_actions() == 0 {
            return Err(BanditError::EmptyDecision);
        }
        learn_stages(&mut self.stages, &self.base, store, decision)
    }

    /// The base scorer.
    pub fn base(&self) -> &CbAdf {
        &self.base
    }
}

/// Interpret the predict path of the chain suffix `stages` over `base`.
pub(crate) fn predict_stages(
    stages: &mut [Stage],
    base: &CbAdf,
    store: &WeightStore,
    decision: &MultiExample,
) -> Result<Prediction, BanditError> {
    match stages.split_first_mut() {
        None => base.predict(store, decision),
        Some((stage, rest)) => {
            if !stage.capabilities().predict {
                return predict_stages(rest, base, store, decision);
            }
            match stage {
                Stage::ActionsMask(mask) => mask.predict(rest, base, store, decision),
                Stage::Explore(explore) => explore.predict(rest, base, store, decision),
            }
        }
    }
}

/// Interpret the learn path of the chain suffix `stages` over `base`.
pub(crate) fn learn_stages(
    stages: &mut [Stage],
    base: &CbAdf,
    store: &mut WeightStore,
    decision: &MultiExample,
) -> Result<f32, BanditError> {
    match stages.split_first_mut() {
        None => base.learn(store, decision),
        Some((stage, rest)) => {
            if !stage.capabilities().learn {
                return learn_stages(rest, base, store, decision);
            }
            match stage {
                Stage::ActionsMask(mask) => mask.learn(rest, base, store, decision),
                Stage::Explore(explore) => explore.learn(rest, base, store, decision),
            }
        }
    }
}

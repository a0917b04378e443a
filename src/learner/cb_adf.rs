//! Base contextual-bandit scorer.

use crate::data::MultiExample;
use crate::error::BanditError;
use crate::hashing::{FeatureHasher, SubModel};
use crate::training::{CoinBetting, LossFn, SquaredLoss};
use crate::weights::WeightStore;

use super::features::{assemble_features, Interaction};
use super::Prediction;

/// Per-action cost regression over hashed features.
///
/// The bottom of the learner chain: scores every action candidate with a
/// linear model over the shared-context and action-row features (plus
/// configured interactions), and learns from the logged label by
/// regressing the observed cost on the chosen action's features with the
/// importance scaled by the inverse logged probability.
#[derive(Debug, Clone)]
pub struct CbAdf {
    hasher: FeatureHasher,
    interactions: Vec<Interaction>,
    optimizer: CoinBetting,
    sub_model: Option<SubModel>,
    loss: SquaredLoss,
}

impl CbAdf {
    /// Create a base scorer.
    ///
    /// `sub_model` selects interleaved addressing when this scorer trains
    /// one half of a joint weight table.
    pub fn new(
        hasher: FeatureHasher,
        interactions: Vec<Interaction>,
        optimizer: CoinBetting,
        sub_model: Option<SubModel>,
    ) -> Self {
        CbAdf {
            hasher,
            interactions,
            optimizer,
            sub_model,
            loss: SquaredLoss,
        }
    }

    /// Hashed features of one action candidate (context + action rows).
    ///
    /// The feedback row, if any, is deliberately not included: it belongs
    /// to the decoder's feature space only.
    fn action_features(&self, decision: &MultiExample, row: usize) -> Vec<(u32, f32)> {
        let mut rows: Vec<&_> = Vec::with_capacity(2);
        if let Some(shared) = &decision.shared {
            rows.push(shared);
        }
        rows.push(&decision.actions[row]);
        assemble_features(&self.hasher, &rows, &self.interactions, self.sub_model)
    }

    /// Score every action and return the greedy prediction.
    ///
    /// Scores are cost estimates; probability mass 1 goes on the
    /// minimum-cost action (ties to the first). Outer stages replace the
    /// distribution.
    pub fn predict(
        &self,
        store: &WeightStore,
        decision: &MultiExample,
    ) -> Result<Prediction, BanditError> {
        let scores: Vec<f32> = (0..decision.n_actions())
            .map(|row| {
                self.optimizer
                    .raw_prediction(store, &self.action_features(decision, row))
            })
            .collect();

        let best = argmin(&scores);
        let mut probabilities = vec![0.0; scores.len()];
        probabilities[best] = 1.0;

        Ok(Prediction {
            scores,
            probabilities,
            chosen: best,
        })
    }

    /// Regress the observed cost on the labeled action's features.
    ///
    /// Returns the pre-update loss for progressive reporting.
    pub fn learn(
        &self,
        store: &mut WeightStore,
        decision: &MultiExample,
    ) -> Result<f32, BanditError> {
        let (row, label) = decision.cb_label().ok_or(BanditError::MissingLabel)?;
        let features = self.action_features(decision, row);

        let prediction = self.optimizer.raw_prediction(store, &features);
        let importance = decision.actions[row].importance() / label.probability;
        let slope = self.loss.slope(prediction, label.cost) * importance;
        self.optimizer.update(store, &features, slope);

        Ok(self.loss.loss(prediction, label.cost))
    }
}

/// Index of the minimum score, ties to the first. NaN scores lose.
fn argmin(scores: &[f32]) -> usize {
    let mut best = 0;
    for (index, &score) in scores.iter().enumerate().skip(1) {
        if score < scores[best] {
            best = index;
        }
    }
    best
}

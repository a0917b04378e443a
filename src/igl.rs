//! Interaction-grounded learning (IGL).
//!
//! IGL trains two sub-models jointly in one interleaved weight table:
//!
//! - the **policy** (even indices): the ordinary contextual-bandit
//!   scorer over context + action features, and
//! - the **decoder** (odd indices): a logistic model over
//!   context + action + feedback features that maps feedback to a latent
//!   reward signal.
//!
//! Both label derivations are pure functions of the incoming decision
//! (logged cost for the policy, chosen-action indicator for the decoder),
//! so joint training is update-for-update identical to training two
//! independent single-task models on the respectively projected feature
//! spaces. That is exactly what makes [`decompose`], a parity
//! [`split`](WeightStore::split) of the interleaved table, recover the
//! two models exactly on non-zero rows.

use crate::data::MultiExample;
use crate::error::BanditError;
use crate::hashing::{FeatureHasher, SubModel};
use crate::learner::{assemble_features, Interaction, LearnerStack, Prediction};
use crate::training::{CoinBetting, LogisticLoss, LossFn};
use crate::weights::WeightStore;

/// Logistic learner over context × action × feedback features.
///
/// One training decision yields one update per action row: target +1 for
/// the labeled (chosen) row, −1 for every other row. With
/// `sub_model == Some(Decoder)` the updates land on odd interleaved
/// indices; with `None` the learner trains a standalone single-task model
/// in plain address space (which is what decomposition is compared
/// against).
#[derive(Debug, Clone)]
pub struct DecoderLearner {
    hasher: FeatureHasher,
    interactions: Vec<Interaction>,
    optimizer: CoinBetting,
    sub_model: Option<SubModel>,
    loss: LogisticLoss,
}

impl DecoderLearner {
    /// Create a decoder learner.
    pub fn new(
        hasher: FeatureHasher,
        interactions: Vec<Interaction>,
        optimizer: CoinBetting,
        sub_model: Option<SubModel>,
    ) -> Self {
        DecoderLearner {
            hasher,
            interactions,
            optimizer,
            sub_model,
            loss: LogisticLoss,
        }
    }

    fn row_features(&self, decision: &MultiExample, row: usize) -> Result<Vec<(u32, f32)>, BanditError> {
        let feedback = decision.feedback.as_ref().ok_or(BanditError::MissingFeedback)?;
        let mut rows: Vec<&_> = Vec::with_capacity(3);
        if let Some(shared) = &decision.shared {
            rows.push(shared);
        }
        rows.push(&decision.actions[row]);
        rows.push(feedback);
        Ok(assemble_features(&self.hasher, &rows, &self.interactions, self.sub_model))
    }

    /// One logistic update per action row.
    ///
    /// Returns the mean pre-update loss over the rows.
    pub fn learn(
        &self,
        store: &mut WeightStore,
        decision: &MultiExample,
    ) -> Result<f32, BanditError> {
        let (chosen, _) = decision.cb_label().ok_or(BanditError::MissingLabel)?;
        let mut total_loss = 0.0f32;

        for row in 0..decision.n_actions() {
            let features = self.row_features(decision, row)?;
            let raw = self.optimizer.raw_prediction(store, &features);
            let target = if row == chosen { 1.0 } else { -1.0 };
            let importance = decision.actions[row].importance();

            total_loss += self.loss.loss(raw, target);
            let slope = self.loss.slope(raw, target) * importance;
            self.optimizer.update(store, &features, slope);
        }

        Ok(total_loss / decision.n_actions() as f32)
    }

    /// Decoded reward estimate for one action row, through the logistic
    /// link.
    pub fn predict(
        &self,
        store: &WeightStore,
        decision: &MultiExample,
        row: usize,
    ) -> Result<f32, BanditError> {
        if row >= decision.n_actions() {
            return Err(BanditError::EmptyDecision);
        }
        let features = self.row_features(decision, row)?;
        Ok(self.loss.link(self.optimizer.raw_prediction(store, &features)))
    }
}

/// Joint learner: policy chain and decoder over one interleaved table.
#[derive(Debug, Clone)]
pub struct IglLearner {
    stack: LearnerStack,
    decoder: DecoderLearner,
}

impl IglLearner {
    /// Compose the joint learner from the policy chain and the decoder.
    ///
    /// The caller must have constructed both sides with sub-model
    /// addressing (policy even, decoder odd) on the same hasher.
    pub fn new(stack: LearnerStack, decoder: DecoderLearner) -> Self {
        IglLearner { stack, decoder }
    }

    /// Predict through the policy chain.
    pub fn predict(
        &mut self,
        store: &WeightStore,
        decision: &MultiExample,
    ) -> Result<Prediction, BanditError> {
        self.stack.predict(store, decision)
    }

    /// One joint step: policy update, then decoder update.
    ///
    /// Returns the policy's progressive loss.
    pub fn learn(
        &mut self,
        store: &mut WeightStore,
        decision: &MultiExample,
    ) -> Result<f32, BanditError> {
        let loss = self.stack.learn(store, decision)?;
        self.decoder.learn(store, decision)?;
        Ok(loss)
    }
}

/// Decompose an interleaved table into `(policy_store, decoder_store)`.
///
/// Delegates to [`WeightStore::split`]: even indices form the policy
/// store, odd indices the decoder store, each re-addressed to
/// `index >> 1`. The source store is not mutated.
pub fn decompose(store: &WeightStore) -> (WeightStore, WeightStore) {
    store.split()
}

//! The model context: configuration plus owned learning state.
//!
//! There is no process-wide learner instance; every operation goes
//! through an explicit [`CbAdfModel`], created at configuration time and
//! dropped when no longer referenced. The model exclusively owns its
//! [`WeightStore`], which is mutated only by [`learn`](CbAdfModel::learn).

use crate::data::MultiExample;
use crate::error::BanditError;
use crate::hashing::{FeatureHasher, SubModel};
use crate::igl::{decompose, DecoderLearner, IglLearner};
use crate::learner::{
    ActionsMask, CbAdf, CbExploreAdf, ExplorationPolicy, Interaction, LearnerStack, Prediction,
    Stage,
};
use crate::training::{CoinBetting, CoinConfig, TrainingLogger, Verbosity};
use crate::weights::{WeightStore, STRIDE};

/// Configuration of a contextual-bandit model.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CbAdfConfig {
    /// Weight-table width in bits; indices live in `[0, 2^num_bits)`.
    /// In IGL mode the interleaved table spans one extra bit.
    pub num_bits: u32,

    /// Exploration policy of the cb-explore-adf stage.
    pub exploration: ExplorationPolicy,

    /// Policy-side namespace interactions (e.g. context × action).
    pub interactions: Vec<Interaction>,

    /// Decoder-side interactions (IGL only; typically one cubic
    /// context × action × feedback term).
    pub decoder_interactions: Vec<Interaction>,

    /// Train a decoder jointly with the policy in one interleaved table.
    pub igl: bool,

    /// Seed for the exploration sampler.
    pub seed: u64,

    /// Coin-betting optimizer settings.
    pub optimizer: CoinConfig,

    /// Inference-only mode: learn() never mutates the weight store.
    pub predict_only: bool,

    /// Training output verbosity.
    pub verbosity: Verbosity,
}

impl Default for CbAdfConfig {
    fn default() -> Self {
        CbAdfConfig {
            num_bits: 18,
            exploration: ExplorationPolicy::default(),
            interactions: Vec::new(),
            decoder_interactions: Vec::new(),
            igl: false,
            seed: 42,
            optimizer: CoinConfig::default(),
            predict_only: false,
            verbosity: Verbosity::default(),
        }
    }
}

#[derive(Debug, Clone)]
enum Mode {
    Cb(LearnerStack),
    Igl(IglLearner),
}

/// An online contextual-bandit model.
///
/// Single-threaded and synchronous: learn() and predict() are ordinary
/// blocking calls. The weight store is not internally synchronized;
/// concurrent access requires caller-side mutual exclusion.
#[derive(Debug, Clone)]
pub struct CbAdfModel {
    config: CbAdfConfig,
    store: WeightStore,
    mode: Mode,
    logger: TrainingLogger,
    examples_seen: u64,
    cumulative_loss: f64,
}

impl CbAdfModel {
    /// Build a model from its configuration.
    pub fn new(config: CbAdfConfig) -> Result<Self, BanditError> {
        if !(1..=30).contains(&config.num_bits) {
            return Err(BanditError::InvalidConfig(format!(
                "num_bits must be in [1, 30], got {}",
                config.num_bits
            )));
        }
        config.exploration.validate()?;

        let hasher = FeatureHasher::new(config.num_bits);
        let optimizer = CoinBetting::new(config.optimizer);
        let base = CbAdf::new(
            hasher.clone(),
            config.interactions.clone(),
            optimizer,
            config.igl.then_some(SubModel::Policy),
        );
        let stages = vec![
            Stage::ActionsMask(ActionsMask::new()),
            Stage::Explore(CbExploreAdf::new(config.exploration, config.seed)),
        ];
        let stack = LearnerStack::new(stages, base);

        let mode = if config.igl {
            let decoder = DecoderLearner::new(
                hasher,
                config.decoder_interactions.clone(),
                optimizer,
                Some(SubModel::Decoder),
            );
            Mode::Igl(IglLearner::new(stack, decoder))
        } else {
            Mode::Cb(stack)
        };

        Ok(CbAdfModel {
            store: WeightStore::new(STRIDE),
            logger: TrainingLogger::new(config.verbosity),
            config,
            mode,
            examples_seen: 0,
            cumulative_loss: 0.0,
        })
    }

    /// The model's configuration.
    pub fn config(&self) -> &CbAdfConfig {
        &self.config
    }

    /// Score a decision and sample an action.
    ///
    /// Never mutates the weight store (it is only borrowed shared here).
    pub fn predict(&mut self, decision: &MultiExample) -> Result<Prediction, BanditError> {
        match &mut self.mode {
            Mode::Cb(stack) => stack.predict(&self.store, decision),
            Mode::Igl(igl) => igl.predict(&self.store, decision),
        }
    }

    /// Update the model from one labeled decision.
    ///
    /// In `predict_only` mode this is a no-op: the weight store is never
    /// mutated.
    pub fn learn(&mut self, decision: &MultiExample) -> Result<(), BanditError> {
        if self.config.predict_only {
            return Ok(());
        }
        let loss = match &mut self.mode {
            Mode::Cb(stack) => stack.learn(&mut self.store, decision)?,
            Mode::Igl(igl) => igl.learn(&mut self.store, decision)?,
        };
        self.examples_seen += 1;
        self.cumulative_loss += f64::from(loss);
        self.logger.log_progress(
            self.examples_seen,
            self.cumulative_loss / self.examples_seen as f64,
        );
        Ok(())
    }

    /// The owned weight store. Together with
    /// [`WeightStore::iter_nonzero`] and [`WeightStore::split`] this is
    /// the entire contract exposed to model-export collaborators.
    pub fn weights(&self) -> &WeightStore {
        &self.store
    }

    /// Number of decisions learned so far.
    pub fn examples_seen(&self) -> u64 {
        self.examples_seen
    }

    /// Split the interleaved table into `(policy_store, decoder_store)`.
    ///
    /// Only available in IGL mode; the model's own store is not mutated.
    pub fn decompose(&self) -> Result<(WeightStore, WeightStore), BanditError> {
        if !self.config.igl {
            return Err(BanditError::NotIglMode);
        }
        Ok(decompose(&self.store))
    }
}

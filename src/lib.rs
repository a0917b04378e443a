//! bandits: An online contextual-bandit learning engine for Rust.
//!
//! Consumes streamed decision examples, updates a shared weight
//! representation incrementally (no batch passes), and produces
//! action-scoring predictions used to drive live decisions.
//!
//! # Key Types
//!
//! - [`CbAdfModel`] / [`CbAdfConfig`] - The model context with learn/predict
//! - [`MultiExample`] / [`Example`] - One decision and its feature rows
//! - [`Prediction`] - Per-action scores, a sampling distribution, the chosen action
//! - [`WeightStore`] - Strided, sparse-aware weight parameter storage
//! - [`ExplorationPolicy`] - Epsilon-greedy or softmax exploration
//!
//! # Training
//!
//! Build a [`CbAdfConfig`], construct the model with `CbAdfModel::new()`,
//! then stream decisions through `learn()` and `predict()`. Predictions
//! never mutate the weight store; a fixed seed makes a fixed call
//! sequence fully reproducible.
//!
//! # Interaction-Grounded Learning
//!
//! With `igl: true` the model trains a policy and a feedback decoder
//! jointly in one interleaved weight table; `decompose()` recovers the
//! two independent sub-models. See the [`igl`] module for details.

// Re-export approx traits for users who want to compare predictions
pub use approx;

pub mod data;
pub mod error;
pub mod events;
pub mod hashing;
pub mod igl;
pub mod learner;
pub mod model;
pub mod testing;
pub mod training;
pub mod weights;

// =============================================================================
// Convenience Re-exports
// =============================================================================

// The model context (most users want these)
pub use model::{CbAdfConfig, CbAdfModel};

// Decision examples
pub use data::{ActionMask, CbLabel, Example, MultiExample, Namespace};

// Learner chain types
pub use learner::{Capabilities, CbExploreAdf, ExplorationPolicy, Interaction, Prediction, Stage};

// Weight storage
pub use weights::{WeightStore, STRIDE};

// Training types
pub use training::{CoinConfig, LogisticLoss, LossFn, SquaredLoss, Verbosity};

// Errors and events
pub use error::BanditError;
pub use events::{OutcomeEvent, RankingEvent};

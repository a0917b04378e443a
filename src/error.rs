//! Crate-wide error type.

use thiserror::Error;

/// Errors surfaced by the bandit learning core.
///
/// Hash collisions between distinct feature tokens and NaN propagation out
/// of the optimizer are *not* errors: the former is an accepted statistical
/// approximation of fixed-width hashing, the latter is treated as a
/// data/configuration issue that surfaces in subsequent predictions.
#[derive(Debug, Error)]
pub enum BanditError {
    /// A fixture set was asked for more canned examples than it holds.
    #[error("requested {requested} fixture examples but only {available} exist")]
    FixtureOutOfRange { requested: usize, available: usize },

    /// An action mask references an action index outside the decision.
    #[error("action mask references action {index} but the decision has {n_actions} actions")]
    MaskOutOfRange { index: usize, n_actions: usize },

    /// An action mask forbids every action, leaving nothing to rank.
    #[error("action mask forbids all {n_actions} actions")]
    MaskAllActions { n_actions: usize },

    /// predict() was called on a decision with zero action rows.
    #[error("cannot predict on a decision with zero action rows")]
    EmptyDecision,

    /// learn() requires a contextual-bandit label on exactly one action row.
    #[error("learn requires a contextual-bandit label on one action row")]
    MissingLabel,

    /// Interaction-grounded learning requires a feedback row on every
    /// training decision.
    #[error("interaction-grounded learning requires a feedback row")]
    MissingFeedback,

    /// decompose() was called on a model not configured for
    /// interaction-grounded learning.
    #[error("decompose is only available on a model configured for interaction-grounded learning")]
    NotIglMode,

    /// A configuration value is out of its valid range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

//! Online training infrastructure.
//!
//! - [`CoinBetting`]: the per-weight adaptive update rule (parameter-free
//!   coin betting) operating on [`WeightStore`](crate::weights::WeightStore)
//!   blocks.
//! - [`LossFn`] with [`SquaredLoss`] / [`LogisticLoss`]: scalar online
//!   losses that supply the prediction-space slope.
//! - [`TrainingLogger`] / [`Verbosity`]: progressive-loss logging.

mod coin;
mod logger;
mod objectives;

pub use coin::{CoinBetting, CoinConfig};
pub use logger::{TrainingLogger, Verbosity};
pub use objectives::{LogisticLoss, LossFn, SquaredLoss};

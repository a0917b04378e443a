//! Weight parameter storage.
//!
//! [`WeightStore`] is the strided, sparse-aware parameter table every
//! learner writes into: one fixed-size block of `f32` slots per feature
//! index, slot 0 holding the weight and the remaining slots holding
//! optimizer state.
//!
//! The store is owned exclusively by one model instance and is not
//! internally synchronized; callers needing concurrent learn()/predict()
//! access must supply their own mutual exclusion.

mod store;

pub use store::{WeightStore, STRIDE};

//! Decision examples and their labels.
//!
//! This is the parsed-example interface: an external codec (dsjson, text
//! format) is expected to produce these types; the core never parses wire
//! text itself.
//!
//! - [`Example`]: one row of namespaced feature tokens.
//! - [`MultiExample`]: one decision: an optional shared context row,
//!   ordered action candidate rows, an optional feedback row, and an
//!   optional [`ActionMask`].
//! - [`CbLabel`]: logged (cost, probability) on the chosen action row.

mod example;
mod mask;

pub use example::{CbLabel, Example, MultiExample, Namespace};
pub use mask::ActionMask;

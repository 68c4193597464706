//! What an autonomous player believes about the hands it cannot see.
//!
//! - `table`: per-opponent hand counts, cards known from pile draws, and the
//!   resulting hand-value estimates.
//! - `stats`: the unseen-card universe and its value distribution.

mod stats;
mod table;

pub use stats::{CardStats, unseen_cards};
pub use table::{BeliefTable, OpponentBelief};

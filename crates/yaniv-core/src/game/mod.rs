//! The Yaniv table: turn state machine, scoring and persistence.

pub mod action;
pub mod error;
pub mod observation;
pub mod rules;
pub mod scoring;
pub mod serialization;
pub mod state;

pub use action::{Action, DrawChoice};
pub use error::{DiscardFault, DrawFault, GameError, SlamdownFault};
pub use observation::{RoundInfo, SeatInfo, TurnInfo};
pub use rules::{GameRules, ResetRule, RulesError};
pub use scoring::{Assaf, ScoreUpdate};
pub use serialization::{GameSnapshot, PlayerSnapshot, SnapshotError};
pub use state::{EliminatedPlayer, Game, Slamdown, YanivOutcome};

//! Public information handed to autonomous players as the game advances.

use crate::model::card::Card;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatInfo {
    pub name: String,
    pub score: u32,
    pub hand_count: usize,
}

/// Seats still in the game when a round is dealt, in turn order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundInfo {
    pub seats: Vec<SeatInfo>,
}

/// What every other player saw of one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnInfo {
    pub player: String,
    pub discarded: Vec<Card>,
    /// Set only when the card came off the pile; deck draws stay hidden.
    pub drawn_from_pile: Option<Card>,
    pub hand_count: usize,
    #[serde(default)]
    pub slamdown: bool,
}

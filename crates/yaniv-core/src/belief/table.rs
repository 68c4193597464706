use super::CardStats;
use crate::game::observation::{RoundInfo, TurnInfo};
use crate::model::card::{Card, total_value};
use std::collections::BTreeMap;

const OPENING_ESTIMATE: f64 = 50.0;

#[derive(Debug, Clone, PartialEq)]
pub struct OpponentBelief {
    pub score: u32,
    pub hand_count: usize,
    /// Cards seen going into this opponent's hand and not discarded since.
    pub known_cards: Vec<Card>,
    pub estimated_score: f64,
}

impl OpponentBelief {
    fn fresh(score: u32, hand_count: usize) -> Self {
        Self {
            score,
            hand_count,
            known_cards: Vec::new(),
            estimated_score: OPENING_ESTIMATE,
        }
    }

    pub fn known_value(&self) -> u32 {
        total_value(&self.known_cards)
    }

    pub fn unknown_count(&self) -> usize {
        self.hand_count.saturating_sub(self.known_cards.len())
    }
}

/// Beliefs about every opponent, keyed and iterated by name.
#[derive(Debug, Clone, Default)]
pub struct BeliefTable {
    opponents: BTreeMap<String, OpponentBelief>,
}

impl BeliefTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets everything and tracks the seats of a freshly dealt round.
    pub fn reset(&mut self, observer: &str, round: &RoundInfo) {
        self.opponents = round
            .seats
            .iter()
            .filter(|seat| seat.name != observer)
            .map(|seat| {
                (
                    seat.name.clone(),
                    OpponentBelief::fresh(seat.score, seat.hand_count),
                )
            })
            .collect();
    }

    /// Applies one observed turn. Returns whether it concerned a tracked opponent.
    pub fn observe_turn(&mut self, turn: &TurnInfo) -> bool {
        let Some(belief) = self.opponents.get_mut(&turn.player) else {
            return false;
        };
        belief.hand_count = turn.hand_count;
        belief
            .known_cards
            .retain(|card| !turn.discarded.contains(card));
        if let Some(card) = turn.drawn_from_pile {
            belief.known_cards.push(card);
        }
        true
    }

    /// Re-estimates each opponent's hand value as known cards plus the mean of
    /// the unseen distribution for every card still hidden.
    pub fn estimate(&mut self, stats: CardStats) {
        for belief in self.opponents.values_mut() {
            let unknown = belief.unknown_count() as f64;
            belief.estimated_score = f64::from(belief.known_value()) + unknown * stats.mean;
        }
    }

    pub fn get(&self, name: &str) -> Option<&OpponentBelief> {
        self.opponents.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OpponentBelief)> {
        self.opponents
            .iter()
            .map(|(name, belief)| (name.as_str(), belief))
    }

    pub fn opponents(&self) -> impl Iterator<Item = &OpponentBelief> {
        self.opponents.values()
    }

    pub fn known_cards(&self) -> impl Iterator<Item = Card> + '_ {
        self.opponents
            .values()
            .flat_map(|belief| belief.known_cards.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.opponents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.opponents.is_empty()
    }
}

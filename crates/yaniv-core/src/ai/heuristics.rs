//! Cost terms layered over the raw point search.

use crate::belief::BeliefTable;
use crate::model::card::Card;

const THREAT_HAND_VALUE: f64 = 8.0;
const THREAT_CAP: f64 = 1.5;
const YANIV_PROBABILITY_CAP: f64 = 0.92;
const RESET_BONUS_CAP: f64 = 24.0;
const RESET_SCORES: [u32; 2] = [50, 100];

/// How close the most dangerous opponent is to going out, in `0..=1.5`.
pub fn threat(beliefs: &BeliefTable) -> f64 {
    beliefs
        .opponents()
        .map(|belief| {
            let mut threat = ((THREAT_HAND_VALUE - belief.estimated_score) / THREAT_HAND_VALUE).max(0.0);
            if belief.hand_count <= 2 {
                threat += 0.30;
            }
            if belief.hand_count <= 1 {
                threat += 0.25;
            }
            threat
        })
        .fold(0.0, f64::max)
        .min(THREAT_CAP)
}

/// Chance that at least one opponent declares Yaniv on their next turn.
pub fn yaniv_next_turn_probability(beliefs: &BeliefTable) -> f64 {
    let quiet: f64 = beliefs
        .opponents()
        .filter(|belief| belief.estimated_score <= 6.5)
        .map(|belief| {
            let estimated = belief.estimated_score;
            let mut p = if estimated <= 5.0 {
                0.55 + (5.0 - estimated) * 0.08
            } else {
                0.18 + (6.5 - estimated) * 0.25
            };
            if belief.hand_count <= 2 {
                p += 0.10;
            } else if belief.hand_count == 3 {
                p += 0.05;
            }
            let low_known = belief.known_cards.iter().filter(|card| card.value() <= 3).count();
            p += 0.03 * low_known as f64;
            1.0 - p.clamp(0.0, YANIV_PROBABILITY_CAP)
        })
        .product();
    1.0 - quiet
}

/// Expected gain from holding exactly enough points to land on a reset score
/// if an opponent ends the round next turn.
pub fn reset_bonus(score: u32, hand_total: u32, yaniv_probability: f64) -> f64 {
    if !RESET_SCORES.contains(&(score + hand_total)) {
        return 0.0;
    }
    let success = match hand_total {
        0..=5 => 0.25,
        6..=7 => 0.55,
        _ => 0.75,
    };
    (50.0 * yaniv_probability * success).min(RESET_BONUS_CAP)
}

/// Ranks known to be in opponents' hands, overall and per suit.
#[derive(Debug, Clone, Default)]
pub struct KnownCards {
    ranks: [bool; 14],
    suit_ranks: [[bool; 15]; 4],
}

impl KnownCards {
    pub fn from_beliefs(beliefs: &BeliefTable) -> Self {
        let mut known = Self::default();
        for card in beliefs.known_cards() {
            let Some(suit) = card.suit() else {
                continue;
            };
            let rank = usize::from(card.rank().number());
            known.ranks[rank] = true;
            known.suit_ranks[suit.index()][rank] = true;
        }
        known
    }

    fn has_rank(&self, card: Card) -> bool {
        self.ranks[usize::from(card.rank().number())]
    }

    fn touches_suit(&self, card: Card) -> bool {
        let Some(suit) = card.suit() else {
            return false;
        };
        let rank = usize::from(card.rank().number());
        let ranks = &self.suit_ranks[suit.index()];
        ranks[rank - 1] || ranks[rank] || ranks[rank + 1]
    }
}

/// Cost of handing opponents cards they could pick up and use.
pub fn feed_penalty(cards: &[Card], known: &KnownCards) -> f64 {
    cards
        .iter()
        .map(|&card| {
            if card.is_joker() {
                return 4.0;
            }
            let mut penalty = match card.value() {
                0..=3 => 1.5,
                4..=5 => 1.0,
                _ => 0.2,
            };
            if known.has_rank(card) {
                penalty += 1.3;
            }
            if known.touches_suit(card) {
                penalty += 0.8;
            }
            penalty
        })
        .sum()
}

pub fn joker_penalty(cards: &[Card]) -> f64 {
    1.5 * cards.iter().filter(|card| card.is_joker()).count() as f64
}

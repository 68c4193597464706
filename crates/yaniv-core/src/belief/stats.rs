use super::BeliefTable;
use crate::model::card::{Card, DECK_SIZE};

/// Mean and population variance of a set of card values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardStats {
    pub mean: f64,
    pub variance: f64,
}

impl CardStats {
    /// Assumed when nothing is left unseen.
    pub const FALLBACK: CardStats = CardStats {
        mean: 5.0,
        variance: 8.0,
    };

    pub fn of(cards: &[Card]) -> Self {
        if cards.is_empty() {
            return Self::FALLBACK;
        }
        let count = cards.len() as f64;
        let mean = cards.iter().map(|card| f64::from(card.value())).sum::<f64>() / count;
        let variance = cards
            .iter()
            .map(|card| (f64::from(card.value()) - mean).powi(2))
            .sum::<f64>()
            / count;
        Self { mean, variance }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance.sqrt()
    }
}

/// Cards not visible to the observer: the full deck minus its own hand, the
/// offered draw options, the public discard pile, and every card known to sit
/// in an opponent's hand. Returned in id order.
pub fn unseen_cards(
    hand: &[Card],
    draw_options: &[Card],
    discard_pile: &[Card],
    beliefs: &BeliefTable,
) -> Vec<Card> {
    let mut visible = [false; DECK_SIZE];
    let seen = hand
        .iter()
        .chain(draw_options)
        .chain(discard_pile)
        .copied()
        .chain(beliefs.known_cards());
    for card in seen {
        visible[usize::from(card.id())] = true;
    }
    Card::universe()
        .filter(|card| !visible[usize::from(card.id())])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;

    #[test]
    fn stats_fall_back_when_empty() {
        assert_eq!(CardStats::of(&[]), CardStats::FALLBACK);
    }

    #[test]
    fn stats_use_population_variance() {
        let cards = [
            Card::new(Rank::Two, Suit::Clubs),
            Card::new(Rank::Four, Suit::Clubs),
        ];
        let stats = CardStats::of(&cards);
        assert!((stats.mean - 3.0).abs() < 1e-9);
        assert!((stats.variance - 1.0).abs() < 1e-9);
    }

    #[test]
    fn unseen_excludes_everything_visible() {
        let hand = [Card::new(Rank::Ace, Suit::Clubs)];
        let options = [Card::new(Rank::Two, Suit::Clubs)];
        let pile = [Card::new(Rank::Three, Suit::Clubs), options[0]];
        let unseen = unseen_cards(&hand, &options, &pile, &BeliefTable::new());
        assert_eq!(unseen.len(), DECK_SIZE - 3);
        assert!(!unseen.contains(&hand[0]));
        assert!(!unseen.contains(&pile[0]));
    }
}

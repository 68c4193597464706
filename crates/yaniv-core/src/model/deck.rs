use crate::model::card::{Card, DECK_SIZE};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Face-down draw pile. The last card of [`Deck::cards`] is the top.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    pub fn full() -> Self {
        let mut cards = Vec::with_capacity(DECK_SIZE);
        cards.extend(Card::universe());
        Self { cards }
    }

    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    pub fn shuffled<R: rand::Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Self::full();
        deck.shuffle_in_place(rng);
        deck
    }

    pub fn shuffled_with_seed(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::shuffled(&mut rng)
    }

    pub fn shuffle_in_place<R: rand::Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}

#[cfg(test)]
mod tests {
    use super::Deck;
    use crate::model::card::DECK_SIZE;
    use std::collections::HashSet;

    #[test]
    fn full_deck_has_54_unique_cards() {
        let deck = Deck::full();
        let unique: HashSet<_> = deck.cards().iter().copied().collect();
        assert_eq!(deck.len(), DECK_SIZE);
        assert_eq!(unique.len(), DECK_SIZE);
    }

    #[test]
    fn shuffle_with_seed_is_deterministic() {
        let deck_a = Deck::shuffled_with_seed(42);
        let deck_b = Deck::shuffled_with_seed(42);
        assert_eq!(deck_a.cards(), deck_b.cards());
    }

    #[test]
    fn shuffle_with_different_seeds_differs() {
        let deck_a = Deck::shuffled_with_seed(1);
        let deck_b = Deck::shuffled_with_seed(2);
        assert_ne!(deck_a.cards(), deck_b.cards());
    }

    #[test]
    fn draw_takes_from_the_top() {
        let mut deck = Deck::full();
        let top = *deck.cards().last().unwrap();
        assert_eq!(deck.draw(), Some(top));
        assert_eq!(deck.len(), DECK_SIZE - 1);
    }
}

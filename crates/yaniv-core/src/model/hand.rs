use crate::model::card::{Card, total_value};
use std::vec::Vec;

/// Cards held by one player, in the order they were received.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    pub fn new() -> Self {
        Self { cards: Vec::new() }
    }

    pub fn with_cards(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    pub fn add(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn remove(&mut self, card: Card) -> bool {
        if let Some(index) = self.cards.iter().position(|&c| c == card) {
            self.cards.remove(index);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, card: Card) -> bool {
        self.cards.contains(&card)
    }

    /// Whether every card of `cards` is held, each at most once.
    pub fn contains_all(&self, cards: &[Card]) -> bool {
        cards
            .iter()
            .enumerate()
            .all(|(index, card)| self.contains(*card) && !cards[..index].contains(card))
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn value(&self) -> u32 {
        total_value(&self.cards)
    }

    /// Orders the hand by rank, then suit, with jokers first.
    pub fn sort(&mut self) {
        self.cards.sort();
    }

    pub fn clear(&mut self) {
        self.cards.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::Hand;
    use crate::model::card::Card;
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;

    #[test]
    fn add_and_remove_cards() {
        let mut hand = Hand::new();
        let card = Card::new(Rank::Three, Suit::Clubs);
        hand.add(card);
        assert!(hand.contains(card));
        assert!(hand.remove(card));
        assert!(!hand.contains(card));
        assert!(!hand.remove(card));
    }

    #[test]
    fn drawn_cards_append_until_sorted() {
        let mut hand = Hand::new();
        hand.add(Card::new(Rank::King, Suit::Spades));
        hand.add(Card::new(Rank::Two, Suit::Clubs));
        hand.add(Card::JOKERS[0]);
        assert_eq!(hand.cards()[2], Card::JOKERS[0]);
        hand.sort();
        assert_eq!(hand.cards()[0], Card::JOKERS[0]);
        assert_eq!(hand.cards()[1], Card::new(Rank::Two, Suit::Clubs));
        assert_eq!(hand.cards()[2], Card::new(Rank::King, Suit::Spades));
    }

    #[test]
    fn value_sums_card_points() {
        let hand = Hand::with_cards(vec![
            Card::new(Rank::Two, Suit::Hearts),
            Card::new(Rank::Two, Suit::Diamonds),
            Card::new(Rank::Ace, Suit::Spades),
            Card::new(Rank::Five, Suit::Hearts),
        ]);
        assert_eq!(hand.value(), 10);
    }

    #[test]
    fn contains_all_rejects_repeats() {
        let five = Card::new(Rank::Five, Suit::Hearts);
        let hand = Hand::with_cards(vec![five]);
        assert!(hand.contains_all(&[five]));
        assert!(!hand.contains_all(&[five, five]));
    }
}

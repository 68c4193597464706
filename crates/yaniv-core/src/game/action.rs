use crate::model::card::Card;
use serde::{Deserialize, Serialize};

/// Where the card picked up at the end of a turn comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawChoice {
    Deck,
    /// Index into the draw options offered at turn start.
    Pile(usize),
}

/// A full turn: the cards to discard and the draw that goes with them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Action {
    pub discard: Vec<Card>,
    pub draw: DrawChoice,
}

impl Action {
    pub fn new(discard: Vec<Card>, draw: DrawChoice) -> Self {
        Self { discard, draw }
    }

    pub fn from_deck(discard: Vec<Card>) -> Self {
        Self::new(discard, DrawChoice::Deck)
    }

    pub fn from_pile(discard: Vec<Card>, index: usize) -> Self {
        Self::new(discard, DrawChoice::Pile(index))
    }

    pub fn discard_value(&self) -> u32 {
        crate::model::card::total_value(&self.discard)
    }
}

#[cfg(test)]
mod tests {
    use super::{Action, DrawChoice};
    use crate::model::card::Card;
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;

    #[test]
    fn draw_choice_serializes_in_snake_case() {
        assert_eq!(serde_json::to_string(&DrawChoice::Deck).unwrap(), "\"deck\"");
        assert_eq!(
            serde_json::to_string(&DrawChoice::Pile(1)).unwrap(),
            "{\"pile\":1}"
        );
    }

    #[test]
    fn discard_value_sums_cards() {
        let action = Action::from_pile(
            vec![
                Card::new(Rank::King, Suit::Clubs),
                Card::new(Rank::King, Suit::Hearts),
            ],
            0,
        );
        assert_eq!(action.discard_value(), 20);
        assert_eq!(action.draw, DrawChoice::Pile(0));
    }
}

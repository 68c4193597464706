use crate::model::rank::Rank;
use crate::model::suit::Suit;
use core::fmt;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of physical cards in a Yaniv deck: 52 ranked cards and two jokers.
pub const DECK_SIZE: usize = 54;

const JOKER_COUNT: u8 = 2;

/// One physical card, identified by an id in `0..54`.
///
/// Ids `0` and `1` are the two jokers. Every other card has id
/// `(rank - 1) * 4 + suit + 2`, so ordering by id orders by rank and then by
/// suit. Two jokers never compare equal; any "is this a joker" question goes
/// through [`Card::is_joker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Card {
    id: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("card id {0} is outside 0..{DECK_SIZE}")]
pub struct InvalidCardId(pub u8);

impl Card {
    pub const JOKERS: [Card; 2] = [Card { id: 0 }, Card { id: 1 }];

    /// Builds a card from rank and suit. For [`Rank::Joker`] the suit only
    /// selects which of the two jokers is meant: clubs and hearts give the
    /// first, diamonds and spades the second.
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        if rank.is_joker() {
            return Self {
                id: (suit as u8) % JOKER_COUNT,
            };
        }
        Self {
            id: (rank.number() - 1) * 4 + suit as u8 + JOKER_COUNT,
        }
    }

    pub const fn from_id(id: u8) -> Option<Self> {
        if (id as usize) < DECK_SIZE {
            Some(Self { id })
        } else {
            None
        }
    }

    pub const fn id(self) -> u8 {
        self.id
    }

    pub const fn is_joker(self) -> bool {
        self.id < JOKER_COUNT
    }

    pub const fn rank(self) -> Rank {
        if self.is_joker() {
            return Rank::Joker;
        }
        match Rank::from_number((self.id - JOKER_COUNT) / 4 + 1) {
            Some(rank) => rank,
            None => Rank::Joker,
        }
    }

    pub const fn suit(self) -> Option<Suit> {
        if self.is_joker() {
            None
        } else {
            Suit::from_index(((self.id - JOKER_COUNT) % 4) as usize)
        }
    }

    /// Point value: jokers 0, aces 1, number cards face value, pictures 10.
    pub const fn value(self) -> u8 {
        self.rank().points()
    }

    /// Every card of the deck in id order.
    pub fn universe() -> impl Iterator<Item = Card> {
        (0..DECK_SIZE as u8).map(|id| Card { id })
    }
}

impl TryFrom<u8> for Card {
    type Error = InvalidCardId;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Card::from_id(id).ok_or(InvalidCardId(id))
    }
}

impl From<Card> for u8 {
    fn from(card: Card) -> Self {
        card.id
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.suit() {
            Some(suit) => write!(f, "{}{}", self.rank(), suit),
            None => write!(f, "{}{}", self.rank(), self.id + 1),
        }
    }
}

/// Total point value of a set of cards.
pub fn total_value<'a, I>(cards: I) -> u32
where
    I: IntoIterator<Item = &'a Card>,
{
    cards.into_iter().map(|card| u32::from(card.value())).sum()
}

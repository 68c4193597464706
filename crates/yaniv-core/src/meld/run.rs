use crate::model::card::Card;
use crate::model::rank::Rank;
use crate::model::suit::Suit;

const LOWEST: u8 = Rank::Ace as u8;
const HIGHEST: u8 = Rank::King as u8;

/// A discarded sequence read back as a same-suit run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    cards: Vec<Card>,
    suit: Suit,
    low: u8,
    high: u8,
}

impl Run {
    /// Cards in run order, jokers placed where they stand in for a rank.
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn suit(&self) -> Suit {
        self.suit
    }

    /// Rank number covered by the first card, edge jokers included.
    pub fn low(&self) -> u8 {
        self.low
    }

    /// Rank number covered by the last card, edge jokers included.
    pub fn high(&self) -> u8 {
        self.high
    }

    /// The two cards a player may take from the pile when this run is on top.
    pub fn endpoints(&self) -> [Card; 2] {
        [self.cards[0], self.cards[self.cards.len() - 1]]
    }

    /// Whether `card` continues the run at either end.
    pub fn extends_with(&self, card: Card) -> bool {
        if card.suit() != Some(self.suit) {
            return false;
        }
        let number = card.rank().number();
        number + 1 == self.low || number == self.high + 1
    }
}

/// Interprets `cards` as a run of at least three same-suit consecutive ranks.
///
/// Jokers fill rank gaps first, taken from the interior of the sequence, then
/// from the leading jokers nearest the centre, then from the trailing ones.
/// Jokers left over stay at the end they were placed on (interior extras go
/// low) and are pushed to the other end when they would pass Ace or King.
pub fn arrange_run(cards: &[Card]) -> Option<Run> {
    if cards.len() < 3 {
        return None;
    }
    let mut naturals: Vec<Card> = cards.iter().copied().filter(|c| !c.is_joker()).collect();
    let suit = naturals.first()?.suit()?;
    if naturals.iter().any(|card| card.suit() != Some(suit)) {
        return None;
    }
    naturals.sort_by_key(|card| card.rank().number());
    let ranks: Vec<u8> = naturals.iter().map(|card| card.rank().number()).collect();
    if ranks.windows(2).any(|pair| pair[0] == pair[1]) {
        return None;
    }
    let gaps: Vec<usize> = ranks
        .windows(2)
        .map(|pair| usize::from(pair[1] - pair[0] - 1))
        .collect();
    let needed: usize = gaps.iter().sum();

    let leading_count = cards.iter().take_while(|card| card.is_joker()).count();
    let trailing_count = cards[leading_count..]
        .iter()
        .rev()
        .take_while(|card| card.is_joker())
        .count();
    let mut leading: Vec<Card> = cards[..leading_count].to_vec();
    let mut trailing: Vec<Card> = cards[cards.len() - trailing_count..].to_vec();
    let mut interior: Vec<Card> = cards[leading_count..cards.len() - trailing_count]
        .iter()
        .copied()
        .filter(|card| card.is_joker())
        .collect();
    if needed > leading.len() + trailing.len() + interior.len() {
        return None;
    }

    let mut fillers = Vec::with_capacity(needed);
    while fillers.len() < needed {
        if !interior.is_empty() {
            fillers.push(interior.remove(0));
        } else if let Some(joker) = leading.pop() {
            fillers.push(joker);
        } else if !trailing.is_empty() {
            fillers.push(trailing.remove(0));
        } else {
            return None;
        }
    }

    let mut low_edge = leading;
    low_edge.extend(interior);
    let mut high_edge = trailing;
    let low_room = usize::from(ranks[0] - LOWEST);
    let high_room = usize::from(HIGHEST - ranks[ranks.len() - 1]);
    while low_edge.len() > low_room {
        let joker = low_edge.remove(0);
        high_edge.push(joker);
    }
    while high_edge.len() > high_room {
        let joker = high_edge.pop()?;
        low_edge.insert(0, joker);
    }
    if low_edge.len() > low_room {
        return None;
    }

    let low = ranks[0] - low_edge.len() as u8;
    let high = ranks[ranks.len() - 1] + high_edge.len() as u8;
    let mut ordered = low_edge;
    let mut fillers = fillers.into_iter();
    for (index, card) in naturals.iter().enumerate() {
        ordered.push(*card);
        if let Some(gap) = gaps.get(index) {
            ordered.extend(fillers.by_ref().take(*gap));
        }
    }
    ordered.extend(high_edge);

    Some(Run {
        cards: ordered,
        suit,
        low,
        high,
    })
}

//! Legal discard enumeration.
//!
//! A discard is a single card, a set of two or more same-rank cards padded
//! with any number of jokers, or a same-suit run of at least three cards in
//! which jokers fill rank gaps or extend an end.

mod run;

pub use run::{Run, arrange_run};

use crate::model::card::{Card, total_value};
use crate::model::rank::Rank;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeldKind {
    Single,
    Set,
    Run,
}

/// One legal discard, cards in the order they go onto the pile.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DiscardOption {
    cards: Vec<Card>,
    kind: MeldKind,
}

impl DiscardOption {
    fn new(cards: Vec<Card>, kind: MeldKind) -> Self {
        Self { cards, kind }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn into_cards(self) -> Vec<Card> {
        self.cards
    }

    pub fn kind(&self) -> MeldKind {
        self.kind
    }

    pub fn value(&self) -> u32 {
        total_value(&self.cards)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn joker_count(&self) -> usize {
        self.cards.iter().filter(|card| card.is_joker()).count()
    }

    /// Same cards regardless of order.
    pub fn matches(&self, cards: &[Card]) -> bool {
        self.cards.len() == cards.len() && cards.iter().all(|card| self.cards.contains(card))
    }
}

/// Every legal discard for a hand. The result depends only on which cards
/// are held, not on their order.
pub fn discard_options(hand: &[Card]) -> Vec<DiscardOption> {
    let mut sorted = hand.to_vec();
    sorted.sort();

    let mut options: Vec<DiscardOption> = sorted
        .iter()
        .map(|&card| DiscardOption::new(vec![card], MeldKind::Single))
        .collect();

    let (jokers, naturals): (Vec<Card>, Vec<Card>) =
        sorted.iter().copied().partition(|card| card.is_joker());
    let joker_subsets: Vec<Vec<Card>> = (0..=jokers.len())
        .flat_map(|size| combinations(&jokers, size))
        .collect();

    for size in 2..=naturals.len() {
        for combo in combinations(&naturals, size) {
            let rank = combo[0].rank();
            if combo.iter().all(|card| card.rank() == rank) {
                for padding in &joker_subsets {
                    let mut cards = combo.clone();
                    cards.extend(padding);
                    options.push(DiscardOption::new(cards, MeldKind::Set));
                }
                continue;
            }
            let suit = combo[0].suit();
            if combo.iter().all(|card| card.suit() == suit) {
                push_runs(&mut options, combo, &jokers);
            }
        }
    }
    options
}

/// Adds the run options a same-suit combination supports with `jokers`.
fn push_runs(options: &mut Vec<DiscardOption>, mut combo: Vec<Card>, jokers: &[Card]) {
    combo.sort_by_key(|card| card.rank().number());
    let needed: usize = combo
        .windows(2)
        .map(|pair| usize::from(pair[1].rank().number() - pair[0].rank().number() - 1))
        .sum();
    if needed > jokers.len() {
        return;
    }

    let low_open = combo[0].rank() != Rank::Ace;
    let high_open = combo[combo.len() - 1].rank() != Rank::King;
    // Either joker may stand in a gap; whichever is left over can extend an end.
    for gap_jokers in combinations(jokers, needed) {
        let mut fillers = gap_jokers.iter().copied();
        let mut filled = Vec::with_capacity(combo.len() + needed);
        for pair in combo.windows(2) {
            filled.push(pair[0]);
            let gap = pair[1].rank().number() - pair[0].rank().number() - 1;
            filled.extend(fillers.by_ref().take(usize::from(gap)));
        }
        filled.extend(combo.last().copied());

        let spare: Vec<Card> = jokers
            .iter()
            .copied()
            .filter(|joker| !gap_jokers.contains(joker))
            .collect();
        for &joker in &spare {
            if low_open {
                let mut cards = Vec::with_capacity(filled.len() + 1);
                cards.push(joker);
                cards.extend(&filled);
                options.push(DiscardOption::new(cards, MeldKind::Run));
            }
            if high_open {
                let mut cards = filled.clone();
                cards.push(joker);
                options.push(DiscardOption::new(cards, MeldKind::Run));
            }
        }
        if spare.len() >= 2 && low_open && high_open {
            let mut cards = Vec::with_capacity(filled.len() + 2);
            cards.push(spare[0]);
            cards.extend(&filled);
            cards.push(spare[1]);
            options.push(DiscardOption::new(cards, MeldKind::Run));
        }
        if filled.len() >= 3 {
            options.push(DiscardOption::new(filled, MeldKind::Run));
        }
    }
}

/// Options that shed the most points, and among those the fewest cards.
pub fn best_discard_options(options: &[DiscardOption]) -> Vec<DiscardOption> {
    let Some(best) = options
        .iter()
        .map(|option| (option.value(), std::cmp::Reverse(option.len())))
        .max()
    else {
        return Vec::new();
    };
    options
        .iter()
        .filter(|option| (option.value(), std::cmp::Reverse(option.len())) == best)
        .cloned()
        .collect()
}

/// Looks up `cards` among the legal discards of `hand`. The submitted order is
/// kept when it is itself a generated ordering.
pub fn find_discard(hand: &[Card], cards: &[Card]) -> Option<DiscardOption> {
    if cards.is_empty() {
        return None;
    }
    let options = discard_options(hand);
    if let Some(exact) = options.iter().find(|option| option.cards() == cards) {
        return Some(exact.clone());
    }
    options.into_iter().find(|option| option.matches(cards))
}

/// Whether `cards` is one of the legal discards of `hand`, in any order.
pub fn is_valid_discard(hand: &[Card], cards: &[Card]) -> bool {
    find_discard(hand, cards).is_some()
}

fn combinations(items: &[Card], size: usize) -> Vec<Vec<Card>> {
    let mut out = Vec::new();
    let mut current = Vec::with_capacity(size);
    collect_combinations(items, size, 0, &mut current, &mut out);
    out
}

fn collect_combinations(
    items: &[Card],
    size: usize,
    start: usize,
    current: &mut Vec<Card>,
    out: &mut Vec<Vec<Card>>,
) {
    if current.len() == size {
        out.push(current.clone());
        return;
    }
    for index in start..items.len() {
        if items.len() - index < size - current.len() {
            break;
        }
        current.push(items[index]);
        collect_combinations(items, size, index + 1, current, out);
        current.pop();
    }
}

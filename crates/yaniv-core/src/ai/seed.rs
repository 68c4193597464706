use crate::belief::BeliefTable;
use crate::model::card::Card;

const OFFSET_BASIS: u64 = 2_166_136_261;
const PRIME: u64 = 16_777_619;
const GOLDEN: u64 = 0x9E37_79B9;
const MASK: u64 = 0xFFFF_FFFF;

/// 32-bit FNV-style hash of the observable state a decision depends on: own
/// score, sorted hand ids, sorted draw-option ids, discard pile size, and
/// opponents' hand counts ordered by opponent name.
pub fn state_seed(
    score: u32,
    hand: &[Card],
    draw_options: &[Card],
    pile_len: usize,
    beliefs: &BeliefTable,
) -> u64 {
    let mut hand_ids: Vec<u64> = hand.iter().map(|card| u64::from(card.id())).collect();
    hand_ids.sort_unstable();
    let mut draw_ids: Vec<u64> = draw_options
        .iter()
        .map(|card| u64::from(card.id()))
        .collect();
    draw_ids.sort_unstable();

    std::iter::once(u64::from(score))
        .chain(hand_ids)
        .chain(draw_ids)
        .chain(std::iter::once(pile_len as u64))
        .chain(beliefs.opponents().map(|belief| belief.hand_count as u64))
        .fold(OFFSET_BASIS, |seed, value| {
            ((seed ^ value.wrapping_add(GOLDEN)).wrapping_mul(PRIME)) & MASK
        })
}

#[cfg(test)]
mod tests {
    use super::state_seed;
    use crate::belief::BeliefTable;
    use crate::model::card::Card;
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;

    #[test]
    fn seed_ignores_card_order() {
        let a = Card::new(Rank::Two, Suit::Clubs);
        let b = Card::new(Rank::Five, Suit::Spades);
        let table = BeliefTable::new();
        assert_eq!(
            state_seed(10, &[a, b], &[], 3, &table),
            state_seed(10, &[b, a], &[], 3, &table)
        );
    }

    #[test]
    fn seed_tracks_every_input() {
        let a = Card::new(Rank::Two, Suit::Clubs);
        let table = BeliefTable::new();
        let base = state_seed(10, &[a], &[], 3, &table);
        assert_ne!(base, state_seed(11, &[a], &[], 3, &table));
        assert_ne!(base, state_seed(10, &[a], &[], 4, &table));
        let b = Card::new(Rank::Three, Suit::Clubs);
        assert_ne!(base, state_seed(10, &[a], &[b], 3, &table));
        assert!(base <= u64::from(u32::MAX));
    }
}

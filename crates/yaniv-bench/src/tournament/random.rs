use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::Deserialize;
use yaniv_core::game::Action;
use yaniv_core::meld::discard_options;
use yaniv_core::model::card::{Card, total_value};

/// Knobs of the random seat. Defaults match the reference opponent used to
/// measure the agents.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct RandomOptions {
    /// Chance of drawing from the pile when it offers anything.
    pub pile_draw: f64,
    /// Chance of calling Yaniv with three or four points.
    pub declare: f64,
    /// Chance of taking a pending slamdown.
    pub slamdown: f64,
}

impl Default for RandomOptions {
    fn default() -> Self {
        Self {
            pile_draw: 0.45,
            declare: 0.25,
            slamdown: 0.5,
        }
    }
}

/// A human-controlled seat that plays uniformly random legal moves.
#[derive(Debug, Clone, Copy)]
pub struct RandomPolicy {
    options: RandomOptions,
}

impl RandomPolicy {
    pub fn new(options: RandomOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> RandomOptions {
        self.options
    }

    pub fn choose_action(
        &self,
        hand: &[Card],
        draw_options: &[Card],
        rng: &mut StdRng,
    ) -> Option<Action> {
        let discard = discard_options(hand)
            .choose(rng)?
            .cards()
            .to_vec();
        if !draw_options.is_empty() && rng.gen_bool(self.options.pile_draw) {
            let index = rng.gen_range(0..draw_options.len());
            return Some(Action::from_pile(discard, index));
        }
        Some(Action::from_deck(discard))
    }

    /// Always at two points or less, never at five, otherwise by chance.
    pub fn should_declare(&self, hand: &[Card], rng: &mut StdRng) -> bool {
        match total_value(hand) {
            0..=2 => true,
            value if value >= 5 => false,
            _ => rng.gen_bool(self.options.declare),
        }
    }

    pub fn take_slamdown(&self, rng: &mut StdRng) -> bool {
        rng.gen_bool(self.options.slamdown)
    }
}

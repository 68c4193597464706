//! Autonomous Yaniv player.
//!
//! The agent keeps its own view of the table (its hand, the public discard
//! pile, the current draw options) and a [`BeliefTable`] about opponents,
//! both fed by the game through the `observe_*` hooks. Decisions run against
//! that view and are deterministic: deck rollouts draw from an RNG seeded by
//! [`state_seed`], and the memo tables only cache pure results.

mod cache;
mod declare;
mod heuristics;
mod params;
mod search;
mod seed;

pub use cache::{HandSignature, LruCache};
pub use declare::{assaf_probability, risk_threshold};
pub use params::{AgentParams, AgentPolicy, MIN_ROLLOUT_SAMPLES};
pub use seed::state_seed;

use crate::belief::{BeliefTable, CardStats, unseen_cards};
use crate::game::observation::{RoundInfo, TurnInfo};
use crate::meld::{DiscardOption, best_discard_options, discard_options};
use crate::model::card::{Card, total_value};
use std::sync::Arc;

/// Highest hand value an agent will ever declare on.
pub const YANIV_LIMIT: u32 = 5;

#[derive(Debug, Clone, Default)]
struct TableView {
    hand: Vec<Card>,
    discard_pile: Vec<Card>,
    draw_options: Vec<Card>,
}

/// Hand-signature keyed memo tables, valid for one round.
#[derive(Debug)]
struct Memo {
    options: LruCache<HandSignature, Arc<[DiscardOption]>>,
    best: LruCache<HandSignature, Arc<[DiscardOption]>>,
    residual: LruCache<HandSignature, u32>,
}

impl Memo {
    fn new(capacity: usize) -> Self {
        Self {
            options: LruCache::new(capacity),
            best: LruCache::new(capacity),
            residual: LruCache::new(capacity),
        }
    }

    fn options(&mut self, hand: &[Card]) -> Arc<[DiscardOption]> {
        let key = HandSignature::of(hand);
        if let Some(hit) = self.options.get(&key) {
            return hit;
        }
        let options: Arc<[DiscardOption]> = discard_options(hand).into();
        self.options.insert(key, Arc::clone(&options));
        options
    }

    fn best(&mut self, hand: &[Card]) -> Arc<[DiscardOption]> {
        let key = HandSignature::of(hand);
        if let Some(hit) = self.best.get(&key) {
            return hit;
        }
        let best: Arc<[DiscardOption]> = best_discard_options(&self.options(hand)).into();
        self.best.insert(key, Arc::clone(&best));
        best
    }

    /// Lowest hand value reachable from `hand` with a single discard.
    fn residual(&mut self, hand: &[Card]) -> u32 {
        let key = HandSignature::of(hand);
        if let Some(hit) = self.residual.get(&key) {
            return hit;
        }
        let total = total_value(hand);
        let shed = self
            .options(hand)
            .iter()
            .map(DiscardOption::value)
            .max()
            .unwrap_or(0);
        let residual = total - shed;
        self.residual.insert(key, residual);
        residual
    }

    fn clear(&mut self) {
        self.options.clear();
        self.best.clear();
        self.residual.clear();
    }
}

#[derive(Debug)]
pub struct AutonomousAgent {
    name: String,
    params: AgentParams,
    beliefs: BeliefTable,
    table: TableView,
    memo: Memo,
}

impl AutonomousAgent {
    pub fn new(name: impl Into<String>, params: AgentParams) -> Self {
        Self {
            name: name.into(),
            params,
            beliefs: BeliefTable::new(),
            table: TableView::default(),
            memo: Memo::new(params.cache_capacity),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &AgentParams {
        &self.params
    }

    pub fn beliefs(&self) -> &BeliefTable {
        &self.beliefs
    }

    pub fn draw_options(&self) -> &[Card] {
        &self.table.draw_options
    }

    /// Starts a new round: beliefs, table view and memo tables are dropped.
    pub fn observe_round(&mut self, round: &RoundInfo) {
        self.beliefs.reset(&self.name, round);
        self.table = TableView::default();
        self.memo.clear();
    }

    /// Records another player's turn along with the pile it left behind.
    pub fn observe_turn(&mut self, turn: &TurnInfo, discard_pile: &[Card], draw_options: &[Card]) {
        self.table.discard_pile = discard_pile.to_vec();
        self.table.draw_options = draw_options.to_vec();
        if self.beliefs.observe_turn(turn) {
            self.refresh_estimates();
        }
    }

    /// Syncs the agent's view with the table before it acts.
    pub fn observe_table(&mut self, hand: &[Card], discard_pile: &[Card], draw_options: &[Card]) {
        self.table.hand = hand.to_vec();
        self.table.discard_pile = discard_pile.to_vec();
        self.table.draw_options = draw_options.to_vec();
        self.refresh_estimates();
    }

    /// Cards the agent cannot see anywhere, in id order.
    pub fn unseen_cards(&self) -> Vec<Card> {
        unseen_cards(
            &self.table.hand,
            &self.table.draw_options,
            &self.table.discard_pile,
            &self.beliefs,
        )
    }

    fn take_hand(&mut self, hand: &[Card]) {
        if self.table.hand.as_slice() != hand {
            self.table.hand = hand.to_vec();
        }
        self.refresh_estimates();
    }

    fn refresh_estimates(&mut self) {
        let stats = match self.params.policy {
            AgentPolicy::Expected => CardStats::of(&self.unseen_cards()),
            AgentPolicy::Greedy => CardStats::FALLBACK,
        };
        self.beliefs.estimate(stats);
    }
}

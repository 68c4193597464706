use super::heuristics::{self, KnownCards};
use super::{AgentPolicy, AutonomousAgent, state_seed};
use crate::belief::CardStats;
use crate::game::action::Action;
use crate::meld::DiscardOption;
use crate::model::card::{Card, total_value};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{debug, trace};

/// Opponent hand estimate at or below which the agent looks for a reset.
const RESET_WATCH: f64 = 5.0;
const RESET_STEP: i64 = 50;

/// Inputs shared by every candidate of one decision.
struct SearchContext {
    samples: Vec<Card>,
    deck_variance: f64,
    known: KnownCards,
    threat: f64,
    yaniv_next_turn: f64,
}

/// Best candidate so far: lowest score, ties to the larger discard.
#[derive(Default)]
struct Best {
    pick: Option<(f64, u32, Action)>,
}

impl Best {
    fn offer(&mut self, score: f64, discard_value: u32, action: impl FnOnce() -> Action) {
        if !score.is_finite() {
            return;
        }
        let better = match &self.pick {
            None => true,
            Some((best_score, best_value, _)) => {
                score < *best_score || (score == *best_score && discard_value > *best_value)
            }
        };
        if better {
            self.pick = Some((score, discard_value, action()));
        }
    }

    fn into_action(self) -> Option<Action> {
        self.pick.map(|(_, _, action)| action)
    }
}

fn without(hand: &[Card], option: &DiscardOption) -> Vec<Card> {
    hand.iter()
        .copied()
        .filter(|card| !option.cards().contains(card))
        .collect()
}

fn with_card(kept: &[Card], card: Card) -> Vec<Card> {
    let mut next = Vec::with_capacity(kept.len() + 1);
    next.extend_from_slice(kept);
    next.push(card);
    next
}

impl AutonomousAgent {
    /// Chooses this turn's discard and draw. `None` only for an empty hand.
    pub fn decide_action(&mut self, hand: &[Card], score: u32) -> Option<Action> {
        self.take_hand(hand);
        let action = match self.reset_action(hand, score) {
            Some(action) => {
                debug!(target: "yaniv_core::ai", agent = %self.name, "taking reset line");
                Some(action)
            }
            None => match self.params.policy {
                AgentPolicy::Expected => self
                    .expected_value_action(hand, score)
                    .or_else(|| self.minimizing_action(hand)),
                AgentPolicy::Greedy => self.minimizing_action(hand),
            },
        };
        if let Some(action) = &action {
            debug!(
                target: "yaniv_core::ai",
                agent = %self.name,
                discard = ?action.discard,
                draw = ?action.draw,
                "decided action"
            );
        }
        action
    }

    /// When an opponent looks ready to go out, finds a pile draw that puts
    /// the agent's score on a multiple of 50.
    fn reset_action(&mut self, hand: &[Card], score: u32) -> Option<Action> {
        if !self
            .beliefs
            .opponents()
            .any(|belief| belief.estimated_score <= RESET_WATCH)
        {
            return None;
        }
        let options = self.memo.options(hand);
        for option in options.iter() {
            for (index, draw) in self.table.draw_options.iter().enumerate() {
                let landing = i64::from(option.value()) - i64::from(draw.value()) + i64::from(score);
                if landing.rem_euclid(RESET_STEP) == 0 {
                    return Some(Action::from_pile(option.cards().to_vec(), index));
                }
            }
        }
        None
    }

    fn search_context(&self, hand: &[Card], score: u32) -> SearchContext {
        let unseen = self.unseen_cards();
        let stats = CardStats::of(&unseen);
        let wanted = self.params.rollout_samples().min(unseen.len());
        let samples = if wanted < unseen.len() {
            let seed = state_seed(
                score,
                hand,
                &self.table.draw_options,
                self.table.discard_pile.len(),
                &self.beliefs,
            );
            let mut rng = StdRng::seed_from_u64(seed);
            unseen.choose_multiple(&mut rng, wanted).copied().collect()
        } else {
            unseen
        };
        SearchContext {
            samples,
            deck_variance: stats.variance,
            known: KnownCards::from_beliefs(&self.beliefs),
            threat: heuristics::threat(&self.beliefs),
            yaniv_next_turn: heuristics::yaniv_next_turn_probability(&self.beliefs),
        }
    }

    fn heuristic_cost(&self, threat: f64, immediate: f64, feed: f64, jokers: f64) -> f64 {
        self.params.threat_weight * threat * immediate
            + self.params.feed_weight * feed
            + self.params.joker_weight * jokers
    }

    /// Scores every (discard, draw) pair by one-ply lookahead plus heuristics.
    fn expected_value_action(&mut self, hand: &[Card], score: u32) -> Option<Action> {
        let context = self.search_context(hand, score);
        let options = self.memo.options(hand);
        let draws = self.table.draw_options.clone();
        let mut best = Best::default();

        for option in options.iter() {
            let kept = without(hand, option);
            let kept_total = total_value(&kept);
            let discard_value = option.value();
            let feed = heuristics::feed_penalty(option.cards(), &context.known);
            let jokers = heuristics::joker_penalty(option.cards());

            for (index, &draw) in draws.iter().enumerate() {
                let future = f64::from(self.memo.residual(&with_card(&kept, draw)));
                let immediate = kept_total + u32::from(draw.value());
                let cost = self.heuristic_cost(context.threat, f64::from(immediate), feed, jokers);
                let bonus = heuristics::reset_bonus(score, immediate, context.yaniv_next_turn);
                let total = future + cost - bonus;
                trace!(target: "yaniv_core::ai", discard = ?option.cards(), draw = index, total, "pile candidate");
                best.offer(total, discard_value, || {
                    Action::from_pile(option.cards().to_vec(), index)
                });
            }

            let (future, immediate) = self.deck_rollout(&kept, kept_total, &context.samples);
            let bonus = if context.samples.is_empty() {
                0.0
            } else {
                context
                    .samples
                    .iter()
                    .map(|card| {
                        heuristics::reset_bonus(
                            score,
                            kept_total + u32::from(card.value()),
                            context.yaniv_next_turn,
                        )
                    })
                    .sum::<f64>()
                    / context.samples.len() as f64
            };
            let uncertainty = self.params.uncertainty_weight
                * context.deck_variance.sqrt()
                * (1.0 + context.threat);
            let cost = self.heuristic_cost(context.threat, immediate, feed, jokers);
            let total = future + cost + uncertainty - bonus;
            trace!(target: "yaniv_core::ai", discard = ?option.cards(), total, "deck candidate");
            best.offer(total, discard_value, || {
                Action::from_deck(option.cards().to_vec())
            });
        }
        best.into_action()
    }

    /// Average next-turn residual and post-draw hand value over the sampled
    /// deck cards.
    fn deck_rollout(&mut self, kept: &[Card], kept_total: u32, samples: &[Card]) -> (f64, f64) {
        if samples.is_empty() {
            let future = f64::from(self.memo.residual(kept));
            return (future, f64::from(kept_total) + CardStats::FALLBACK.mean);
        }
        let mut future = 0.0;
        let mut immediate = 0.0;
        for &card in samples {
            future += f64::from(self.memo.residual(&with_card(kept, card)));
            immediate += f64::from(kept_total + u32::from(card.value()));
        }
        let count = samples.len() as f64;
        (future / count, immediate / count)
    }

    /// Plain search for the lowest hand next turn, no heuristics. The baseline
    /// sheds the heaviest discard and draws blind from the deck.
    fn minimizing_action(&mut self, hand: &[Card]) -> Option<Action> {
        let hand_total = total_value(hand);
        let baseline = self.memo.best(hand).first().cloned()?;
        let mut best_points = hand_total - baseline.value();
        let mut best_value = baseline.value();
        let mut best_action = Action::from_deck(baseline.into_cards());

        let options = self.memo.options(hand);
        let draws = self.table.draw_options.clone();
        for option in options.iter() {
            let kept = without(hand, option);
            for (index, &draw) in draws.iter().enumerate() {
                let points = self.memo.residual(&with_card(&kept, draw));
                if points < best_points || (points == best_points && option.value() > best_value) {
                    best_points = points;
                    best_value = option.value();
                    best_action = Action::from_pile(option.cards().to_vec(), index);
                }
            }
        }
        Some(best_action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::AgentParams;
    use crate::game::action::DrawChoice;
    use crate::game::observation::{RoundInfo, SeatInfo, TurnInfo};
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;

    fn agent_against(opponent_hand: usize) -> AutonomousAgent {
        let mut agent = AutonomousAgent::new("ai", AgentParams::default());
        agent.observe_round(&RoundInfo {
            seats: vec![
                SeatInfo { name: "ai".into(), score: 0, hand_count: 5 },
                SeatInfo { name: "opp".into(), score: 0, hand_count: opponent_hand },
            ],
        });
        agent
    }

    #[test]
    fn sheds_pair_of_kings() {
        let mut agent = agent_against(5);
        let hand = [
            Card::new(Rank::King, Suit::Clubs),
            Card::new(Rank::King, Suit::Hearts),
            Card::new(Rank::Two, Suit::Spades),
            Card::new(Rank::Three, Suit::Diamonds),
        ];
        let pile = [Card::new(Rank::Nine, Suit::Clubs)];
        agent.observe_table(&hand, &pile, &pile);
        let action = agent.decide_action(&hand, 0).unwrap();
        assert_eq!(action.discard.len(), 2);
        assert!(action.discard.iter().all(|card| card.rank() == Rank::King));
        assert_eq!(action.draw, DrawChoice::Deck);
    }

    #[test]
    fn takes_a_joker_from_the_pile() {
        let mut agent = agent_against(5);
        let hand = [
            Card::new(Rank::Queen, Suit::Clubs),
            Card::new(Rank::Four, Suit::Spades),
            Card::new(Rank::Five, Suit::Diamonds),
        ];
        let pile = [Card::JOKERS[0]];
        agent.observe_table(&hand, &pile, &pile);
        let action = agent.decide_action(&hand, 0).unwrap();
        assert_eq!(action.draw, DrawChoice::Pile(0));
        assert_eq!(action.discard, vec![Card::new(Rank::Queen, Suit::Clubs)]);
    }

    #[test]
    fn decisions_repeat_on_unchanged_state() {
        let mut agent = agent_against(4);
        let hand = [
            Card::new(Rank::Seven, Suit::Hearts),
            Card::new(Rank::Eight, Suit::Hearts),
            Card::new(Rank::Ten, Suit::Clubs),
            Card::new(Rank::Ace, Suit::Spades),
            Card::JOKERS[1],
        ];
        let pile = [Card::new(Rank::Six, Suit::Hearts)];
        agent.observe_table(&hand, &pile, &pile);
        let first = agent.decide_action(&hand, 12);
        let second = agent.decide_action(&hand, 12);
        assert_eq!(first, second);
    }

    #[test]
    fn reset_line_wins_when_opponent_is_close() {
        let mut agent = agent_against(5);
        let nine = Card::new(Rank::Nine, Suit::Clubs);
        // Opponent is down to three aces picked up from the pile.
        for suit in [Suit::Clubs, Suit::Diamonds, Suit::Hearts] {
            agent.observe_turn(
                &TurnInfo {
                    player: "opp".into(),
                    discarded: vec![],
                    drawn_from_pile: Some(Card::new(Rank::Ace, suit)),
                    hand_count: 3,
                    slamdown: false,
                },
                &[],
                &[],
            );
        }
        let hand = [Card::new(Rank::Four, Suit::Spades), Card::new(Rank::King, Suit::Spades)];
        let pile = [nine];
        agent.observe_table(&hand, &pile, &pile);
        // 49 + 10 discarded - 9 drawn lands on 50.
        let action = agent.decide_action(&hand, 49).unwrap();
        assert_eq!(action.draw, DrawChoice::Pile(0));
        assert_eq!(action.discard, vec![Card::new(Rank::King, Suit::Spades)]);
    }

    #[test]
    fn greedy_policy_prefers_lowest_next_hand() {
        let params = AgentParams::default().with_policy(AgentPolicy::Greedy);
        let mut agent = AutonomousAgent::new("ai", params);
        let hand = [
            Card::new(Rank::Jack, Suit::Clubs),
            Card::new(Rank::Two, Suit::Spades),
        ];
        let pile = [Card::new(Rank::Ace, Suit::Hearts)];
        agent.observe_table(&hand, &pile, &pile);
        let action = agent.decide_action(&hand, 0).unwrap();
        assert_eq!(action.discard, vec![Card::new(Rank::Jack, Suit::Clubs)]);
        assert_eq!(action.draw, DrawChoice::Pile(0));
    }

    #[test]
    fn empty_hand_has_no_action() {
        let mut agent = agent_against(5);
        assert!(agent.decide_action(&[], 0).is_none());
    }
}

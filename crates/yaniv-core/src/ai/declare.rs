use super::{AgentPolicy, AutonomousAgent, YANIV_LIMIT};
use crate::belief::{CardStats, OpponentBelief};
use crate::model::card::{Card, total_value};
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::debug;

/// Acceptable Assaf risk by own hand value, indexed 0..=5.
const RISK_THRESHOLDS: [f64; 6] = [0.60, 0.55, 0.45, 0.32, 0.20, 0.12];
const SCORE_PRESSURE: f64 = 0.35;
const MIN_THRESHOLD: f64 = 0.03;
/// Declaring alone at the table only happens with a very light hand.
const SOLO_LIMIT: u32 = 2;

/// Probability that `belief`'s opponent holds `own_value` points or fewer.
///
/// Hidden cards are modelled as a normal approximation of `unknown_count`
/// draws from the unseen distribution. Clamped to `0.01..=0.99` unless every
/// card of that hand is known.
pub fn assaf_probability(belief: &OpponentBelief, own_value: u32, stats: CardStats) -> f64 {
    let known = f64::from(belief.known_value());
    let own = f64::from(own_value);
    let unknown = belief.unknown_count();
    if unknown == 0 {
        return if known <= own { 1.0 } else { 0.0 };
    }
    let expected = known + unknown as f64 * stats.mean;
    let std_dev = (unknown as f64 * stats.variance).max(0.01).sqrt();
    let cdf = match Normal::new(expected, std_dev) {
        Ok(normal) => normal.cdf(own + 0.5),
        Err(_) => {
            if expected <= own {
                1.0
            } else {
                0.0
            }
        }
    };
    cdf.clamp(0.01, 0.99)
}

/// Highest Assaf risk worth taking with `own_value` points at `score`.
pub fn risk_threshold(own_value: u32, score: u32) -> f64 {
    let base = RISK_THRESHOLDS
        .get(own_value as usize)
        .copied()
        .unwrap_or(0.10);
    let pressure = (f64::from(score) / 100.0).clamp(0.0, 1.0);
    (base * (1.0 - SCORE_PRESSURE * pressure)).max(MIN_THRESHOLD)
}

impl AutonomousAgent {
    pub fn should_declare_yaniv(&mut self, hand: &[Card], score: u32) -> bool {
        self.take_hand(hand);
        let own = total_value(hand);
        if own > YANIV_LIMIT {
            return false;
        }
        match self.params.policy {
            AgentPolicy::Greedy => self
                .beliefs
                .opponents()
                .all(|belief| belief.estimated_score > f64::from(own)),
            AgentPolicy::Expected => {
                if self.beliefs.is_empty() {
                    return own <= SOLO_LIMIT;
                }
                let stats = CardStats::of(&self.unseen_cards());
                let safe: f64 = self
                    .beliefs
                    .opponents()
                    .map(|belief| 1.0 - assaf_probability(belief, own, stats))
                    .product();
                let risk = 1.0 - safe;
                let threshold = risk_threshold(own, score);
                debug!(
                    target: "yaniv_core::ai",
                    agent = %self.name,
                    own,
                    risk,
                    threshold,
                    "yaniv risk"
                );
                risk <= threshold
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::AgentParams;
    use crate::game::observation::{RoundInfo, SeatInfo, TurnInfo};
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;

    fn seats(names: &[&str]) -> RoundInfo {
        RoundInfo {
            seats: names
                .iter()
                .map(|name| SeatInfo {
                    name: name.to_string(),
                    score: 0,
                    hand_count: 5,
                })
                .collect(),
        }
    }

    #[test]
    fn thresholds_tighten_with_score() {
        assert!((risk_threshold(0, 0) - 0.60).abs() < 1e-9);
        assert!((risk_threshold(5, 100) - 0.12 * 0.65).abs() < 1e-9);
        assert!((risk_threshold(9, 0) - 0.10).abs() < 1e-9);
        assert!(risk_threshold(5, 500) >= MIN_THRESHOLD);
    }

    #[test]
    fn fully_known_hand_is_certain() {
        let mut belief = OpponentBelief {
            score: 0,
            hand_count: 1,
            known_cards: vec![Card::new(Rank::Two, Suit::Clubs)],
            estimated_score: 2.0,
        };
        assert_eq!(assaf_probability(&belief, 3, CardStats::FALLBACK), 1.0);
        belief.known_cards = vec![Card::new(Rank::Nine, Suit::Clubs)];
        assert_eq!(assaf_probability(&belief, 3, CardStats::FALLBACK), 0.0);
    }

    #[test]
    fn five_hidden_cards_rarely_undercut_a_small_hand() {
        let belief = OpponentBelief {
            score: 0,
            hand_count: 5,
            known_cards: Vec::new(),
            estimated_score: 30.0,
        };
        let p = assaf_probability(&belief, 1, CardStats { mean: 6.0, variance: 10.0 });
        assert_eq!(p, 0.01);
    }

    #[test]
    fn declares_a_light_hand_against_full_hands() {
        let mut agent = AutonomousAgent::new("ai", AgentParams::default());
        agent.observe_round(&seats(&["ai", "ann", "bob"]));
        let hand = [Card::new(Rank::Ace, Suit::Clubs), Card::new(Rank::Two, Suit::Clubs)];
        assert!(agent.should_declare_yaniv(&hand, 0));
    }

    #[test]
    fn refuses_above_the_limit() {
        let mut agent = AutonomousAgent::new("ai", AgentParams::default());
        agent.observe_round(&seats(&["ai", "ann"]));
        let hand = [Card::new(Rank::Six, Suit::Clubs)];
        assert!(!agent.should_declare_yaniv(&hand, 0));
    }

    #[test]
    fn holds_back_against_a_known_lighter_hand() {
        let mut agent = AutonomousAgent::new("ai", AgentParams::default());
        agent.observe_round(&seats(&["ai", "ann"]));
        agent.observe_turn(
            &TurnInfo {
                player: "ann".into(),
                discarded: vec![Card::new(Rank::King, Suit::Hearts)],
                drawn_from_pile: Some(Card::JOKERS[0]),
                hand_count: 1,
                slamdown: false,
            },
            &[],
            &[],
        );
        let hand = [Card::new(Rank::Four, Suit::Clubs)];
        assert!(!agent.should_declare_yaniv(&hand, 0));
    }

    #[test]
    fn alone_at_the_table_only_declares_very_light_hands() {
        let mut agent = AutonomousAgent::new("ai", AgentParams::default());
        agent.observe_round(&seats(&["ai"]));
        assert!(agent.should_declare_yaniv(&[Card::new(Rank::Two, Suit::Clubs)], 0));
        assert!(!agent.should_declare_yaniv(&[Card::new(Rank::Three, Suit::Clubs)], 0));
    }

    #[test]
    fn greedy_declares_when_everyone_looks_heavier() {
        let params = AgentParams::default().with_policy(AgentPolicy::Greedy);
        let mut agent = AutonomousAgent::new("ai", params);
        agent.observe_round(&seats(&["ai", "ann"]));
        assert!(agent.should_declare_yaniv(&[Card::new(Rank::Five, Suit::Clubs)], 0));
    }
}

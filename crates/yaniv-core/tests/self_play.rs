use yaniv_core::ai::{AgentParams, AgentPolicy, AutonomousAgent};
use yaniv_core::game::{Action, Game, RoundInfo, SeatInfo};
use yaniv_core::meld::{best_discard_options, discard_options};
use yaniv_core::model::card::Card;
use yaniv_core::model::player::Player;
use yaniv_core::model::rank::Rank;
use yaniv_core::model::suit::Suit;

const MAX_TURNS: usize = 2_000;

fn c(rank: Rank, suit: Suit) -> Card {
    Card::new(rank, suit)
}

fn quick(policy: AgentPolicy) -> AgentParams {
    AgentParams::default()
        .with_rollout_samples(4)
        .with_policy(policy)
}

/// Human seats shed their best option from the deck and always slam.
fn play_out(game: &mut Game) -> usize {
    let mut turns = 0;
    while !game.is_over() && turns < MAX_TURNS {
        let (player, _) = game.start_turn().unwrap();
        let name = player.name().to_string();
        let autonomous = player.is_autonomous();
        let hand = player.hand().cards().to_vec();

        if autonomous {
            if game.agent_wants_yaniv(&name).unwrap() {
                game.declare_yaniv(&name).unwrap();
            } else {
                game.play_turn(&name, None).unwrap();
            }
        } else if game.can_declare_yaniv(&name) {
            game.declare_yaniv(&name).unwrap();
        } else {
            let best = best_discard_options(&discard_options(&hand));
            let discard = best[0].cards().to_vec();
            game.play_turn(&name, Some(Action::from_deck(discard))).unwrap();
            if game.pending_slamdown().is_some() {
                game.perform_slamdown(&name).unwrap();
            }
        }
        assert!(game.is_consistent(), "cards lost after turn {turns}");
        turns += 1;
    }
    turns
}

#[test]
fn seeded_games_conserve_every_card() {
    for seed in 0..4u64 {
        let mut game = Game::with_seed(seed);
        game.add_player(Player::autonomous("v2", quick(AgentPolicy::Expected)))
            .unwrap();
        game.add_player(Player::autonomous("v1", quick(AgentPolicy::Greedy)))
            .unwrap();
        game.add_player(Player::human("human")).unwrap();
        game.start_game().unwrap();

        play_out(&mut game);
        assert!(game.is_over(), "seed {seed} did not finish");
        let winner = game.winner().unwrap();
        assert!(game.player(winner).unwrap().score() <= 100);
    }
}

#[test]
fn same_seed_plays_the_same_game() {
    let run = || {
        let mut game = Game::with_seed(42);
        game.add_player(Player::autonomous("a", quick(AgentPolicy::Expected)))
            .unwrap();
        game.add_player(Player::autonomous("b", quick(AgentPolicy::Expected)))
            .unwrap();
        game.start_game().unwrap();
        let turns = play_out(&mut game);
        (turns, game.winner().map(str::to_string), game.round())
    };
    assert_eq!(run(), run());
}

fn agent_at_table(policy: AgentPolicy, hand: &[Card], pile: &[Card]) -> AutonomousAgent {
    let mut agent = AutonomousAgent::new("bot", quick(policy));
    agent.observe_round(&RoundInfo {
        seats: ["bot", "ann", "bob"]
            .iter()
            .map(|name| SeatInfo {
                name: name.to_string(),
                score: 0,
                hand_count: 5,
            })
            .collect(),
    });
    agent.observe_table(hand, pile, pile);
    agent
}

#[test]
fn decisions_do_not_change_on_a_repeated_view() {
    let hand = [
        c(Rank::Seven, Suit::Hearts),
        c(Rank::Eight, Suit::Hearts),
        c(Rank::Nine, Suit::Hearts),
        c(Rank::Queen, Suit::Clubs),
        c(Rank::Two, Suit::Spades),
    ];
    let pile = [c(Rank::Three, Suit::Diamonds)];
    let mut agent = agent_at_table(AgentPolicy::Expected, &hand, &pile);
    let first = agent.decide_action(&hand, 20).unwrap();
    let second = agent.decide_action(&hand, 20).unwrap();
    assert_eq!(first, second);

    let mut fresh = agent_at_table(AgentPolicy::Expected, &hand, &pile);
    assert_eq!(fresh.decide_action(&hand, 20), Some(first));
}

#[test]
fn agent_declares_only_with_a_low_hand() {
    let mut agent = agent_at_table(AgentPolicy::Expected, &[Card::JOKERS[0]], &[]);
    assert!(agent.should_declare_yaniv(&[Card::JOKERS[0]], 0));

    let six = [c(Rank::Six, Suit::Clubs)];
    assert!(!agent.should_declare_yaniv(&six, 0));
}

#[test]
fn every_decision_is_a_legal_discard() {
    let hand = [
        c(Rank::Five, Suit::Spades),
        c(Rank::Five, Suit::Diamonds),
        Card::JOKERS[1],
        c(Rank::Ten, Suit::Hearts),
        c(Rank::Jack, Suit::Hearts),
    ];
    let pile = [c(Rank::Queen, Suit::Hearts)];
    for policy in [AgentPolicy::Expected, AgentPolicy::Greedy] {
        let mut agent = agent_at_table(policy, &hand, &pile);
        let action = agent.decide_action(&hand, 0).unwrap();
        let options = discard_options(&hand);
        assert!(
            options.iter().any(|option| option.matches(&action.discard)),
            "{policy:?} chose {:?}",
            action.discard
        );
    }
}

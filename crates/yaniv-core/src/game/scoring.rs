use super::rules::GameRules;
use crate::model::player::Player;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assaf {
    pub assafed: String,
    pub assafed_by: String,
}

/// Score changes caused by one Yaniv call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreUpdate {
    pub declarer: String,
    pub declarer_value: u32,
    pub assaf: Option<Assaf>,
    /// Players whose score was cut by the reset rule.
    pub reset_players: Vec<String>,
}

/// Scores a Yaniv by `players[declarer]`, then applies the reset rule against
/// `previous` scores. Hands are left untouched.
///
/// The declarer is Assaf'ed unless strictly lower than every other hand:
/// only the declarer is charged then. Otherwise everyone else adds their own
/// hand value.
pub fn settle_yaniv(
    players: &mut [Player],
    declarer: usize,
    previous: &[u32],
    rules: &GameRules,
) -> ScoreUpdate {
    let declarer_value = players[declarer].hand_value();
    let lowest = players
        .iter()
        .enumerate()
        .filter(|(index, _)| *index != declarer)
        .map(|(_, player)| (player.hand_value(), player.name()))
        .min_by_key(|(value, _)| *value);

    let assaf = match lowest {
        Some((value, name)) if declarer_value >= value => Some(Assaf {
            assafed: players[declarer].name().to_string(),
            assafed_by: name.to_string(),
        }),
        _ => None,
    };

    if assaf.is_some() {
        let player = &mut players[declarer];
        player.set_score(player.score() + rules.assaf_penalty);
    } else {
        for (index, player) in players.iter_mut().enumerate() {
            if index != declarer {
                let value = player.hand_value();
                player.set_score(player.score() + value);
            }
        }
    }

    let reset_players = apply_resets(players, previous, rules);
    ScoreUpdate {
        declarer: players[declarer].name().to_string(),
        declarer_value,
        assaf,
        reset_players,
    }
}

/// Applies the reset rule to every player. Returns the names that reset.
pub fn apply_resets(players: &mut [Player], previous: &[u32], rules: &GameRules) -> Vec<String> {
    let mut reset = Vec::new();
    for (player, &before) in players.iter_mut().zip(previous) {
        if let Some(score) = rules.reset(before, player.score()) {
            player.set_score(score);
            reset.push(player.name().to_string());
        }
    }
    reset
}

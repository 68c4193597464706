use super::rules::{GameRules, RulesError};
use super::state::{Game, Slamdown};
use crate::ai::AgentParams;
use crate::model::card::{Card, DECK_SIZE};
use crate::model::deck::Deck;
use crate::model::player::Player;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot rules: {0}")]
    Rules(#[from] RulesError),
    #[error("card {0} appears more than once")]
    DuplicateCard(Card),
    #[error("snapshot holds {found} cards, expected {expected}")]
    CardCount { found: usize, expected: usize },
    #[error("turn index {index} out of range for {players} players")]
    TurnIndex { index: usize, players: usize },
    #[error("{found} previous scores recorded for {players} players")]
    PreviousScores { found: usize, players: usize },
    #[error("last discard of {size} cards exceeds discard pile of {pile}")]
    LastDiscard { size: usize, pile: usize },
    #[error("player `{0}` appears more than once")]
    DuplicatePlayer(String),
    #[error("slamdown pending for unknown player `{0}`")]
    SlamdownPlayer(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub name: String,
    pub score: u32,
    pub hand: Vec<Card>,
    pub is_autonomous: bool,
    /// Agent tuning of an autonomous seat; defaults apply when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<AgentParams>,
}

/// Everything needed to rebuild an in-progress game. Cards are stored by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub game_id: String,
    pub discard_pile: Vec<Card>,
    /// How many cards at the end of the pile form the last discard.
    pub last_discard_size: usize,
    /// Remaining deck, top last. Rebuilt and shuffled when absent.
    #[serde(default)]
    pub deck: Option<Vec<Card>>,
    pub players: Vec<PlayerSnapshot>,
    pub current_player_index: usize,
    /// Scores at the start of the round; empty means the current scores.
    #[serde(default)]
    pub previous_scores: Vec<u32>,
    #[serde(default)]
    pub slamdown: Option<Slamdown>,
    #[serde(default)]
    pub rules: GameRules,
}

impl GameSnapshot {
    pub fn capture(game: &Game) -> Self {
        GameSnapshot {
            game_id: game.id().to_string(),
            discard_pile: game.discard_pile().to_vec(),
            last_discard_size: game.last_discard().len(),
            deck: Some(game.deck().cards().to_vec()),
            players: game
                .players()
                .iter()
                .map(|player| PlayerSnapshot {
                    name: player.name().to_string(),
                    score: player.score(),
                    hand: player.hand().cards().to_vec(),
                    is_autonomous: player.is_autonomous(),
                    params: player.agent().map(|agent| *agent.params()),
                })
                .collect(),
            current_player_index: game.current_index(),
            previous_scores: game.previous_scores().to_vec(),
            slamdown: game.pending_slamdown().cloned(),
            rules: *game.rules(),
        }
    }

    pub fn restore(self) -> Result<Game, SnapshotError> {
        self.restore_with_seed(rand::random())
    }

    /// Rebuilds the game. `seed` drives the shuffle of a missing deck and
    /// every later deal. Autonomous seats keep their stored parameters, or
    /// the defaults, and observe the restored round.
    pub fn restore_with_seed(self, seed: u64) -> Result<Game, SnapshotError> {
        self.rules.validate()?;
        self.check_cards()?;

        let players_len = self.players.len();
        if self.current_player_index >= players_len {
            return Err(SnapshotError::TurnIndex {
                index: self.current_player_index,
                players: players_len,
            });
        }
        for (at, player) in self.players.iter().enumerate() {
            if self.players[..at].iter().any(|p| p.name == player.name) {
                return Err(SnapshotError::DuplicatePlayer(player.name.clone()));
            }
        }
        if let Some(slamdown) = &self.slamdown {
            if !self.players.iter().any(|p| p.name == slamdown.player) {
                return Err(SnapshotError::SlamdownPlayer(slamdown.player.clone()));
            }
        }
        let previous_scores = match self.previous_scores.len() {
            0 => self.players.iter().map(|player| player.score).collect(),
            found if found == players_len => self.previous_scores,
            found => {
                return Err(SnapshotError::PreviousScores {
                    found,
                    players: players_len,
                });
            }
        };
        let pile = self.discard_pile.len();
        if self.last_discard_size > pile {
            return Err(SnapshotError::LastDiscard {
                size: self.last_discard_size,
                pile,
            });
        }
        let last_discard = self.discard_pile[pile - self.last_discard_size..].to_vec();

        let mut rng = StdRng::seed_from_u64(seed);
        let deck = match self.deck {
            Some(cards) => Deck::from_cards(cards),
            None => {
                let held: Vec<Card> = self
                    .discard_pile
                    .iter()
                    .chain(self.players.iter().flat_map(|player| player.hand.iter()))
                    .copied()
                    .collect();
                let mut deck =
                    Deck::from_cards(Card::universe().filter(|card| !held.contains(card)).collect());
                deck.shuffle_in_place(&mut rng);
                deck
            }
        };

        let players = self
            .players
            .into_iter()
            .map(|snapshot| {
                let mut player = if snapshot.is_autonomous {
                    Player::autonomous(snapshot.name, snapshot.params.unwrap_or_default())
                } else {
                    Player::human(snapshot.name)
                };
                for card in snapshot.hand {
                    player.hand_mut().add(card);
                }
                player.set_score(snapshot.score);
                player
            })
            .collect();

        Ok(Game::from_parts(
            self.game_id,
            self.rules,
            players,
            deck,
            self.discard_pile,
            last_discard,
            self.current_player_index,
            self.slamdown,
            previous_scores,
            rng,
        ))
    }

    /// Every card may appear once; with a stored deck all of them must.
    fn check_cards(&self) -> Result<(), SnapshotError> {
        let mut seen = [false; DECK_SIZE];
        let stored_deck = self.deck.iter().flatten();
        let all = self
            .discard_pile
            .iter()
            .chain(self.players.iter().flat_map(|player| player.hand.iter()))
            .chain(stored_deck);
        let mut found = 0;
        for card in all {
            let slot = &mut seen[usize::from(card.id())];
            if *slot {
                return Err(SnapshotError::DuplicateCard(*card));
            }
            *slot = true;
            found += 1;
        }
        if self.deck.is_some() && found != DECK_SIZE {
            return Err(SnapshotError::CardCount {
                found,
                expected: DECK_SIZE,
            });
        }
        Ok(())
    }

    pub fn to_json(game: &Game) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&Self::capture(game))
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }
}

use super::action::{Action, DrawChoice};
use super::error::{DiscardFault, DrawFault, GameError, SlamdownFault};
use super::observation::{RoundInfo, SeatInfo, TurnInfo};
use super::rules::GameRules;
use super::scoring::{self, ScoreUpdate};
use crate::meld::{MeldKind, arrange_run, find_discard};
use crate::model::card::{Card, DECK_SIZE};
use crate::model::deck::Deck;
use crate::model::player::Player;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// A drawn card the player may still slam onto their own discard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slamdown {
    pub player: String,
    pub card: Card,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EliminatedPlayer {
    pub name: String,
    pub score: u32,
}

/// Everything a Yaniv call settled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YanivOutcome {
    pub update: ScoreUpdate,
    pub eliminated: Vec<EliminatedPlayer>,
    pub winner: Option<String>,
}

/// One Yaniv table: seats, deck, discard pile and whose turn it is.
#[derive(Debug)]
pub struct Game {
    id: String,
    rules: GameRules,
    players: Vec<Player>,
    deck: Deck,
    discard_pile: Vec<Card>,
    last_discard: Vec<Card>,
    current: usize,
    slamdown: Option<Slamdown>,
    previous_scores: Vec<u32>,
    round: u32,
    winner: Option<String>,
    rng: StdRng,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            rules: GameRules::default(),
            players: Vec::new(),
            deck: Deck::default(),
            discard_pile: Vec::new(),
            last_discard: Vec::new(),
            current: 0,
            slamdown: None,
            previous_scores: Vec::new(),
            round: 0,
            winner: None,
            rng,
        }
    }

    pub fn with_rules(mut self, rules: GameRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn add_player(&mut self, player: Player) -> Result<(), GameError> {
        if self.index_of(player.name()).is_some() {
            return Err(GameError::DuplicatePlayer(player.name().to_string()));
        }
        self.previous_scores.push(player.score());
        self.players.push(player);
        Ok(())
    }

    /// Seats a restored table as-is. Card conservation is the caller's duty.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        id: String,
        rules: GameRules,
        players: Vec<Player>,
        deck: Deck,
        discard_pile: Vec<Card>,
        last_discard: Vec<Card>,
        current: usize,
        slamdown: Option<Slamdown>,
        previous_scores: Vec<u32>,
        rng: StdRng,
    ) -> Self {
        let mut game = Self::with_rng(rng);
        game.id = id;
        game.rules = rules;
        game.players = players;
        game.deck = deck;
        game.discard_pile = discard_pile;
        game.last_discard = last_discard;
        game.current = current;
        game.slamdown = slamdown;
        game.previous_scores = previous_scores;
        game.round = 1;
        game.winner = match game.players.len() {
            1 => game.players.first().map(|player| player.name().to_string()),
            _ => None,
        };
        game.notify_round();
        game
    }

    /// Picks a random first player and deals the first round.
    pub fn start_game(&mut self) -> Result<(), GameError> {
        if self.players.is_empty() {
            return Err(GameError::NoPlayers);
        }
        let hand_size = self.rules.hand_size;
        if self.players.len() * hand_size + 1 > DECK_SIZE {
            return Err(GameError::NotEnoughCards {
                players: self.players.len(),
                hand_size,
            });
        }
        self.previous_scores = self.players.iter().map(Player::score).collect();
        self.current = self.rng.gen_range(0..self.players.len());
        self.winner = None;
        self.round = 0;
        self.deal_round()
    }

    fn deal_round(&mut self) -> Result<(), GameError> {
        self.deck = Deck::shuffled(&mut self.rng);
        self.discard_pile.clear();
        self.last_discard.clear();
        self.slamdown = None;
        let shortage = GameError::NotEnoughCards {
            players: self.players.len(),
            hand_size: self.rules.hand_size,
        };
        for player in &mut self.players {
            player.hand_mut().clear();
            for _ in 0..self.rules.hand_size {
                let card = self.deck.draw().ok_or_else(|| shortage.clone())?;
                player.hand_mut().add(card);
            }
        }
        let opening = self.deck.draw().ok_or(GameError::InvalidDraw(DrawFault::DeckExhausted))?;
        self.discard_pile.push(opening);
        self.last_discard.push(opening);
        self.round += 1;
        info!(
            target: "yaniv_core::game",
            game = %self.id,
            round = self.round,
            players = self.players.len(),
            opening = %opening,
            "dealt round"
        );
        self.notify_round();
        Ok(())
    }

    /// Resets every agent for the round and shows it the opening pile.
    fn notify_round(&mut self) {
        let round = self.round_info();
        let options = self.draw_options();
        for player in &mut self.players {
            let hand = player.hand().cards().to_vec();
            if let Some(agent) = player.agent_mut() {
                agent.observe_round(&round);
                agent.observe_table(&hand, &self.discard_pile, &options);
            }
        }
    }

    pub fn round_info(&self) -> RoundInfo {
        RoundInfo {
            seats: self
                .players
                .iter()
                .map(|player| SeatInfo {
                    name: player.name().to_string(),
                    score: player.score(),
                    hand_count: player.hand().len(),
                })
                .collect(),
        }
    }

    /// Opens the current player's turn: sorts their hand, closes any slamdown
    /// window and returns the player with the cards they may take from the
    /// pile.
    pub fn start_turn(&mut self) -> Result<(&Player, Vec<Card>), GameError> {
        self.ensure_running()?;
        self.slamdown = None;
        let options = self.draw_options();
        let player = &mut self.players[self.current];
        player.hand_mut().sort();
        let hand = player.hand().cards().to_vec();
        if let Some(agent) = player.agent_mut() {
            agent.observe_table(&hand, &self.discard_pile, &options);
        }
        Ok((&self.players[self.current], options))
    }

    /// Cards that may be drawn from the pile: both ends of a run, otherwise
    /// every card of the last discard.
    pub fn draw_options(&self) -> Vec<Card> {
        match arrange_run(&self.last_discard) {
            Some(run) => run.endpoints().to_vec(),
            None => self.last_discard.clone(),
        }
    }

    /// Plays a full turn for `name`: draw, then discard. Autonomous players
    /// may pass `None` to let their agent choose. Nothing changes on error.
    pub fn play_turn(&mut self, name: &str, action: Option<Action>) -> Result<Action, GameError> {
        self.ensure_running()?;
        let index = self.require_turn(name)?;
        let action = match action {
            Some(action) => action,
            None if self.players[index].is_autonomous() => self.players[index]
                .decide_action()
                .ok_or(GameError::InvalidDiscard(DiscardFault::Empty))?,
            None => return Err(GameError::MissingAction(name.to_string())),
        };

        let options = self.draw_options();
        let pile_card = match action.draw {
            DrawChoice::Deck => {
                if self.deck.is_empty() && self.discard_pile.len() <= self.last_discard.len() {
                    return Err(GameError::InvalidDraw(DrawFault::DeckExhausted));
                }
                None
            }
            DrawChoice::Pile(choice) => match options.get(choice) {
                Some(card) => Some(*card),
                None => {
                    return Err(GameError::InvalidDraw(DrawFault::OutOfRange {
                        index: choice,
                        available: options.len(),
                    }));
                }
            },
        };
        let discard = self.validate_discard(index, &action.discard, pile_card)?;

        self.slamdown = None;
        let drawn = match pile_card {
            Some(card) => {
                if let Some(position) = self.discard_pile.iter().rposition(|c| *c == card) {
                    self.discard_pile.remove(position);
                }
                card
            }
            None => self.draw_from_deck()?,
        };
        let player = &mut self.players[index];
        player.hand_mut().add(drawn);
        for card in discard.cards() {
            player.hand_mut().remove(*card);
        }
        self.discard_pile.extend_from_slice(discard.cards());
        self.last_discard = discard.cards().to_vec();

        if pile_card.is_none() {
            self.open_slamdown(index, discard.kind(), drawn);
        }

        let applied = Action::new(discard.into_cards(), action.draw);
        let turn = TurnInfo {
            player: name.to_string(),
            discarded: applied.discard.clone(),
            drawn_from_pile: pile_card,
            hand_count: self.players[index].hand().len(),
            slamdown: false,
        };
        debug!(
            target: "yaniv_core::game",
            game = %self.id,
            player = name,
            discard = ?applied.discard,
            draw = ?applied.draw,
            "turn played"
        );
        self.notify_turn(index, &turn);
        self.current = (self.current + 1) % self.players.len();
        Ok(applied)
    }

    fn validate_discard(
        &self,
        index: usize,
        cards: &[Card],
        pile_card: Option<Card>,
    ) -> Result<crate::meld::DiscardOption, GameError> {
        if cards.is_empty() {
            return Err(GameError::InvalidDiscard(DiscardFault::Empty));
        }
        let mut available = self.players[index].hand().cards().to_vec();
        available.extend(pile_card);
        let held = cards
            .iter()
            .enumerate()
            .all(|(at, card)| available.contains(card) && !cards[..at].contains(card));
        if !held {
            return Err(GameError::InvalidDiscard(DiscardFault::NotInHand));
        }
        find_discard(&available, cards).ok_or(GameError::InvalidDiscard(DiscardFault::NotAMeld))
    }

    /// Takes the top of the deck, first turning the discard pile (minus the
    /// last discard) into a fresh deck when it has run out.
    fn draw_from_deck(&mut self) -> Result<Card, GameError> {
        if self.deck.is_empty() {
            let mut recycled = std::mem::take(&mut self.discard_pile);
            recycled.retain(|card| !self.last_discard.contains(card));
            let mut deck = Deck::from_cards(recycled);
            deck.shuffle_in_place(&mut self.rng);
            debug!(
                target: "yaniv_core::game",
                game = %self.id,
                cards = deck.len(),
                "reshuffled discard pile into deck"
            );
            self.deck = deck;
            self.discard_pile = self.last_discard.clone();
        }
        self.deck
            .draw()
            .ok_or(GameError::InvalidDraw(DrawFault::DeckExhausted))
    }

    fn open_slamdown(&mut self, index: usize, kind: MeldKind, drawn: Card) {
        let player = &self.players[index];
        if player.is_autonomous() || player.hand().len() <= 1 {
            return;
        }
        let eligible = match kind {
            MeldKind::Single | MeldKind::Set => self
                .last_discard
                .iter()
                .find(|card| !card.is_joker())
                .is_some_and(|card| !drawn.is_joker() && card.rank() == drawn.rank()),
            MeldKind::Run => {
                arrange_run(&self.last_discard).is_some_and(|run| run.extends_with(drawn))
            }
        };
        if eligible {
            self.slamdown = Some(Slamdown {
                player: player.name().to_string(),
                card: drawn,
            });
        }
    }

    fn notify_turn(&mut self, actor: usize, turn: &TurnInfo) {
        let options = self.draw_options();
        for (index, player) in self.players.iter_mut().enumerate() {
            if index == actor {
                continue;
            }
            if let Some(agent) = player.agent_mut() {
                agent.observe_turn(turn, &self.discard_pile, &options);
            }
        }
    }

    /// Moves the pending slamdown card from `name`'s hand onto their discard.
    pub fn perform_slamdown(&mut self, name: &str) -> Result<Card, GameError> {
        let card = match &self.slamdown {
            Some(pending) if pending.player == name => pending.card,
            _ => return Err(GameError::IllegalSlamdown(SlamdownFault::NotPending)),
        };
        let index = self.require_player(name)?;
        let hand = self.players[index].hand();
        if !hand.contains(card) {
            return Err(GameError::IllegalSlamdown(SlamdownFault::CardNotInHand));
        }
        if hand.len() <= 1 {
            return Err(GameError::IllegalSlamdown(SlamdownFault::LastCard));
        }

        self.players[index].hand_mut().remove(card);
        self.discard_pile.push(card);
        self.last_discard.push(card);
        self.slamdown = None;

        let turn = TurnInfo {
            player: name.to_string(),
            discarded: vec![card],
            drawn_from_pile: None,
            hand_count: self.players[index].hand().len(),
            slamdown: true,
        };
        debug!(target: "yaniv_core::game", game = %self.id, player = name, card = %card, "slamdown");
        self.notify_turn(index, &turn);
        Ok(card)
    }

    /// Whether `name` is to move and holds a hand at or under the limit.
    pub fn can_declare_yaniv(&self, name: &str) -> bool {
        self.winner.is_none()
            && self.index_of(name) == Some(self.current)
            && self.players[self.current].hand_value() <= self.rules.yaniv_limit
    }

    /// Asks an autonomous seat whether it calls Yaniv now. Human seats and
    /// hands over the limit always answer no.
    pub fn agent_wants_yaniv(&mut self, name: &str) -> Result<bool, GameError> {
        self.ensure_running()?;
        let index = self.require_player(name)?;
        if !self.can_declare_yaniv(name) {
            return Ok(false);
        }
        Ok(self.players[index].should_declare_yaniv().unwrap_or(false))
    }

    /// Ends the round on `name`'s call: scores it, removes players over the
    /// elimination score and deals again unless a winner is left.
    pub fn declare_yaniv(&mut self, name: &str) -> Result<YanivOutcome, GameError> {
        self.ensure_running()?;
        let index = self.require_turn(name)?;
        let value = self.players[index].hand_value();
        if value > self.rules.yaniv_limit {
            return Err(GameError::IllegalYaniv {
                value,
                limit: self.rules.yaniv_limit,
            });
        }

        self.slamdown = None;
        self.previous_scores = self.players.iter().map(Player::score).collect();
        let update =
            scoring::settle_yaniv(&mut self.players, index, &self.previous_scores, &self.rules);

        let limit = self.rules.elimination_score;
        let mut eliminated = Vec::new();
        let mut kept_previous = Vec::with_capacity(self.players.len());
        let mut kept = Vec::with_capacity(self.players.len());
        for (player, previous) in self.players.drain(..).zip(self.previous_scores.drain(..)) {
            if player.score() > limit {
                eliminated.push(EliminatedPlayer {
                    name: player.name().to_string(),
                    score: player.score(),
                });
            } else {
                kept.push(player);
                kept_previous.push(previous);
            }
        }
        self.players = kept;
        self.previous_scores = kept_previous;
        if !self.players.is_empty() {
            self.current %= self.players.len();
        }

        let winner = match self.players.as_slice() {
            [last] => Some(last.name().to_string()),
            _ => None,
        };
        info!(
            target: "yaniv_core::game",
            game = %self.id,
            declarer = name,
            value,
            assaf = update.assaf.is_some(),
            resets = update.reset_players.len(),
            eliminated = eliminated.len(),
            winner = winner.as_deref().unwrap_or("-"),
            "yaniv settled"
        );
        match &winner {
            Some(name) => self.winner = Some(name.clone()),
            None => self.deal_round()?,
        }
        Ok(YanivOutcome {
            update,
            eliminated,
            winner,
        })
    }

    fn ensure_running(&self) -> Result<(), GameError> {
        if self.winner.is_some() {
            return Err(GameError::GameOver);
        }
        if self.players.is_empty() {
            return Err(GameError::NoPlayers);
        }
        Ok(())
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.players.iter().position(|player| player.name() == name)
    }

    fn require_player(&self, name: &str) -> Result<usize, GameError> {
        self.index_of(name)
            .ok_or_else(|| GameError::UnknownPlayer(name.to_string()))
    }

    fn require_turn(&self, name: &str) -> Result<usize, GameError> {
        let index = self.require_player(name)?;
        if index != self.current {
            return Err(GameError::OutOfTurn {
                expected: self.players[self.current].name().to_string(),
                found: name.to_string(),
            });
        }
        Ok(index)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|player| player.name() == name)
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.current)
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn deck_len(&self) -> usize {
        self.deck.len()
    }

    pub fn discard_pile(&self) -> &[Card] {
        &self.discard_pile
    }

    pub fn last_discard(&self) -> &[Card] {
        &self.last_discard
    }

    pub fn pending_slamdown(&self) -> Option<&Slamdown> {
        self.slamdown.as_ref()
    }

    pub fn previous_scores(&self) -> &[u32] {
        &self.previous_scores
    }

    /// Rounds dealt so far.
    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn winner(&self) -> Option<&str> {
        self.winner.as_deref()
    }

    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    /// Whether deck, hands and discard pile hold every card exactly once.
    pub fn is_consistent(&self) -> bool {
        let mut seen = [0u8; DECK_SIZE];
        let all = self
            .deck
            .cards()
            .iter()
            .chain(self.discard_pile.iter())
            .chain(self.players.iter().flat_map(|player| player.hand().iter()));
        for card in all {
            seen[usize::from(card.id())] += 1;
        }
        seen.iter().all(|count| *count == 1)
    }
}

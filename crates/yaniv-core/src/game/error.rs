use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DiscardFault {
    #[error("no cards were discarded")]
    Empty,
    #[error("a discarded card is not in hand")]
    NotInHand,
    #[error("cards must form a single, a set, or a run")]
    NotAMeld,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DrawFault {
    #[error("draw option {index} requested but only {available} offered")]
    OutOfRange { index: usize, available: usize },
    #[error("deck and discard pile are both exhausted")]
    DeckExhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SlamdownFault {
    #[error("no slamdown is pending for this player")]
    NotPending,
    #[error("slamdown card is no longer in hand")]
    CardNotInHand,
    #[error("the last card in hand cannot be slammed")]
    LastCard,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("no players registered")]
    NoPlayers,
    #[error("player '{0}' is already seated")]
    DuplicatePlayer(String),
    #[error("{players} players cannot each be dealt {hand_size} cards")]
    NotEnoughCards { players: usize, hand_size: usize },
    #[error("unknown player '{0}'")]
    UnknownPlayer(String),
    #[error("it is {expected}'s turn, not {found}'s")]
    OutOfTurn { expected: String, found: String },
    #[error("{0} must submit an action")]
    MissingAction(String),
    #[error("invalid discard: {0}")]
    InvalidDiscard(DiscardFault),
    #[error("invalid draw: {0}")]
    InvalidDraw(DrawFault),
    #[error("cannot declare Yaniv holding {value} points (limit {limit})")]
    IllegalYaniv { value: u32, limit: u32 },
    #[error("illegal slamdown: {0}")]
    IllegalSlamdown(SlamdownFault),
    #[error("the game is over")]
    GameOver,
}

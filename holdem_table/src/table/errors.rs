//! Table error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::entities::{Chips, PlayerId};

/// Result type for table operations
pub type TableResult<T> = Result<T, TableError>;

/// Rejections returned to the caller. A rejected action leaves the table
/// untouched.
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum TableError {
    /// Acting seat is not the current player
    #[error("not your turn")]
    NotYourTurn,

    /// Payment exceeds the player's stack
    #[error("insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds { requested: Chips, available: Chips },

    /// Bet below the current max bet and not all-in
    #[error("bet of {amount} is below the current bet of {max_bet}")]
    BetTooLow { amount: Chips, max_bet: Chips },

    /// Call attempted with nothing owed
    #[error("nothing to call")]
    NothingToCall,

    /// Join or start attempted while a hand is running
    #[error("game already started")]
    GameAlreadyStarted,

    /// Every seat is taken
    #[error("table is full")]
    TableFull,

    /// Not enough players to deal a hand
    #[error("need at least {min_players} players")]
    TooFewPlayers { min_players: usize },

    /// Action attempted with no hand in progress
    #[error("no hand in progress")]
    HandNotInProgress,

    /// Unknown player
    #[error("player {0} is not at this table")]
    PlayerNotFound(PlayerId),

    /// Zero-chip bet or buy-in
    #[error("invalid amount: {0}")]
    InvalidAmount(Chips),

    /// Table was torn down
    #[error("table is closed")]
    TableClosed,
}

/// Table configuration errors
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ConfigError {
    /// Blind structure is unusable
    #[error("invalid blinds: {0}")]
    Blinds(String),

    /// Seat limits are out of range
    #[error("invalid seat limits: {0}")]
    Seats(String),

    /// Delays are inconsistent
    #[error("invalid delays: {0}")]
    Delays(String),

    /// Environment variable could not be parsed
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

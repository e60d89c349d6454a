//! Table configuration models.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::errors::ConfigError;
use crate::game::entities::{Blinds, Chips};

/// Largest table a single deck can serve: 2 hole cards per seat, 5 board
/// cards and 3 burns.
pub const MAX_PLAYERS: usize = 22;

/// Table configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Table name
    pub name: String,

    /// Small blind amount
    pub small_blind: Chips,

    /// Big blind amount
    pub big_blind: Chips,

    /// Players needed before a hand can be dealt
    pub min_players: usize,

    /// Maximum number of seats
    pub max_players: usize,

    /// Pause between the last action of a hand and the payout
    pub end_game_delay_ms: u64,

    /// Pause between the last action of a hand and the next deal
    pub next_game_delay_ms: u64,

    /// Fixed RNG seed for reproducible shuffles
    pub seed: Option<u64>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            name: "Default Table".to_string(),
            small_blind: 10,
            big_blind: 20,
            min_players: 2,
            max_players: 8,
            end_game_delay_ms: 2_000,
            next_game_delay_ms: 5_000,
            seed: None,
        }
    }
}

impl TableConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.small_blind == 0 {
            return Err(ConfigError::Blinds(
                "small blind must be greater than 0".to_string(),
            ));
        }

        if self.big_blind <= self.small_blind {
            return Err(ConfigError::Blinds(
                "big blind must be greater than small blind".to_string(),
            ));
        }

        if self.min_players < 2 || self.min_players > self.max_players {
            return Err(ConfigError::Seats(format!(
                "min players must be between 2 and max players ({})",
                self.max_players
            )));
        }

        if self.max_players > MAX_PLAYERS {
            return Err(ConfigError::Seats(format!(
                "max players must be at most {MAX_PLAYERS}"
            )));
        }

        if self.next_game_delay_ms < self.end_game_delay_ms {
            return Err(ConfigError::Delays(
                "next game delay must not be shorter than end game delay".to_string(),
            ));
        }

        Ok(())
    }

    #[must_use]
    pub fn blinds(&self) -> Blinds {
        Blinds {
            small: self.small_blind,
            big: self.big_blind,
        }
    }

    #[must_use]
    pub fn end_game_delay(&self) -> Duration {
        Duration::from_millis(self.end_game_delay_ms)
    }

    #[must_use]
    pub fn next_game_delay(&self) -> Duration {
        Duration::from_millis(self.next_game_delay_ms)
    }
}

//! Simulator configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use holdem_table::{Chips, ConfigError, TableConfig, table::MAX_PLAYERS};

/// Complete simulator configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Table defaults configuration
    pub table_defaults: TableDefaultsConfig,
    /// Number of tables to run
    pub num_tables: usize,
    /// Bots seated at each table
    pub players_per_table: usize,
    /// Starting stack of every bot
    pub starting_chips: Chips,
    /// Hands to play per table before closing it
    pub hands_per_table: u64,
    /// Base RNG seed; each table and bot derives its own from it
    pub seed: Option<u64>,
}

/// Default table configuration
#[derive(Debug, Clone)]
pub struct TableDefaultsConfig {
    /// Minimum players to deal a hand
    pub min_players: usize,
    /// Maximum players per table
    pub max_players: usize,
    /// Small blind amount
    pub small_blind: Chips,
    /// Big blind amount
    pub big_blind: Chips,
    /// Pause before the payout, in milliseconds
    pub end_game_delay_ms: u64,
    /// Pause before the next deal, in milliseconds
    pub next_game_delay_ms: u64,
}

/// Values given on the command line win over the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub num_tables: Option<usize>,
    pub players_per_table: Option<usize>,
    pub starting_chips: Option<Chips>,
    pub hands_per_table: Option<u64>,
    pub seed: Option<u64>,
}

impl SimConfig {
    /// Load configuration from environment variables
    pub fn from_env(overrides: Overrides) -> Self {
        let table_defaults = TableDefaultsConfig {
            min_players: parse_env_or("TABLE_MIN_PLAYERS", 2),
            max_players: parse_env_or("TABLE_MAX_PLAYERS", 9),
            small_blind: parse_env_or("TABLE_SMALL_BLIND", 10),
            big_blind: parse_env_or("TABLE_BIG_BLIND", 20),
            end_game_delay_ms: parse_env_or("END_GAME_DELAY_MS", 200),
            next_game_delay_ms: parse_env_or("NEXT_GAME_DELAY_MS", 500),
        };

        Self {
            table_defaults,
            num_tables: overrides
                .num_tables
                .unwrap_or_else(|| parse_env_or("SIM_TABLES", 1)),
            players_per_table: overrides
                .players_per_table
                .unwrap_or_else(|| parse_env_or("SIM_PLAYERS", 6)),
            starting_chips: overrides
                .starting_chips
                .unwrap_or_else(|| parse_env_or("PLAYER_CHIPS", 1_000)),
            hands_per_table: overrides
                .hands_per_table
                .unwrap_or_else(|| parse_env_or("SIM_HANDS", 50)),
            seed: overrides
                .seed
                .or_else(|| std::env::var("SIM_SEED").ok().and_then(|v| v.parse().ok())),
        }
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        let defaults = &self.table_defaults;

        if defaults.small_blind == 0 {
            return Err(ConfigError::Invalid {
                var: "TABLE_SMALL_BLIND".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if defaults.big_blind <= defaults.small_blind {
            return Err(ConfigError::Invalid {
                var: "TABLE_BIG_BLIND".to_string(),
                reason: format!("Must be greater than small blind ({})", defaults.small_blind),
            });
        }

        if defaults.max_players > MAX_PLAYERS {
            return Err(ConfigError::Invalid {
                var: "TABLE_MAX_PLAYERS".to_string(),
                reason: format!("Must be at most {MAX_PLAYERS} (one 52-card deck)"),
            });
        }

        if self.players_per_table < defaults.min_players
            || self.players_per_table > defaults.max_players
        {
            return Err(ConfigError::Invalid {
                var: "SIM_PLAYERS".to_string(),
                reason: format!(
                    "Must be between {} and {}",
                    defaults.min_players, defaults.max_players
                ),
            });
        }

        if self.starting_chips <= defaults.big_blind {
            return Err(ConfigError::Invalid {
                var: "PLAYER_CHIPS".to_string(),
                reason: format!("Must cover the big blind ({})", defaults.big_blind),
            });
        }

        if self.num_tables == 0 {
            return Err(ConfigError::Invalid {
                var: "SIM_TABLES".to_string(),
                reason: "Must be at least 1".to_string(),
            });
        }

        Ok(())
    }

    /// Table configuration for the `index`-th table.
    pub fn table_config(&self, index: usize) -> TableConfig {
        let defaults = &self.table_defaults;
        TableConfig {
            name: format!("Table {}", index + 1),
            small_blind: defaults.small_blind,
            big_blind: defaults.big_blind,
            min_players: defaults.min_players,
            max_players: defaults.max_players,
            end_game_delay_ms: defaults.end_game_delay_ms,
            next_game_delay_ms: defaults.next_game_delay_ms,
            seed: self.seed.map(|seed| seed.wrapping_add(index as u64)),
        }
    }
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

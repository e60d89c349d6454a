//! # Hold'em Table
//!
//! A multiplayer Texas Hold'em table engine.
//!
//! Each table seats players, deals hands, enforces turn order and betting
//! rules, splits the money into side pots when players go all-in for
//! different amounts, and pays out at showdown. Tables publish every state
//! change as a [`Command`] for a transport layer to forward, and run on
//! their own Tokio task behind a [`TableHandle`].
//!
//! ## Core Modules
//!
//! - [`game`]: cards, bets, hand ranking, seats and per-hand state
//! - [`table`]: the table state machine, its actor and the table manager
//!
//! ## Example
//!
//! ```
//! use holdem_table::{Table, TableConfig, TableState};
//!
//! let mut table = Table::new(TableConfig::default()).unwrap();
//! let alice = table.add_player("alice", 1_000).unwrap();
//! let bob = table.add_player("bob", 1_000).unwrap();
//!
//! table.new_game().unwrap();
//! assert_eq!(table.state(), TableState::Started);
//!
//! // Heads-up the dealer posts the small blind and acts first.
//! let first = table.current_player().unwrap();
//! table.fold(first).unwrap();
//! assert_eq!(table.state(), TableState::Ended);
//! # let _ = (alice, bob);
//! ```

/// Core game primitives: cards, bets, hands and seats.
pub mod game;

/// Table state machine, actor and manager.
pub mod table;

pub use game::{
    Bet, BetKind, Card, Chips, HandEvaluator, HandStrength, PlayerId, RoundType, SidePot,
    StandardEvaluator,
};
pub use table::{
    Command, ConfigError, PotKind, Table, TableActor, TableConfig, TableError, TableHandle,
    TableManager, TableResult, TableState, TimerEvent, Winner,
};

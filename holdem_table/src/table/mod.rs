//! Table module: the per-table state machine and its async actor.
//!
//! This module implements:
//! - [`Table`]: synchronous betting engine with side pots and showdown
//! - [`TableActor`]: owns one table on its own Tokio task
//! - [`TableManager`]: spawns, lists and closes table actors
//!
//! ## Architecture
//!
//! A `Table` never blocks and never sleeps. Each accepted action queues
//! [`Command`]s for subscribers and, at the end of a hand, asks for delayed
//! [`TimerEvent`]s. The actor drains both after every message: commands go
//! to subscribers, timer requests go into a [`TimerRegistry`] that dies
//! with the actor.
//!
//! ## Example
//!
//! ```no_run
//! use holdem_table::table::{TableConfig, TableManager};
//!
//! #[tokio::main]
//! async fn main() {
//!     let manager = TableManager::new();
//!     let table_id = manager.create_table(TableConfig::default()).await.unwrap();
//!     let table = manager.get_table(table_id).await.unwrap();
//!
//!     let alice = table.add_player("alice", 1_000).await.unwrap();
//!     let _bob = table.add_player("bob", 1_000).await.unwrap();
//!     let mut commands = table.subscribe(Some(alice)).await.unwrap();
//!
//!     table.new_game().await.unwrap();
//!     while let Some(command) = commands.recv().await {
//!         println!("{command:?}");
//!     }
//! }
//! ```

pub mod actor;
pub mod commands;
pub mod config;
pub mod engine;
pub mod errors;
pub mod manager;
pub mod messages;
mod showdown;
mod side_pots;
pub mod timers;

pub use actor::{TableActor, TableHandle};
pub use commands::{Command, PotKind, Winner};
pub use config::{MAX_PLAYERS, TableConfig};
pub use engine::{Table, TableSnapshot, TableState};
pub use errors::{ConfigError, TableError, TableResult};
pub use manager::{TableManager, TableMetadata};
pub use messages::{TableId, TableMessage};
pub use timers::{ScheduledEvent, TimerEvent, TimerRegistry};

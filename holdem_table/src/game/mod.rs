//! Poker game primitives.
//!
//! This module provides:
//! - Cards, decks, bets and betting rounds ([`entities`])
//! - Hand ranking behind the [`HandEvaluator`] trait ([`hand`])
//! - Seats and what others may see of them ([`player`])
//! - Per-hand bookkeeping: board, pots and the round ledger ([`state`])

pub mod entities;
pub mod hand;
pub mod player;
pub mod state;

pub use entities::{
    Bet, BetKind, Blinds, Card, Chips, Deck, PlayerId, Round, RoundType, SeatIndex, SidePot, Suit,
    Value,
};
pub use hand::{HandCategory, HandEvaluator, HandStrength, StandardEvaluator};
pub use player::{Player, PlayerView};
pub use state::Game;

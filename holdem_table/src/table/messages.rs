//! Table actor message types.

use tokio::sync::{mpsc, oneshot};

use super::{
    commands::Command,
    engine::TableSnapshot,
    errors::TableResult,
};
use crate::game::entities::{Chips, PlayerId};

/// Table identifier within a [`TableManager`](super::TableManager)
pub type TableId = u64;

/// Messages that can be sent to a TableActor
#[derive(Debug)]
pub enum TableMessage {
    /// Seat a new player
    AddPlayer {
        name: String,
        chips: Chips,
        response: oneshot::Sender<TableResult<PlayerId>>,
    },

    /// Deal a hand
    NewGame {
        response: oneshot::Sender<TableResult<()>>,
    },

    /// Put `amount` more chips in
    Bet {
        player_id: PlayerId,
        amount: Chips,
        response: oneshot::Sender<TableResult<()>>,
    },

    Call {
        player_id: PlayerId,
        response: oneshot::Sender<TableResult<()>>,
    },

    Check {
        player_id: PlayerId,
        response: oneshot::Sender<TableResult<()>>,
    },

    Fold {
        player_id: PlayerId,
        response: oneshot::Sender<TableResult<()>>,
    },

    /// Transport lost the player's connection
    Disconnected {
        player_id: PlayerId,
        response: oneshot::Sender<TableResult<()>>,
    },

    /// Transport got the player's connection back
    Reconnected {
        player_id: PlayerId,
        response: oneshot::Sender<TableResult<()>>,
    },

    /// Get current table state
    GetState {
        response: oneshot::Sender<TableSnapshot>,
    },

    /// Receive every public command, plus private ones addressed to
    /// `player_id`
    Subscribe {
        player_id: Option<PlayerId>,
        sender: mpsc::Sender<Command>,
    },

    /// Tear the table down
    Close {
        response: oneshot::Sender<TableResult<()>>,
    },
}

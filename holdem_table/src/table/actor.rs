//! Table actor implementation with async message handling.
//!
//! Each table runs on its own task. Every operation arrives through the
//! inbox, so the [`Table`] is only ever touched by one task, and the
//! delayed end-of-hand transitions are driven from the same loop.

use std::collections::HashMap;
use tokio::{
    sync::{mpsc, oneshot},
    time::{Instant, sleep_until},
};

use super::{
    commands::Command,
    engine::{Table, TableSnapshot},
    errors::{TableError, TableResult},
    messages::{TableId, TableMessage},
    timers::TimerRegistry,
};
use crate::game::entities::{Chips, PlayerId};

/// Capacity of each subscriber's command channel
pub const SUBSCRIBER_BUFFER: usize = 256;

/// Table actor handle for sending messages
#[derive(Clone, Debug)]
pub struct TableHandle {
    sender: mpsc::Sender<TableMessage>,
    table_id: TableId,
}

impl TableHandle {
    /// Create a new table handle
    pub fn new(sender: mpsc::Sender<TableMessage>, table_id: TableId) -> Self {
        Self { sender, table_id }
    }

    /// Get table ID
    pub fn table_id(&self) -> TableId {
        self.table_id
    }

    /// Send a message to the table
    pub async fn send(&self, message: TableMessage) -> TableResult<()> {
        self.sender
            .send(message)
            .await
            .map_err(|_| TableError::TableClosed)
    }

    async fn request<T>(
        &self,
        message: impl FnOnce(oneshot::Sender<T>) -> TableMessage,
    ) -> TableResult<T> {
        let (tx, rx) = oneshot::channel();
        self.send(message(tx)).await?;
        rx.await.map_err(|_| TableError::TableClosed)
    }

    pub async fn add_player(&self, name: &str, chips: Chips) -> TableResult<PlayerId> {
        let name = name.to_string();
        self.request(|response| TableMessage::AddPlayer {
            name,
            chips,
            response,
        })
        .await?
    }

    pub async fn new_game(&self) -> TableResult<()> {
        self.request(|response| TableMessage::NewGame { response })
            .await?
    }

    pub async fn bet(&self, player_id: PlayerId, amount: Chips) -> TableResult<()> {
        self.request(|response| TableMessage::Bet {
            player_id,
            amount,
            response,
        })
        .await?
    }

    pub async fn call(&self, player_id: PlayerId) -> TableResult<()> {
        self.request(|response| TableMessage::Call {
            player_id,
            response,
        })
        .await?
    }

    pub async fn check(&self, player_id: PlayerId) -> TableResult<()> {
        self.request(|response| TableMessage::Check {
            player_id,
            response,
        })
        .await?
    }

    pub async fn fold(&self, player_id: PlayerId) -> TableResult<()> {
        self.request(|response| TableMessage::Fold {
            player_id,
            response,
        })
        .await?
    }

    pub async fn mark_disconnected(&self, player_id: PlayerId) -> TableResult<()> {
        self.request(|response| TableMessage::Disconnected {
            player_id,
            response,
        })
        .await?
    }

    pub async fn mark_reconnected(&self, player_id: PlayerId) -> TableResult<()> {
        self.request(|response| TableMessage::Reconnected {
            player_id,
            response,
        })
        .await?
    }

    pub async fn state(&self) -> TableResult<TableSnapshot> {
        self.request(|response| TableMessage::GetState { response })
            .await
    }

    /// Stream of commands from now on. Pass the player's id to also get
    /// their private hole cards; observers pass `None`.
    pub async fn subscribe(
        &self,
        player_id: Option<PlayerId>,
    ) -> TableResult<mpsc::Receiver<Command>> {
        let (sender, receiver) = mpsc::channel(SUBSCRIBER_BUFFER);
        self.send(TableMessage::Subscribe { player_id, sender }).await?;
        Ok(receiver)
    }

    pub async fn close(&self) -> TableResult<()> {
        self.request(|response| TableMessage::Close { response })
            .await?
    }
}

struct Subscriber {
    player_id: Option<PlayerId>,
    sender: mpsc::Sender<Command>,
}

/// Table actor managing a single table
pub struct TableActor {
    /// Table ID
    id: TableId,

    table: Table,

    /// Message inbox
    inbox: mpsc::Receiver<TableMessage>,

    /// Pending end-of-hand transitions
    timers: TimerRegistry,

    /// Command subscribers keyed by subscription order
    subscribers: HashMap<u64, Subscriber>,

    next_subscriber: u64,

    /// Is table closed
    is_closed: bool,
}

impl TableActor {
    /// Create a new table actor and the handle used to talk to it.
    pub fn new(id: TableId, table: Table) -> (Self, TableHandle) {
        let (sender, inbox) = mpsc::channel(100);
        let actor = Self {
            id,
            table,
            inbox,
            timers: TimerRegistry::new(),
            subscribers: HashMap::new(),
            next_subscriber: 0,
            is_closed: false,
        };
        (actor, TableHandle::new(sender, id))
    }

    /// Run the table actor event loop
    pub async fn run(mut self) {
        log::info!("Table {} '{}' starting", self.id, self.table.config().name);

        while !self.is_closed {
            let deadline = self.timers.next_deadline();
            tokio::select! {
                message = self.inbox.recv() => {
                    match message {
                        Some(message) => self.handle_message(message),
                        None => {
                            log::debug!("Table {}: every handle dropped", self.id);
                            self.table.close();
                        }
                    }
                }

                () = wait_for(deadline) => {
                    for event in self.timers.pop_due(Instant::now()) {
                        log::debug!("Table {}: firing {:?}", self.id, event);
                        self.table.fire(event);
                    }
                }
            }
            self.flush();
        }

        self.timers.cancel_all();
        log::info!("Table {} '{}' closed", self.id, self.table.config().name);
    }

    /// Handle a table message
    fn handle_message(&mut self, message: TableMessage) {
        match message {
            TableMessage::AddPlayer {
                name,
                chips,
                response,
            } => {
                let result = self.table.add_player(&name, chips);
                self.reply(response, result);
            }
            TableMessage::NewGame { response } => {
                let result = self.table.new_game();
                self.reply(response, result);
            }
            TableMessage::Bet {
                player_id,
                amount,
                response,
            } => {
                let result = self.table.bet(player_id, amount);
                self.reply(response, result);
            }
            TableMessage::Call {
                player_id,
                response,
            } => {
                let result = self.table.call(player_id);
                self.reply(response, result);
            }
            TableMessage::Check {
                player_id,
                response,
            } => {
                let result = self.table.check(player_id);
                self.reply(response, result);
            }
            TableMessage::Fold {
                player_id,
                response,
            } => {
                let result = self.table.fold(player_id);
                self.reply(response, result);
            }
            TableMessage::Disconnected {
                player_id,
                response,
            } => {
                let result = self.table.mark_disconnected(player_id);
                self.reply(response, result);
            }
            TableMessage::Reconnected {
                player_id,
                response,
            } => {
                let result = self.table.mark_reconnected(player_id);
                self.reply(response, result);
            }
            TableMessage::GetState { response } => {
                let result = self.table.snapshot();
                self.reply(response, result);
            }
            TableMessage::Subscribe { player_id, sender } => {
                let id = self.next_subscriber;
                self.next_subscriber += 1;
                log::debug!("Table {}: subscriber {} joined", self.id, id);
                self.subscribers.insert(id, Subscriber { player_id, sender });
            }
            TableMessage::Close { response } => {
                self.table.close();
                self.reply(response, Ok(()));
            }
        }
    }

    /// Publish what the operation caused before answering, so a caller
    /// that sees the response can rely on its subscribers having it too.
    fn reply<T>(&mut self, response: oneshot::Sender<T>, result: T) {
        self.flush();
        // A dropped responder only means the caller stopped waiting.
        let _ = response.send(result);
    }

    /// Arm requested timers and publish queued commands.
    fn flush(&mut self) {
        for scheduled in self.table.drain_schedule() {
            self.timers.schedule(scheduled.delay, scheduled.event);
        }
        for command in self.table.drain_commands() {
            if let Command::TableClosed { winner } = &command {
                log::info!("Table {}: closing, winner {:?}", self.id, winner);
                self.is_closed = true;
            }
            self.notify(command);
        }
    }

    /// Broadcast a command to every subscriber allowed to see it
    fn notify(&mut self, command: Command) {
        let recipient = command.recipient();
        self.subscribers.retain(|id, subscriber| {
            if recipient.is_some() && subscriber.player_id != recipient {
                return true;
            }
            match subscriber.sender.try_send(command.clone()) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    log::warn!("Subscriber {} channel full, dropping command", id);
                    true
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    log::debug!("Subscriber {} disconnected, removing", id);
                    false
                }
            }
        });
    }
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

//! The per-table state machine.
//!
//! A [`Table`] owns the roster, the dealer and turn cursors, and the
//! current [`Game`]. All mutation goes through its methods; every accepted
//! action runs [`Table::progress`], which detects the end of a betting
//! round, builds side pots, and moves the hand forward. State changes are
//! queued as [`Command`]s and delayed transitions as [`ScheduledEvent`]s;
//! whoever drives the table drains both.

use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use super::{
    commands::Command,
    config::TableConfig,
    errors::{ConfigError, TableError, TableResult},
    timers::{ScheduledEvent, TimerEvent},
};
use crate::game::{
    entities::{Bet, BetKind, Card, Chips, Deck, PlayerId, RoundType, SeatIndex, SidePot},
    hand::{HandEvaluator, StandardEvaluator},
    player::{Player, PlayerView},
    state::Game,
};

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum TableState {
    /// No hand dealt; players may join
    Waiting,
    /// A hand is being played
    Started,
    /// The hand is over and waiting on its scheduled payout and next deal
    Ended,
    /// Torn down; every operation is rejected
    Closed,
}

/// Read-only summary of a table.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct TableSnapshot {
    pub name: String,
    pub state: TableState,
    pub hand: Option<u64>,
    pub round: Option<RoundType>,
    pub players: Vec<PlayerView>,
    pub dealer: Option<PlayerId>,
    pub current_player: Option<PlayerId>,
    pub pot: Chips,
    pub side_pots: Vec<SidePot>,
    pub board: Vec<Card>,
    pub small_blind: Chips,
    pub big_blind: Chips,
    pub max_players: usize,
}

pub struct Table {
    pub(super) config: TableConfig,
    pub(super) players: Vec<Player>,
    pub(super) dealer_index: Option<SeatIndex>,
    pub(super) current_player_index: SeatIndex,
    pub(super) game: Option<Game>,
    pub(super) evaluator: Box<dyn HandEvaluator>,
    /// The running hand ended because everyone else folded.
    pub(super) folded_out: bool,
    /// The ended hand's pots have been paid out.
    pub(super) settled: bool,
    hands_played: u64,
    closed: bool,
    rng: StdRng,
    commands: Vec<Command>,
    schedule: Vec<ScheduledEvent>,
}

impl Table {
    /// A table that ranks showdowns with [`StandardEvaluator`].
    pub fn new(config: TableConfig) -> Result<Self, ConfigError> {
        Self::with_evaluator(config, StandardEvaluator)
    }

    pub fn with_evaluator<E>(config: TableConfig, evaluator: E) -> Result<Self, ConfigError>
    where
        E: HandEvaluator + 'static,
    {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(Self {
            config,
            players: Vec::new(),
            dealer_index: None,
            current_player_index: 0,
            game: None,
            evaluator: Box::new(evaluator),
            folded_out: false,
            settled: false,
            hands_played: 0,
            closed: false,
            rng,
            commands: Vec::new(),
            schedule: Vec::new(),
        })
    }

    // === Queries ===

    #[must_use]
    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> TableState {
        match &self.game {
            _ if self.closed => TableState::Closed,
            None => TableState::Waiting,
            Some(game) if game.is_ended() => TableState::Ended,
            Some(_) => TableState::Started,
        }
    }

    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|player| player.id == id)
    }

    #[must_use]
    pub fn game(&self) -> Option<&Game> {
        self.game.as_ref()
    }

    #[must_use]
    pub fn round_type(&self) -> Option<RoundType> {
        self.game.as_ref().map(Game::round_type)
    }

    #[must_use]
    pub fn pot(&self) -> Chips {
        self.game.as_ref().map_or(0, Game::pot)
    }

    #[must_use]
    pub fn side_pots(&self) -> &[SidePot] {
        match &self.game {
            Some(game) => game.side_pots(),
            None => &[],
        }
    }

    #[must_use]
    pub fn board(&self) -> &[Card] {
        match &self.game {
            Some(game) => game.board(),
            None => &[],
        }
    }

    #[must_use]
    pub fn dealer(&self) -> Option<PlayerId> {
        self.game.as_ref()?;
        self.dealer_index
            .and_then(|seat| self.players.get(seat))
            .map(|player| player.id)
    }

    /// The player whose turn it is, while a hand is being played.
    #[must_use]
    pub fn current_player(&self) -> Option<PlayerId> {
        if self.state() != TableState::Started {
            return None;
        }
        self.players
            .get(self.current_player_index)
            .map(|player| player.id)
    }

    #[must_use]
    pub fn max_bet(&self) -> Chips {
        self.game.as_ref().map_or(0, Game::max_bet)
    }

    /// Stacks plus everything committed to the hand. Constant for the
    /// whole of a hand.
    #[must_use]
    pub fn chips_in_play(&self) -> Chips {
        let stacks: Chips = self.players.iter().map(|player| player.chips).sum();
        stacks + self.game.as_ref().map_or(0, Game::committed)
    }

    #[must_use]
    pub fn snapshot(&self) -> TableSnapshot {
        TableSnapshot {
            name: self.config.name.clone(),
            state: self.state(),
            hand: self.game.as_ref().map(Game::hand_number),
            round: self.round_type(),
            players: self.roster(false),
            dealer: self.dealer(),
            current_player: self.current_player(),
            pot: self.pot(),
            side_pots: self.side_pots().to_vec(),
            board: self.board().to_vec(),
            small_blind: self.config.small_blind,
            big_blind: self.config.big_blind,
            max_players: self.config.max_players,
        }
    }

    // === Outbound queues ===

    pub fn drain_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    pub fn drain_schedule(&mut self) -> Vec<ScheduledEvent> {
        std::mem::take(&mut self.schedule)
    }

    pub(super) fn emit(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub(super) fn roster(&self, reveal: bool) -> Vec<PlayerView> {
        self.players.iter().map(|player| player.view(reveal)).collect()
    }

    pub(super) fn emit_players(&mut self) {
        let roster = self.roster(false);
        self.emit(Command::PlayerUpdate(roster));
    }

    pub(super) fn emit_pot(&mut self) {
        let (pot, side_pots) = (self.pot(), self.side_pots().to_vec());
        self.emit(Command::PotUpdate { pot, side_pots });
    }

    // === Roster ===

    pub fn add_player(&mut self, name: &str, chips: Chips) -> TableResult<PlayerId> {
        match self.state() {
            TableState::Closed => return Err(TableError::TableClosed),
            TableState::Started => return Err(TableError::GameAlreadyStarted),
            TableState::Waiting | TableState::Ended => {}
        }
        if self.players.len() >= self.config.max_players {
            return Err(TableError::TableFull);
        }
        // Every pot and stack total must stay representable.
        if chips == 0 || self.chips_in_play().checked_add(chips).is_none() {
            return Err(TableError::InvalidAmount(chips));
        }

        let mut player = Player::new(name, chips);
        // Sits out whatever is left of a settling hand.
        player.folded = self.game.is_some();
        let id = player.id;
        self.players.push(player);
        log::info!(
            "Table '{}': {} joined with {} chips",
            self.config.name,
            name,
            chips
        );
        self.emit_players();
        Ok(id)
    }

    pub fn mark_disconnected(&mut self, id: PlayerId) -> TableResult<()> {
        let seat = self.seat_of(id)?;
        self.players[seat].disconnected = true;
        log::info!(
            "Table '{}': {} disconnected",
            self.config.name,
            self.players[seat].name
        );

        if self.players.iter().all(|player| player.disconnected) {
            log::info!("Table '{}': every seat disconnected", self.config.name);
            self.players.clear();
            self.close_with(None);
            return Ok(());
        }

        self.emit_players();
        self.act_for_disconnected();
        Ok(())
    }

    /// Clear the flag and replay what the returning player needs to
    /// rebuild their view of the hand.
    pub fn mark_reconnected(&mut self, id: PlayerId) -> TableResult<()> {
        let seat = self.seat_of(id)?;
        self.players[seat].disconnected = false;
        log::info!(
            "Table '{}': {} reconnected",
            self.config.name,
            self.players[seat].name
        );
        self.emit_players();

        let Some(game) = &self.game else {
            return Ok(());
        };
        let board = game.board().to_vec();
        let cards = self.players[seat].cards.clone();
        if !cards.is_empty() {
            self.emit(Command::HoleCards {
                player_id: id,
                cards,
            });
        }
        self.emit(Command::BoardUpdated(board));
        self.emit_pot();
        if let Some(player_id) = self.dealer() {
            self.emit(Command::Dealer { player_id });
        }
        if let Some(player_id) = self.current_player() {
            self.emit(Command::CurrentPlayer { player_id });
        }
        Ok(())
    }

    /// Tear the table down. Pending scheduled transitions are dropped.
    pub fn close(&mut self) {
        if !self.closed {
            self.close_with(None);
        }
    }

    fn close_with(&mut self, winner: Option<PlayerId>) {
        self.closed = true;
        self.game = None;
        self.schedule.clear();
        log::info!("Table '{}' closed", self.config.name);
        self.emit(Command::TableClosed { winner });
    }

    fn seat_of(&self, id: PlayerId) -> TableResult<SeatIndex> {
        if self.closed {
            return Err(TableError::TableClosed);
        }
        self.players
            .iter()
            .position(|player| player.id == id)
            .ok_or(TableError::PlayerNotFound(id))
    }

    /// Drop players who can no longer cover the big blind, keeping the
    /// dealer cursor pointing just before the next button.
    fn remove_poor_players(&mut self) {
        let big_blind = self.config.big_blind;
        let dealer = self.dealer_index;
        let mut removed_before = 0;
        let mut seat = 0;
        self.players.retain(|player| {
            let keep = player.chips > big_blind;
            if !keep {
                log::info!("{} busted with {} chips", player.name, player.chips);
                if dealer.is_some_and(|d| seat <= d) {
                    removed_before += 1;
                }
            }
            seat += 1;
            keep
        });

        if seat != self.players.len() {
            let n = self.players.len();
            self.dealer_index = match dealer {
                Some(d) if n > 0 => Some((d + n - removed_before) % n),
                _ => None,
            };
            self.emit_players();
        }
    }

    // === Hand lifecycle ===

    pub fn new_game(&mut self) -> TableResult<()> {
        match self.state() {
            TableState::Closed => return Err(TableError::TableClosed),
            TableState::Started => return Err(TableError::GameAlreadyStarted),
            TableState::Ended if !self.settled => return Err(TableError::GameAlreadyStarted),
            TableState::Waiting | TableState::Ended => {}
        }
        let min_players = self.config.min_players;
        let big_blind = self.config.big_blind;
        let solvent = self
            .players
            .iter()
            .filter(|player| player.chips > big_blind)
            .count();
        // A lone survivor wins the table; otherwise reject before touching
        // the roster.
        if self.players.len() < min_players || (solvent > 1 && solvent < min_players) {
            return Err(TableError::TooFewPlayers { min_players });
        }

        self.remove_poor_players();
        if self.players.len() <= 1 {
            let winner = self.players.first().map(|player| player.id);
            self.close_with(winner);
            return Ok(());
        }

        for player in &mut self.players {
            player.reset();
        }
        let n = self.players.len();
        let dealer = self.dealer_index.map_or(n - 1, |d| (d + 1) % n);
        self.dealer_index = Some(dealer);
        self.hands_played += 1;
        self.folded_out = false;
        self.settled = false;

        let deck = Deck::shuffled(&mut self.rng);
        let game = Game::new(self.hands_played, self.config.blinds(), deck);
        let hand = game.hand_number();
        self.game = Some(game);
        log::info!(
            "Table '{}': hand {} with {} players, dealer {}",
            self.config.name,
            hand,
            n,
            self.players[dealer].name
        );

        let dealer_id = self.players[dealer].id;
        self.emit(Command::GameStarted { hand });
        self.emit(Command::Dealer {
            player_id: dealer_id,
        });
        self.deal_hole_cards();
        self.emit_players();
        self.emit(Command::NewRound {
            hand,
            round: RoundType::Deal,
        });

        // Heads-up the button posts the small blind and acts first.
        self.current_player_index = if n == 2 { dealer } else { (dealer + 1) % n };
        let player_id = self.players[self.current_player_index].id;
        self.emit(Command::CurrentPlayer { player_id });

        let blinds = self.config.blinds();
        self.post_blind(blinds.small, BetKind::SmallBlind);
        self.progress();
        self.post_blind(blinds.big, BetKind::BigBlind);
        self.after_action();
        Ok(())
    }

    fn deal_hole_cards(&mut self) {
        let Some(game) = self.game.as_mut() else {
            return;
        };
        let n = self.players.len();
        let dealer = self.dealer_index.unwrap_or(0);
        for _ in 0..2 {
            for step in 1..=n {
                let card = game.deal_card();
                self.players[(dealer + step) % n].cards.push(card);
            }
        }
        let private: Vec<Command> = self
            .players
            .iter()
            .map(|player| Command::HoleCards {
                player_id: player.id,
                cards: player.cards.clone(),
            })
            .collect();
        self.commands.extend(private);
    }

    fn post_blind(&mut self, amount: Chips, kind: BetKind) {
        let seat = self.current_player_index;
        let amount = amount.min(self.players[seat].chips);
        if let Err(err) = self.place_bet(seat, amount, kind) {
            log::error!(
                "Table '{}': failed to post {}: {}",
                self.config.name,
                kind,
                err
            );
        }
    }

    /// Run a scheduled transition. Events for a hand other than the
    /// current one are ignored.
    pub fn fire(&mut self, event: TimerEvent) {
        let current = self.game.as_ref().map(Game::hand_number);
        match event {
            TimerEvent::EndGame { hand } if current == Some(hand) => self.settle(),
            TimerEvent::NewGame { hand } if current == Some(hand) => {
                if let Err(err) = self.new_game() {
                    log::warn!(
                        "Table '{}': next hand not dealt: {}",
                        self.config.name,
                        err
                    );
                }
            }
            _ => log::debug!(
                "Table '{}': ignoring stale {:?}",
                self.config.name,
                event
            ),
        }
    }

    // === Player actions ===

    /// Put `amount` more chips in. It must reach the current max bet
    /// unless it is the player's whole stack.
    pub fn bet(&mut self, id: PlayerId, amount: Chips) -> TableResult<()> {
        let seat = self.acting_seat(id)?;
        if amount == 0 {
            return Err(TableError::InvalidAmount(amount));
        }
        let chips = self.players[seat].chips;
        if amount > chips {
            return Err(TableError::InsufficientFunds {
                requested: amount,
                available: chips,
            });
        }
        let max_bet = self.max_bet();
        let all_in = amount == chips;
        if amount < max_bet && !all_in {
            return Err(TableError::BetTooLow { amount, max_bet });
        }

        let kind = if all_in { BetKind::AllIn } else { BetKind::Bet };
        self.place_bet(seat, amount, kind)?;
        self.after_action();
        Ok(())
    }

    /// Match the max bet, or go all-in for less when the stack is short.
    pub fn call(&mut self, id: PlayerId) -> TableResult<()> {
        let seat = self.acting_seat(id)?;
        let player = &self.players[seat];
        let owed = self.max_bet().saturating_sub(player.paid());
        if owed == 0 {
            return Err(TableError::NothingToCall);
        }
        let payment = owed.min(player.chips);
        self.place_bet(seat, payment, BetKind::Call)?;
        self.after_action();
        Ok(())
    }

    pub fn check(&mut self, id: PlayerId) -> TableResult<()> {
        let seat = self.acting_seat(id)?;
        self.apply_check(seat);
        self.after_action();
        Ok(())
    }

    pub fn fold(&mut self, id: PlayerId) -> TableResult<()> {
        let seat = self.acting_seat(id)?;
        self.apply_fold(seat);
        self.after_action();
        Ok(())
    }

    fn acting_seat(&self, id: PlayerId) -> TableResult<SeatIndex> {
        let seat = self.seat_of(id)?;
        if self.state() != TableState::Started {
            return Err(TableError::HandNotInProgress);
        }
        if seat != self.current_player_index {
            return Err(TableError::NotYourTurn);
        }
        Ok(seat)
    }

    /// Debit `amount` from the seat and add it onto the seat's bet.
    fn place_bet(&mut self, seat: SeatIndex, amount: Chips, kind: BetKind) -> TableResult<()> {
        let Some(game) = self.game.as_mut() else {
            return Err(TableError::HandNotInProgress);
        };
        let player = &mut self.players[seat];
        let owed = game.max_bet().saturating_sub(player.paid());

        let bet = if kind == BetKind::Call && amount == owed {
            player.pay(amount)?;
            game.record_call(seat)
        } else {
            let bet =
                Bet::raised(player.bet, amount, kind).ok_or(TableError::InvalidAmount(amount))?;
            player.pay(amount)?;
            game.record_bet(seat, bet);
            bet
        };
        player.bet = Some(bet);

        let max_bet = game.max_bet();
        log::debug!(
            "Table '{}': {} {} (max bet {})",
            self.config.name,
            player.name,
            bet,
            max_bet
        );
        let player_id = player.id;
        self.emit(Command::PlayerBet {
            player_id,
            bet,
            max_bet,
            kind: bet.kind,
        });
        Ok(())
    }

    fn apply_check(&mut self, seat: SeatIndex) {
        let Some(game) = self.game.as_mut() else {
            return;
        };
        let bet = game.record_check(seat);
        let max_bet = game.max_bet();
        let player = &mut self.players[seat];
        player.bet = Some(bet);
        log::debug!("Table '{}': {} checks", self.config.name, player.name);
        let player_id = player.id;
        self.emit(Command::PlayerBet {
            player_id,
            bet,
            max_bet,
            kind: BetKind::Check,
        });
    }

    fn apply_fold(&mut self, seat: SeatIndex) {
        let player = &mut self.players[seat];
        player.folded = true;
        log::debug!("Table '{}': {} folds", self.config.name, player.name);
        self.emit_players();
    }

    fn after_action(&mut self) {
        self.progress();
        self.act_for_disconnected();
    }

    /// Disconnected players check when nothing is owed and fold otherwise.
    fn act_for_disconnected(&mut self) {
        while self.state() == TableState::Started {
            let seat = self.current_player_index;
            let Some(player) = self.players.get(seat) else {
                return;
            };
            if !player.disconnected || !player.can_act() {
                return;
            }
            let owed = self.max_bet().saturating_sub(player.paid());
            if owed == 0 {
                self.apply_check(seat);
            } else {
                self.apply_fold(seat);
            }
            self.progress();
        }
    }

    // === Turn order ===

    /// Every seat that can still act has acted and matched the max bet.
    /// A forced blind is not an action, so the big blind keeps its option.
    fn is_round_over(&self) -> bool {
        let Some(game) = &self.game else {
            return false;
        };
        let max_bet = game.max_bet();
        self.players
            .iter()
            .enumerate()
            .filter(|(_, player)| player.can_act())
            .all(|(seat, _)| {
                game.round()
                    .bets
                    .get(&seat)
                    .is_some_and(|bet| bet.amount == max_bet && !bet.kind.is_blind())
            })
    }

    fn advance_turn(&mut self) {
        let n = self.players.len();
        let next = (1..=n)
            .map(|step| (self.current_player_index + step) % n)
            .find(|&seat| self.players[seat].can_act());
        match next {
            Some(seat) => {
                self.current_player_index = seat;
                let player_id = self.players[seat].id;
                self.emit(Command::CurrentPlayer { player_id });
            }
            None => log::error!(
                "Table '{}': no seat left to act but the hand is still running",
                self.config.name
            ),
        }
    }

    /// Move the hand forward after an action.
    fn progress(&mut self) {
        let Some(game) = &self.game else {
            return;
        };
        if game.is_ended() {
            return;
        }

        let live = self.players.iter().filter(|player| !player.folded).count();
        let folded_out = live <= 1;
        if !folded_out && !self.is_round_over() {
            self.advance_turn();
            return;
        }

        self.process_bets(folded_out);
        if folded_out {
            self.folded_out = true;
            self.finish_hand();
            return;
        }

        let all_in = self
            .players
            .iter()
            .filter(|player| !player.folded && player.all_in)
            .count();
        if all_in + 1 >= live {
            // Nobody is left to bet against: run the board out.
            self.reveal_hands();
            while let Some(next) = self.round_type().and_then(RoundType::next) {
                self.start_round(next);
            }
            self.finish_hand();
            return;
        }

        match self.round_type().and_then(RoundType::next) {
            Some(next) => {
                self.start_round(next);
                self.current_player_index = self.dealer_index.unwrap_or(0);
                self.advance_turn();
            }
            None => {
                self.reveal_hands();
                self.finish_hand();
            }
        }
    }

    fn start_round(&mut self, kind: RoundType) {
        let Some(game) = self.game.as_mut() else {
            return;
        };
        game.new_round(kind);
        let hand = game.hand_number();
        let board = game.board().to_vec();
        log::debug!(
            "Table '{}': {} [{}]",
            self.config.name,
            kind,
            board.iter().map(Card::to_string).collect::<Vec<_>>().join(" ")
        );
        self.emit(Command::NewRound { hand, round: kind });
        self.emit(Command::BoardUpdated(board));
    }

    fn reveal_hands(&mut self) {
        let revealed = self.roster(true);
        self.emit(Command::PlayersCards(revealed));
    }

    /// Mark the hand over and ask for the payout and the next deal.
    fn finish_hand(&mut self) {
        let Some(game) = self.game.as_mut() else {
            return;
        };
        game.end();
        let hand = game.hand_number();
        log::info!(
            "Table '{}': hand {} over{}",
            self.config.name,
            hand,
            if self.folded_out { " (fold-out)" } else { "" }
        );
        self.schedule.push(ScheduledEvent {
            delay: self.config.end_game_delay(),
            event: TimerEvent::EndGame { hand },
        });
        self.schedule.push(ScheduledEvent {
            delay: self.config.next_game_delay(),
            event: TimerEvent::NewGame { hand },
        });
    }
}

impl std::fmt::Debug for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table")
            .field("name", &self.config.name)
            .field("state", &self.state())
            .field("players", &self.players.len())
            .field("dealer_index", &self.dealer_index)
            .field("current_player_index", &self.current_player_index)
            .finish()
    }
}

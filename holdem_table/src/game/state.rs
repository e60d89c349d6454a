//! Per-hand bookkeeping: deck, board, pots, and the current betting round.

use super::entities::{
    Bet, BetKind, Blinds, Card, Chips, Deck, PlayerId, Round, RoundType, SeatIndex, SidePot,
};

/// One hand of Hold'em. Created by the table when a hand starts and
/// discarded when the next one begins.
#[derive(Debug)]
pub struct Game {
    hand: u64,
    blinds: Blinds,
    deck: Deck,
    board: Vec<Card>,
    pot: Chips,
    side_pots: Vec<SidePot>,
    round: Round,
    ended: bool,
}

impl Game {
    /// `deck` is expected to be shuffled already.
    #[must_use]
    pub fn new(hand: u64, blinds: Blinds, deck: Deck) -> Self {
        Self {
            hand,
            blinds,
            deck,
            board: Vec::with_capacity(5),
            pot: 0,
            side_pots: Vec::new(),
            round: Round::new(RoundType::Deal),
            ended: false,
        }
    }

    #[must_use]
    pub fn hand_number(&self) -> u64 {
        self.hand
    }

    #[must_use]
    pub fn blinds(&self) -> &Blinds {
        &self.blinds
    }

    #[must_use]
    pub fn board(&self) -> &[Card] {
        &self.board
    }

    #[must_use]
    pub fn pot(&self) -> Chips {
        self.pot
    }

    #[must_use]
    pub fn side_pots(&self) -> &[SidePot] {
        &self.side_pots
    }

    #[must_use]
    pub fn round(&self) -> &Round {
        &self.round
    }

    #[must_use]
    pub fn round_type(&self) -> RoundType {
        self.round.kind
    }

    #[must_use]
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn end(&mut self) {
        self.ended = true;
    }

    pub fn deal_card(&mut self) -> Card {
        self.deck.draw()
    }

    /// Open a new betting round, burning once and dealing its board cards.
    pub fn new_round(&mut self, kind: RoundType) {
        self.round = Round::new(kind);
        let count = kind.board_cards();
        if count > 0 {
            self.deck.burn();
            for _ in 0..count {
                let card = self.deck.draw();
                self.board.push(card);
            }
        }
    }

    /// A zero-delta action that keeps whatever the seat already paid.
    pub fn record_check(&mut self, seat: SeatIndex) -> Bet {
        let bet = Bet::new(BetKind::Check, self.round.bet_by_seat(seat));
        self.round.bets.insert(seat, bet);
        bet
    }

    /// Match the seat to the round's highest bet.
    pub fn record_call(&mut self, seat: SeatIndex) -> Bet {
        let bet = Bet::new(BetKind::Call, self.max_bet());
        self.round.bets.insert(seat, bet);
        bet
    }

    pub fn record_bet(&mut self, seat: SeatIndex, bet: Bet) {
        self.round.bets.insert(seat, bet);
    }

    #[must_use]
    pub fn max_bet(&self) -> Chips {
        self.round.max_bet()
    }

    /// Smallest strictly positive wager left in the round's ledger.
    #[must_use]
    pub fn lowest_active_bet(&self) -> Option<Chips> {
        self.round
            .bets
            .values()
            .map(|bet| bet.amount)
            .filter(|&amount| amount > 0)
            .min()
    }

    /// Seats that still hold a positive wager in the ledger.
    #[must_use]
    pub fn seats_with_bets(&self) -> Vec<SeatIndex> {
        self.round
            .bets
            .iter()
            .filter(|(_, bet)| bet.amount > 0)
            .map(|(&seat, _)| seat)
            .collect()
    }

    /// Take `tier` chips from every seat still holding a positive wager and
    /// add them to the main pot. Returns the seats that contributed.
    pub fn collect_tier(&mut self, tier: Chips) -> Vec<SeatIndex> {
        let mut contributors = Vec::new();
        for (&seat, bet) in self.round.bets.iter_mut() {
            if bet.amount == 0 {
                continue;
            }
            let taken = tier.min(bet.amount);
            bet.amount -= taken;
            self.pot += taken;
            contributors.push(seat);
        }
        contributors
    }

    /// Give back whatever wager the seat still has in the ledger.
    pub fn refund(&mut self, seat: SeatIndex) -> Chips {
        match self.round.bets.get_mut(&seat) {
            Some(bet) => std::mem::take(&mut bet.amount),
            None => 0,
        }
    }

    /// Sweep the round's wagers into the main pot and clear the ledger.
    pub fn move_bets_to_pot(&mut self) -> Chips {
        let moved = self.round.total();
        self.pot += moved;
        self.round.bets.clear();
        moved
    }

    /// Freeze the current main pot into a side pot for `players` and zero
    /// the main pot. Marking capped all-in players is the caller's job
    /// because only the caller knows whose stake is exhausted.
    pub fn create_side_pot(&mut self, players: Vec<PlayerId>) -> &SidePot {
        let amount = std::mem::take(&mut self.pot);
        self.side_pots.push(SidePot::new(amount, players));
        &self.side_pots[self.side_pots.len() - 1]
    }

    /// Empty every pot for payout.
    pub fn take_pots(&mut self) -> (Chips, Vec<SidePot>) {
        (
            std::mem::take(&mut self.pot),
            std::mem::take(&mut self.side_pots),
        )
    }

    /// Chips that have left player stacks and not yet been paid back.
    #[must_use]
    pub fn committed(&self) -> Chips {
        self.pot + self.side_pots.iter().map(SidePot::amount).sum::<Chips>() + self.round.total()
    }
}

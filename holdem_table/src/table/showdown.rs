//! Showdown and payout.

use super::{
    commands::{Command, PotKind, Winner},
    engine::Table,
};
use crate::game::{
    entities::{Card, Chips, SeatIndex},
    hand::HandStrength,
    player::Player,
};

impl Table {
    /// Pay out every pot of the ended hand. Runs once per hand.
    pub(super) fn settle(&mut self) {
        let Some(game) = self.game.as_mut() else {
            return;
        };
        if !game.is_ended() || self.settled {
            return;
        }
        self.settled = true;
        let hand = game.hand_number();
        let board = game.board().to_vec();
        let (main_pot, side_pots) = game.take_pots();

        let mut winners = Vec::new();
        for (i, side_pot) in side_pots.iter().enumerate() {
            let eligible = self.live_seats(|player| side_pot.contains(&player.id));
            let pot = PotKind::SidePot(i + 1);
            winners.extend(self.award(side_pot.amount(), eligible, pot, &board));
        }
        let eligible = self.live_seats(|player| !player.has_side_pot);
        winners.extend(self.award(main_pot, eligible, PotKind::Main, &board));

        for winner in &winners {
            log::info!("Table '{}': {}", self.config.name, winner);
        }
        self.emit(Command::GameWinners(winners));
        self.emit(Command::GameEnded { hand });
        self.emit_pot();
        self.emit_players();
    }

    fn live_seats(&self, eligible: impl Fn(&Player) -> bool) -> Vec<SeatIndex> {
        self.players
            .iter()
            .enumerate()
            .filter(|(_, player)| !player.folded && eligible(player))
            .map(|(seat, _)| seat)
            .collect()
    }

    /// Split `amount` between the best hands among `eligible`.
    fn award(
        &mut self,
        amount: Chips,
        mut eligible: Vec<SeatIndex>,
        pot: PotKind,
        board: &[Card],
    ) -> Vec<Winner> {
        if amount == 0 {
            return Vec::new();
        }
        if eligible.is_empty() {
            eligible = self.live_seats(|_| true);
        }
        if eligible.is_empty() {
            log::error!(
                "Table '{}': nobody can claim the {} pot of {}",
                self.config.name,
                pot,
                amount
            );
            return Vec::new();
        }

        let mut best = if self.folded_out || eligible.len() == 1 {
            eligible
        } else {
            self.best_hands(&eligible, board)
        };
        self.order_from_dealer(&mut best);

        // Odd chips go one each to the earliest winners after the button.
        let count = best.len() as Chips;
        let (share, remainder) = (amount / count, amount % count);
        best.iter()
            .enumerate()
            .map(|(i, &seat)| {
                let won = share + Chips::from((i as Chips) < remainder);
                let player = &mut self.players[seat];
                player.chips += won;
                Winner {
                    player_id: player.id,
                    name: player.name.clone(),
                    amount: won,
                    pot,
                }
            })
            .collect()
    }

    fn best_hands(&self, eligible: &[SeatIndex], board: &[Card]) -> Vec<SeatIndex> {
        let ranked: Vec<(SeatIndex, HandStrength)> = eligible
            .iter()
            .map(|&seat| {
                let mut cards = self.players[seat].cards.clone();
                cards.extend_from_slice(board);
                (seat, self.evaluator.evaluate(&cards))
            })
            .collect();
        let Some(top) = ranked.iter().map(|(_, strength)| *strength).max() else {
            return Vec::new();
        };
        ranked
            .into_iter()
            .filter(|(_, strength)| *strength == top)
            .map(|(seat, _)| seat)
            .collect()
    }

    fn order_from_dealer(&self, seats: &mut [SeatIndex]) {
        let n = self.players.len();
        let dealer = self.dealer_index.unwrap_or(0);
        seats.sort_by_key(|&seat| (seat + n - dealer - 1) % n);
    }
}

//! End-of-round bet processing and side pot construction.
//!
//! When a betting round closes, every wager in the round ledger is either
//! swept into the main pot, frozen into a side pot for the players who
//! covered it, or handed back to a player nobody could match.

use super::engine::Table;
use crate::game::entities::{PlayerId, SeatIndex};

impl Table {
    pub(super) fn process_bets(&mut self, folded_out: bool) {
        let Some(game) = self.game.as_mut() else {
            return;
        };
        let players = &mut self.players;
        let max_bet = game.max_bet();

        // Seats with money in this round, plus live all-ins from earlier
        // streets that are not capped yet.
        let active: Vec<SeatIndex> = players
            .iter()
            .enumerate()
            .filter(|&(seat, player)| {
                game.round().bet_by_seat(seat) > 0
                    || (player.all_in && !player.folded && !player.has_side_pot)
            })
            .map(|(seat, _)| seat)
            .collect();
        let all_in: Vec<SeatIndex> = active
            .iter()
            .copied()
            .filter(|&seat| players[seat].all_in)
            .collect();

        // An all-in carried over from an earlier street can't win any of
        // this street's money: freeze what they can win now.
        let carried: Vec<SeatIndex> = all_in
            .iter()
            .copied()
            .filter(|&seat| game.round().bet_by_seat(seat) == 0)
            .collect();
        if !carried.is_empty() && max_bet > 0 {
            if game.pot() > 0 {
                let ids: Vec<PlayerId> = active.iter().map(|&seat| players[seat].id).collect();
                let pot = game.create_side_pot(ids);
                log::debug!("side pot of {} for carried all-ins", pot.amount());
            }
            for &seat in &carried {
                players[seat].has_side_pot = true;
            }
        }

        let needs_split = all_in
            .iter()
            .any(|&seat| game.round().bet_by_seat(seat) < max_bet);
        if needs_split {
            while game.seats_with_bets().len() > 1 {
                let Some(tier) = game.lowest_active_bet() else {
                    break;
                };
                let contributors = game.collect_tier(tier);
                let remaining = game.seats_with_bets();
                if remaining.len() > 1 {
                    let ids: Vec<PlayerId> =
                        contributors.iter().map(|&seat| players[seat].id).collect();
                    let pot = game.create_side_pot(ids);
                    log::debug!("side pot of {} at tier {}", pot.amount(), tier);
                    // Only stakes that ran out at this tier are capped.
                    for &seat in &contributors {
                        if players[seat].all_in && !remaining.contains(&seat) {
                            players[seat].has_side_pot = true;
                        }
                    }
                }
            }
            // Whatever nobody could match goes back to its owner.
            for seat in game.seats_with_bets() {
                let refund = game.refund(seat);
                let player = &mut players[seat];
                player.chips += refund;
                player.all_in = false;
                log::debug!("{} takes back {} unmatched chips", player.name, refund);
            }
        } else if folded_out {
            if let Some(seat) = players.iter().position(|player| !player.folded) {
                let refund = game.refund(seat);
                if refund > 0 {
                    let player = &mut players[seat];
                    player.chips += refund;
                    player.all_in = false;
                }
            }
        }

        game.move_bets_to_pot();
        for player in players.iter_mut() {
            player.bet = None;
        }

        self.emit_pot();
        self.emit_players();
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        game::entities::{Chips, PlayerId, RoundType},
        table::{commands::Command, config::TableConfig, engine::Table, timers::TimerEvent},
    };

    fn table(stacks: &[Chips]) -> (Table, Vec<PlayerId>) {
        let config = TableConfig {
            seed: Some(7),
            ..Default::default()
        };
        let mut table = Table::new(config).unwrap();
        let ids = stacks
            .iter()
            .enumerate()
            .map(|(i, &chips)| table.add_player(&format!("p{}", i + 1), chips).unwrap())
            .collect();
        (table, ids)
    }

    #[test]
    fn test_uncalled_raise_is_refunded_on_fold_out() {
        // Heads-up: p2 is dealer and small blind, p1 is big blind.
        let (mut table, ids) = table(&[500, 500]);
        table.new_game().unwrap();
        table.bet(ids[1], 200).unwrap();
        table.fold(ids[0]).unwrap();

        // The winner's own round bet comes straight back; the big blind
        // stays in the pot.
        assert_eq!(table.pot(), 20);
        assert_eq!(table.player(ids[1]).unwrap().chips, 500);
        assert_eq!(table.chips_in_play(), 1000);
    }

    #[test]
    fn test_all_in_for_less_refunds_excess() {
        let (mut table, ids) = table(&[500, 150]);
        table.new_game().unwrap();
        // p2 (dealer, small blind) shoves, p1 covers with a bigger bet.
        table.bet(ids[1], 140).unwrap();
        table.bet(ids[0], 300).unwrap();

        // p1's unmatched 170 comes back; both stakes are 150.
        assert_eq!(table.player(ids[0]).unwrap().chips, 350);
        let committed = table.pot() + table.side_pots().iter().map(|p| p.amount()).sum::<Chips>();
        assert_eq!(committed, 300);
        assert_eq!(table.chips_in_play(), 650);
        assert_eq!(table.round_type(), Some(RoundType::River));
        assert!(
            table
                .drain_commands()
                .iter()
                .any(|command| matches!(command, Command::PlayersCards(_)))
        );
    }

    #[test]
    fn test_timers_requested_once_per_hand() {
        let (mut table, ids) = table(&[500, 500]);
        table.new_game().unwrap();
        table.fold(ids[1]).unwrap();
        let events: Vec<TimerEvent> = table
            .drain_schedule()
            .into_iter()
            .map(|scheduled| scheduled.event)
            .collect();
        assert_eq!(
            events,
            vec![TimerEvent::EndGame { hand: 1 }, TimerEvent::NewGame { hand: 1 }]
        );
    }
}

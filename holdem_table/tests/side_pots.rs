//! Side pot construction tests
//!
//! These tests verify that end-of-round bet processing:
//! - Splits all-ins at different amounts into the right pots
//! - Refunds chips nobody could match
//! - Never creates or loses chips, for any sequence of legal actions

use holdem_table::{PlayerId, RoundType, Table, TableConfig, TableState, TimerEvent};
use proptest::prelude::*;
use rand::{Rng, SeedableRng, rngs::StdRng};

fn table(stacks: &[u32]) -> (Table, Vec<PlayerId>) {
    let mut table = Table::new(TableConfig {
        seed: Some(3),
        max_players: 9,
        ..Default::default()
    })
    .unwrap();
    let ids = stacks
        .iter()
        .enumerate()
        .map(|(i, &chips)| table.add_player(&format!("p{}", i + 1), chips).unwrap())
        .collect();
    (table, ids)
}

fn committed(table: &Table) -> u32 {
    table.pot() + table.side_pots().iter().map(|pot| pot.amount()).sum::<u32>()
}

#[test]
fn test_three_way_all_in_with_uncallable_excess() {
    // Stacks after the blinds: p1 190, p2 230, p3 100.
    let (mut table, ids) = table(&[200, 250, 100]);
    let (p1, p2, p3) = (ids[0], ids[1], ids[2]);
    table.new_game().unwrap();
    assert_eq!(table.player(p1).unwrap().chips, 190);
    assert_eq!(table.player(p2).unwrap().chips, 230);

    table.bet(p3, 100).unwrap();
    table.call(p1).unwrap();
    table.bet(p2, 230).unwrap();
    table.call(p1).unwrap();

    assert_eq!(table.side_pots().len(), 1);
    let side_pot = &table.side_pots()[0];
    assert_eq!(side_pot.amount(), 300);
    assert_eq!(side_pot.players(), &[p1, p2, p3]);
    assert_eq!(table.pot(), 200);
    // p2 put in 250 but only 200 could be matched.
    assert_eq!(table.player(p2).unwrap().chips, 50);
    assert!(!table.player(p2).unwrap().all_in);
    assert!(table.player(p3).unwrap().has_side_pot);
    assert!(!table.player(p1).unwrap().has_side_pot);

    // Nobody is left to bet against, so the board runs out.
    assert_eq!(table.state(), TableState::Ended);
    assert_eq!(table.round_type(), Some(RoundType::River));
    assert_eq!(table.chips_in_play(), 550);
}

#[test]
fn test_multiple_all_in_tiers_in_one_round() {
    let (mut table, ids) = table(&[1000, 50, 150, 300]);
    table.new_game().unwrap();
    // Dealer is p4, so p3 opens after the blinds.
    assert_eq!(table.current_player(), Some(ids[2]));

    table.bet(ids[2], 150).unwrap();
    table.bet(ids[3], 300).unwrap();
    table.call(ids[0]).unwrap();
    table.call(ids[1]).unwrap();

    let pots: Vec<(u32, usize)> = table
        .side_pots()
        .iter()
        .map(|pot| (pot.amount(), pot.players().len()))
        .collect();
    assert_eq!(pots, vec![(200, 4), (300, 3)]);
    assert_eq!(table.pot(), 300);
    assert!(table.player(ids[1]).unwrap().has_side_pot);
    assert!(table.player(ids[2]).unwrap().has_side_pot);
    // p4 matched the top tier, so still plays for the main pot.
    assert!(!table.player(ids[3]).unwrap().has_side_pot);
    assert_eq!(committed(&table), 800);
    assert_eq!(table.chips_in_play(), 1500);
}

#[test]
fn test_all_in_from_earlier_street_is_capped() {
    let (mut table, ids) = table(&[1000, 1000, 100]);
    table.new_game().unwrap();

    // p3 shoves preflop and is called by both.
    table.bet(ids[2], 100).unwrap();
    table.call(ids[0]).unwrap();
    table.call(ids[1]).unwrap();
    assert_eq!(table.round_type(), Some(RoundType::Flop));
    assert_eq!(table.pot(), 300);
    assert!(table.side_pots().is_empty());

    // Betting on the flop can't reach p3.
    table.bet(ids[0], 50).unwrap();
    table.call(ids[1]).unwrap();

    assert_eq!(table.round_type(), Some(RoundType::Turn));
    assert_eq!(table.side_pots().len(), 1);
    assert_eq!(table.side_pots()[0].amount(), 300);
    assert!(table.side_pots()[0].contains(&ids[2]));
    assert!(table.player(ids[2]).unwrap().has_side_pot);
    assert_eq!(table.pot(), 100);
}

#[test]
fn test_uncalled_bet_after_carried_all_in_is_returned() {
    let (mut table, ids) = table(&[1000, 1000, 100]);
    table.new_game().unwrap();
    table.bet(ids[2], 100).unwrap();
    table.call(ids[0]).unwrap();
    table.call(ids[1]).unwrap();

    table.bet(ids[0], 80).unwrap();
    table.fold(ids[1]).unwrap();

    // p1's 80 had no taker.
    assert_eq!(table.player(ids[0]).unwrap().chips, 900);
    assert_eq!(table.side_pots().len(), 1);
    assert_eq!(table.side_pots()[0].amount(), 300);
    assert_eq!(table.pot(), 0);
    assert_eq!(table.state(), TableState::Ended);
}

/// Take one random legal action for whoever is on the clock.
fn act(table: &mut Table, rng: &mut StdRng) -> Result<(), TestCaseError> {
    let id = table.current_player().unwrap();
    let player = table.player(id).unwrap();
    prop_assert!(player.can_act(), "current seat can't act");
    let chips = player.chips;
    let max_bet = table.max_bet();
    let owed = max_bet.saturating_sub(player.paid());
    let big_blind = table.config().big_blind;
    let roll = rng.random_range(0..100);

    let result = if owed == 0 {
        if roll < 55 {
            table.check(id)
        } else {
            let amount = max_bet.max(big_blind) + big_blind * rng.random_range(0..5);
            table.bet(id, amount.min(chips))
        }
    } else if roll < 15 {
        table.fold(id)
    } else if roll < 75 {
        table.call(id)
    } else {
        let amount = max_bet + rng.random_range(0..=max_bet + big_blind);
        table.bet(id, amount.min(chips))
    };
    prop_assert!(result.is_ok(), "legal action rejected: {:?}", result);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn test_chips_are_conserved_across_hands(
        stacks in prop::collection::vec(25u32..1500, 2..=6),
        seed in any::<u64>(),
    ) {
        let total: u32 = stacks.iter().sum();
        let (mut table, _) = table(&stacks);
        let mut rng = StdRng::seed_from_u64(seed);

        for hand in 1..=4u64 {
            if table.new_game().is_err() || table.state() != TableState::Started {
                break;
            }
            let mut actions = 0;
            while table.state() == TableState::Started {
                act(&mut table, &mut rng)?;
                prop_assert_eq!(table.chips_in_play(), total);
                actions += 1;
                prop_assert!(actions < 1_000, "hand never finished");
            }

            prop_assert_eq!(table.state(), TableState::Ended);
            table.fire(TimerEvent::EndGame { hand });
            prop_assert_eq!(committed(&table), 0);
            let stacks: u32 = table.players().iter().map(|player| player.chips).sum();
            prop_assert_eq!(stacks, total);
            table.drain_commands();
            table.drain_schedule();
        }
    }

    #[test]
    fn test_pots_partition_every_all_in(
        stacks in prop::collection::vec(30u32..600, 3..=6),
    ) {
        let total: u32 = stacks.iter().sum();
        let (mut table, _) = table(&stacks);
        table.new_game().unwrap();

        // Everyone shoves or calls off their stack.
        while table.state() == TableState::Started {
            let id = table.current_player().unwrap();
            let chips = table.player(id).unwrap().chips;
            table.bet(id, chips).unwrap();
        }

        let stacks_left: u32 = table.players().iter().map(|player| player.chips).sum();
        prop_assert_eq!(committed(&table) + stacks_left, total);
        for pot in table.side_pots() {
            prop_assert!(pot.players().len() >= 2);
            prop_assert!(pot.amount() > 0);
        }
        // At most one player gets anything back, and only the biggest stack.
        let refunded: Vec<_> = table.players().iter().filter(|player| player.chips > 0).collect();
        prop_assert!(refunded.len() <= 1);
    }
}

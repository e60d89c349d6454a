//! Random bots that play through a [`TableHandle`].

use holdem_table::{Chips, Command, PlayerId, TableError, TableHandle, table::TableSnapshot};
use rand::{Rng, SeedableRng, rngs::StdRng};
use tokio::sync::mpsc;

/// What a bot decided to do on its turn
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Decision {
    Fold,
    Check,
    Call,
    /// Chips to add on top of what is already in this round
    Bet(Chips),
}

/// The betting situation a bot sees on its turn
#[derive(Clone, Copy, Debug)]
pub struct Spot {
    pub chips: Chips,
    pub paid: Chips,
    pub max_bet: Chips,
    pub big_blind: Chips,
}

impl Spot {
    fn from_snapshot(snapshot: &TableSnapshot, me: PlayerId) -> Option<Self> {
        let player = snapshot.players.iter().find(|player| player.id == me)?;
        let max_bet = snapshot
            .players
            .iter()
            .filter_map(|player| player.bet.map(|bet| bet.amount))
            .max()
            .unwrap_or(0);
        Some(Self {
            chips: player.chips,
            paid: player.bet.map_or(0, |bet| bet.amount),
            max_bet,
            big_blind: snapshot.big_blind,
        })
    }

    fn owed(&self) -> Chips {
        self.max_bet.saturating_sub(self.paid)
    }
}

/// Pick a legal action at random, leaning towards staying in the hand.
pub fn decide<R: Rng + ?Sized>(rng: &mut R, spot: Spot) -> Decision {
    if spot.chips == 0 {
        return Decision::Check;
    }
    let roll = rng.random_range(0..100);
    let owed = spot.owed();

    if owed == 0 {
        return if roll < 70 {
            Decision::Check
        } else {
            raise(rng, spot)
        };
    }
    match roll {
        0..20 => Decision::Fold,
        20..85 => Decision::Call,
        _ => raise(rng, spot),
    }
}

fn raise<R: Rng + ?Sized>(rng: &mut R, spot: Spot) -> Decision {
    let extra = spot.big_blind * rng.random_range(1..=4);
    let amount = spot.owed().max(spot.max_bet) + extra;
    Decision::Bet(amount.min(spot.chips))
}

/// Play `player_id`'s turns until the table closes.
pub async fn run(
    table: TableHandle,
    player_id: PlayerId,
    mut commands: mpsc::Receiver<Command>,
    seed: Option<u64>,
) {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    while let Some(command) = commands.recv().await {
        match command {
            Command::CurrentPlayer { player_id: current } if current == player_id => {
                if let Err(err) = act(&table, player_id, &mut rng).await {
                    match err {
                        TableError::TableClosed => break,
                        // Another action moved the hand on first.
                        TableError::NotYourTurn | TableError::HandNotInProgress => {}
                        err => log::warn!("Bot {} action rejected: {}", player_id, err),
                    }
                }
            }
            Command::TableClosed { .. } => break,
            _ => {}
        }
    }
    log::debug!("Bot {} leaving", player_id);
}

async fn act(table: &TableHandle, me: PlayerId, rng: &mut StdRng) -> Result<(), TableError> {
    let snapshot = table.state().await?;
    if snapshot.current_player != Some(me) {
        return Err(TableError::NotYourTurn);
    }
    let Some(spot) = Spot::from_snapshot(&snapshot, me) else {
        return Err(TableError::PlayerNotFound(me));
    };

    match decide(rng, spot) {
        Decision::Fold => table.fold(me).await,
        Decision::Check => table.check(me).await,
        Decision::Call => table.call(me).await,
        Decision::Bet(amount) => table.bet(me, amount).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spot(chips: Chips, paid: Chips, max_bet: Chips) -> Spot {
        Spot {
            chips,
            paid,
            max_bet,
            big_blind: 20,
        }
    }

    #[test]
    fn test_never_folds_when_nothing_owed() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..500 {
            let decision = decide(&mut rng, spot(500, 20, 20));
            assert!(matches!(decision, Decision::Check | Decision::Bet(_)));
        }
    }

    #[test]
    fn test_never_checks_when_facing_a_bet() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..500 {
            let decision = decide(&mut rng, spot(500, 0, 60));
            assert_ne!(decision, Decision::Check);
        }
    }

    #[test]
    fn test_bets_are_legal() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..500 {
            let spot = spot(500, 10, 60);
            if let Decision::Bet(amount) = decide(&mut rng, spot) {
                assert!(amount > 0);
                assert!(amount <= spot.chips);
                assert!(amount >= spot.max_bet || amount == spot.chips);
            }
        }
    }

    #[test]
    fn test_short_stack_raise_is_all_in() {
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..200 {
            if let Decision::Bet(amount) = decide(&mut rng, spot(50, 0, 40)) {
                assert_eq!(amount, 50);
            }
        }
    }
}

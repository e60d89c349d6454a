//! Multi-table Hold'em simulator using the async actor model.
//!
//! Spawns tables through a `TableManager`, seats random bots at each one
//! and lets the tables deal hands on their own timers until the requested
//! number of hands has been played.

mod bots;
mod config;

use anyhow::Error;
use ctrlc::set_handler;
use holdem_table::{Chips, Command, PlayerId, TableHandle, TableManager};
use log::info;
use pico_args::Arguments;
use std::time::Duration;
use tokio::time::timeout;

use crate::config::{Overrides, SimConfig};

const HELP: &str = "\
Run Hold'em tables seated with random bots

USAGE:
  ht_sim [OPTIONS]

OPTIONS:
  --tables     N           Number of tables to run      [default: env SIM_TABLES or 1]
  --players    N           Bots seated at each table    [default: env SIM_PLAYERS or 6]
  --chips      N           Starting stack of every bot  [default: env PLAYER_CHIPS or 1000]
  --hands      N           Hands to play per table      [default: env SIM_HANDS or 50]
  --seed       N           Seed for reproducible runs   [default: env SIM_SEED or random]

FLAGS:
  -h, --help               Print help information
  --json                   Print every public table command as a JSON line

ENVIRONMENT:
  TABLE_SMALL_BLIND        Small blind                  [default: 10]
  TABLE_BIG_BLIND          Big blind                    [default: 20]
  TABLE_MIN_PLAYERS        Players needed to deal       [default: 2]
  TABLE_MAX_PLAYERS        Seats per table              [default: 9]
  END_GAME_DELAY_MS        Pause before the payout      [default: 200]
  NEXT_GAME_DELAY_MS       Pause before the next deal   [default: 500]
  RUST_LOG                 Log filter                   [default: info]
";

/// Slack on top of the next-hand delay before a quiet table counts as stuck
const IDLE_GRACE: Duration = Duration::from_secs(5);

struct Args {
    overrides: Overrides,
    json: bool,
}

/// How one table's run ended
#[derive(Debug)]
struct TableSummary {
    table_id: u64,
    hands: u64,
    stacks: Vec<(String, Chips)>,
    winner: Option<PlayerId>,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        json: pargs.contains("--json"),
        overrides: Overrides {
            num_tables: pargs.opt_value_from_str("--tables")?,
            players_per_table: pargs.opt_value_from_str("--players")?,
            starting_chips: pargs.opt_value_from_str("--chips")?,
            hands_per_table: pargs.opt_value_from_str("--hands")?,
            seed: pargs.opt_value_from_str("--seed")?,
        },
    };

    // Catching signals for exit.
    set_handler(|| std::process::exit(0))?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_target(false)
        .init();

    let config = SimConfig::from_env(args.overrides);
    config.validate()?;

    info!(
        "Starting {} table(s) with {} bots each, {} hands per table",
        config.num_tables, config.players_per_table, config.hands_per_table
    );

    let manager = TableManager::new();
    let mut runs = Vec::with_capacity(config.num_tables);
    for index in 0..config.num_tables {
        let table_id = manager.create_table(config.table_config(index)).await?;
        let Some(table) = manager.get_table(table_id).await else {
            anyhow::bail!("table {table_id} vanished right after creation");
        };
        runs.push(tokio::spawn(run_table(
            table,
            config.clone(),
            index,
            args.json,
        )));
    }

    for run in runs {
        match run.await? {
            Ok(summary) => report(&summary),
            Err(err) => log::error!("Table run failed: {err}"),
        }
    }

    info!("{} table(s) still open", manager.active_table_count().await);
    Ok(())
}

/// Seat the bots, deal the first hand and watch the table until it has
/// played enough hands or closes on its own.
async fn run_table(
    table: TableHandle,
    config: SimConfig,
    index: usize,
    json: bool,
) -> Result<TableSummary, Error> {
    let table_id = table.table_id();
    let mut observer = table.subscribe(None).await?;

    for seat in 0..config.players_per_table {
        let name = format!("bot-{}-{}", index + 1, seat + 1);
        let player_id = table.add_player(&name, config.starting_chips).await?;
        // Subscribe before the first deal so no turn is missed.
        let commands = table.subscribe(Some(player_id)).await?;
        let seed = config
            .seed
            .map(|seed| seed.wrapping_mul(1_000).wrapping_add((index * 100 + seat) as u64));
        tokio::spawn(bots::run(table.clone(), player_id, commands, seed));
    }

    table.new_game().await?;

    let mut hands = 0;
    let mut winner = None;
    let mut stacks = Vec::new();
    let idle = Duration::from_millis(config.table_defaults.next_game_delay_ms) + IDLE_GRACE;
    loop {
        let command = match timeout(idle, observer.recv()).await {
            Ok(Some(command)) => command,
            Ok(None) => break,
            Err(_) => {
                // Nothing dealt the next hand, most likely too few players left.
                let Ok(snapshot) = table.state().await else {
                    break;
                };
                log::warn!(
                    "Table {} idle in state {:?} with {} player(s), closing",
                    table_id,
                    snapshot.state,
                    snapshot.players.len()
                );
                close(&table).await;
                continue;
            }
        };
        if json {
            println!("{}", serde_json::to_string(&command)?);
        }
        match command {
            Command::GameWinners(winners) => {
                for entry in winners {
                    log::debug!("Table {}: {}", table_id, entry);
                }
            }
            Command::GameEnded { hand } => {
                hands = hand;
                if let Ok(snapshot) = table.state().await {
                    stacks = snapshot
                        .players
                        .iter()
                        .map(|player| (player.name.clone(), player.chips))
                        .collect();
                }
                if hands >= config.hands_per_table {
                    close(&table).await;
                }
            }
            Command::TableClosed { winner: last } => {
                winner = last;
                break;
            }
            _ => {}
        }
    }

    Ok(TableSummary {
        table_id,
        hands,
        stacks,
        winner,
    })
}

async fn close(table: &TableHandle) {
    if let Err(err) = table.close().await {
        log::debug!("Table {} already gone: {}", table.table_id(), err);
    }
}

fn report(summary: &TableSummary) {
    info!(
        "Table {} finished after {} hand(s)",
        summary.table_id, summary.hands
    );
    if let Some(winner) = summary.winner {
        info!("Table {}: last player standing {}", summary.table_id, winner);
    }
    for (name, chips) in &summary.stacks {
        info!("  {name:<12} {chips:>8}");
    }
}

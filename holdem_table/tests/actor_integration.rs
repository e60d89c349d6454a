//! Table actor integration tests
//!
//! The actor is spawned on a paused tokio clock so the end-of-hand timers
//! can be observed without real waiting.

use holdem_table::{
    Command, PlayerId, RoundType, Table, TableActor, TableConfig, TableError, TableHandle,
    TableState,
};
use std::time::Duration;
use tokio::{sync::mpsc, time::Instant};

fn spawn_table(config: TableConfig) -> TableHandle {
    let table = Table::new(config).unwrap();
    let (actor, handle) = TableActor::new(1, table);
    tokio::spawn(actor.run());
    handle
}

fn config() -> TableConfig {
    TableConfig {
        name: "actor".to_string(),
        seed: Some(41),
        ..Default::default()
    }
}

async fn seat(handle: &TableHandle, stacks: &[u32]) -> Vec<PlayerId> {
    let mut ids = Vec::new();
    for (i, &chips) in stacks.iter().enumerate() {
        ids.push(handle.add_player(&format!("p{}", i + 1), chips).await.unwrap());
    }
    ids
}

/// Everything already published to `receiver`.
fn pending(receiver: &mut mpsc::Receiver<Command>) -> Vec<Command> {
    let mut commands = Vec::new();
    while let Ok(command) = receiver.try_recv() {
        commands.push(command);
    }
    commands
}

#[tokio::test(start_paused = true)]
async fn test_actions_through_the_handle() {
    let handle = spawn_table(config());
    let ids = seat(&handle, &[1000, 1000, 1000]).await;
    handle.new_game().await.unwrap();

    handle.call(ids[2]).await.unwrap();
    handle.call(ids[0]).await.unwrap();
    assert_eq!(
        handle.check(ids[0]).await,
        Err(TableError::NotYourTurn)
    );
    handle.check(ids[1]).await.unwrap();

    let snapshot = handle.state().await.unwrap();
    assert_eq!(snapshot.state, TableState::Started);
    assert_eq!(snapshot.round, Some(RoundType::Flop));
    assert_eq!(snapshot.pot, 60);
    assert_eq!(snapshot.board.len(), 3);
    assert_eq!(snapshot.current_player, Some(ids[0]));
    // Snapshots never leak hole cards.
    assert!(snapshot.players.iter().all(|player| player.cards.is_empty()));
}

#[tokio::test(start_paused = true)]
async fn test_timers_settle_and_deal_the_next_hand() {
    let handle = spawn_table(config());
    let ids = seat(&handle, &[1000, 1000]).await;
    let mut observer = handle.subscribe(None).await.unwrap();
    handle.new_game().await.unwrap();

    let finished = Instant::now();
    handle.fold(ids[1]).await.unwrap();
    assert_eq!(handle.state().await.unwrap().state, TableState::Ended);

    let mut ended_after = None;
    loop {
        let command = observer.recv().await.unwrap();
        match command {
            Command::GameEnded { hand: 1 } => ended_after = Some(finished.elapsed()),
            Command::GameStarted { hand: 2 } => break,
            _ => {}
        }
    }
    let started_after = finished.elapsed();

    let ended_after = ended_after.unwrap();
    assert!(ended_after >= Duration::from_secs(2));
    assert!(ended_after < Duration::from_secs(5));
    assert!(started_after >= Duration::from_secs(5));

    let snapshot = handle.state().await.unwrap();
    assert_eq!(snapshot.hand, Some(2));
    assert_eq!(snapshot.state, TableState::Started);
}

#[tokio::test(start_paused = true)]
async fn test_close_drops_pending_timers() {
    let handle = spawn_table(config());
    let ids = seat(&handle, &[1000, 1000]).await;
    let mut observer = handle.subscribe(None).await.unwrap();
    handle.new_game().await.unwrap();
    handle.fold(ids[1]).await.unwrap();
    pending(&mut observer);

    handle.close().await.unwrap();

    let mut rest = Vec::new();
    while let Some(command) = observer.recv().await {
        rest.push(command);
    }
    assert_eq!(rest, vec![Command::TableClosed { winner: None }]);
}

#[tokio::test(start_paused = true)]
async fn test_hole_cards_reach_only_their_owner() {
    let handle = spawn_table(config());
    let ids = seat(&handle, &[1000, 1000, 1000]).await;
    let mut mine = handle.subscribe(Some(ids[0])).await.unwrap();
    let mut observer = handle.subscribe(None).await.unwrap();

    handle.new_game().await.unwrap();

    let private: Vec<PlayerId> = pending(&mut mine)
        .iter()
        .filter_map(|command| match command {
            Command::HoleCards { player_id, cards } => {
                assert_eq!(cards.len(), 2);
                Some(*player_id)
            }
            _ => None,
        })
        .collect();
    assert_eq!(private, vec![ids[0]]);

    let public = pending(&mut observer);
    assert!(public.iter().any(|command| matches!(command, Command::GameStarted { hand: 1 })));
    assert!(
        !public
            .iter()
            .any(|command| matches!(command, Command::HoleCards { .. }))
    );
}

#[tokio::test(start_paused = true)]
async fn test_disconnected_player_is_folded_by_the_table() {
    let handle = spawn_table(config());
    let ids = seat(&handle, &[1000, 1000, 1000]).await;
    handle.new_game().await.unwrap();

    handle.mark_disconnected(ids[2]).await.unwrap();
    let snapshot = handle.state().await.unwrap();
    let folded: Vec<bool> = snapshot.players.iter().map(|player| player.folded).collect();
    assert_eq!(folded, vec![false, false, true]);
    assert_eq!(snapshot.current_player, Some(ids[0]));

    handle.mark_reconnected(ids[2]).await.unwrap();
    let snapshot = handle.state().await.unwrap();
    assert!(snapshot.players.iter().all(|player| !player.disconnected));
}

#[tokio::test(start_paused = true)]
async fn test_handle_fails_once_the_table_is_gone() {
    let handle = spawn_table(config());
    let ids = seat(&handle, &[1000, 1000]).await;
    handle.close().await.unwrap();

    assert_eq!(handle.state().await.unwrap_err(), TableError::TableClosed);
    assert_eq!(handle.new_game().await, Err(TableError::TableClosed));
    assert_eq!(handle.fold(ids[0]).await, Err(TableError::TableClosed));
    assert!(handle.subscribe(None).await.is_err());
}

//! Table manager for spawning and managing multiple table actors.

use serde::{Deserialize, Serialize};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;

use super::{
    actor::{TableActor, TableHandle},
    config::TableConfig,
    engine::{Table, TableSnapshot, TableState},
    errors::{ConfigError, TableError, TableResult},
    messages::TableId,
};
use crate::game::entities::Chips;

/// Table metadata for discovery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableMetadata {
    pub id: TableId,
    pub name: String,
    pub player_count: usize,
    pub max_players: usize,
    pub small_blind: Chips,
    pub big_blind: Chips,
    pub state: TableState,
}

impl TableMetadata {
    fn new(id: TableId, snapshot: TableSnapshot) -> Self {
        Self {
            id,
            name: snapshot.name,
            player_count: snapshot.players.len(),
            max_players: snapshot.max_players,
            small_blind: snapshot.small_blind,
            big_blind: snapshot.big_blind,
            state: snapshot.state,
        }
    }
}

/// Table manager for managing multiple table instances
#[derive(Clone, Default)]
pub struct TableManager {
    /// Active table handles
    tables: Arc<RwLock<HashMap<TableId, TableHandle>>>,

    /// Next table ID
    next_table_id: Arc<RwLock<TableId>>,
}

impl TableManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `config`, then spawn a table actor for it.
    ///
    /// Must be called from within a Tokio runtime.
    pub async fn create_table(&self, config: TableConfig) -> Result<TableId, ConfigError> {
        let table = Table::new(config)?;

        let mut next_id = self.next_table_id.write().await;
        *next_id += 1;
        let table_id = *next_id;
        drop(next_id);

        let name = table.config().name.clone();
        let (actor, handle) = TableActor::new(table_id, table);

        let mut tables = self.tables.write().await;
        tables.insert(table_id, handle);
        drop(tables);

        tokio::spawn(actor.run());

        log::info!("Created and spawned table {} '{}'", table_id, name);

        Ok(table_id)
    }

    /// Get a table handle
    pub async fn get_table(&self, table_id: TableId) -> Option<TableHandle> {
        let tables = self.tables.read().await;
        tables.get(&table_id).cloned()
    }

    /// List all live tables. Tables whose actor has stopped are forgotten.
    pub async fn list_tables(&self) -> Vec<TableMetadata> {
        let handles: Vec<TableHandle> = self.tables.read().await.values().cloned().collect();

        let mut metadata = Vec::with_capacity(handles.len());
        let mut stopped = Vec::new();
        for handle in handles {
            match handle.state().await {
                Ok(snapshot) => metadata.push(TableMetadata::new(handle.table_id(), snapshot)),
                Err(_) => stopped.push(handle.table_id()),
            }
        }

        if !stopped.is_empty() {
            let mut tables = self.tables.write().await;
            for table_id in stopped {
                log::debug!("Forgetting stopped table {}", table_id);
                tables.remove(&table_id);
            }
        }

        metadata.sort_by_key(|table| table.id);
        metadata
    }

    /// Close a table. Closing a table that already stopped is not an error.
    pub async fn close_table(&self, table_id: TableId) -> TableResult<()> {
        let handle = self
            .tables
            .write()
            .await
            .remove(&table_id)
            .ok_or(TableError::TableClosed)?;

        match handle.close().await {
            Ok(()) | Err(TableError::TableClosed) => {}
            Err(err) => return Err(err),
        }

        log::info!("Closed table {}", table_id);
        Ok(())
    }

    pub async fn active_table_count(&self) -> usize {
        self.tables.read().await.len()
    }
}

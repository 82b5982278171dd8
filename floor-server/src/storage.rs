//! redb-based storage layer for the floor
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `tables` | `table_id` | `DiningTable` | Table registry |
//! | `table_states` | `table_id` | `TableState` | Live status per table |
//! | `combinations` | `combination_id` | `Combination` | Active and dissolved combinations |
//!
//! # Durability
//!
//! Every engine operation is written as one [`FloorWrite`] inside a single
//! write transaction. A multi-table change (combination create/dissolve)
//! therefore lands completely or not at all.

use redb::{
    Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition,
    WriteTransaction,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::models::{Combination, DiningTable, TableState};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Every floor table is keyed by snowflake id with a JSON value
type RecordTable = TableDefinition<'static, i64, &'static [u8]>;

/// key = table_id, value = JSON-serialized DiningTable
const TABLES_TABLE: RecordTable = TableDefinition::new("tables");

/// key = table_id, value = JSON-serialized TableState
const STATES_TABLE: RecordTable = TableDefinition::new("table_states");

/// key = combination_id, value = JSON-serialized Combination
const COMBINATIONS_TABLE: RecordTable = TableDefinition::new("combinations");

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Records changed by one floor operation
#[derive(Debug, Clone, Default)]
pub struct FloorWrite {
    pub tables: Vec<DiningTable>,
    pub states: Vec<TableState>,
    pub combinations: Vec<Combination>,
}

impl FloorWrite {
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty() && self.states.is_empty() && self.combinations.is_empty()
    }
}

/// Everything persisted, as loaded at startup
#[derive(Debug, Clone, Default)]
pub struct StoredFloor {
    pub tables: Vec<DiningTable>,
    pub states: Vec<TableState>,
    pub combinations: Vec<Combination>,
}

/// Floor storage backed by redb
#[derive(Clone)]
pub struct FloorStorage {
    db: Arc<Database>,
}

impl FloorStorage {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (tests and throwaway nodes)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(TABLES_TABLE)?;
            let _ = write_txn.open_table(STATES_TABLE)?;
            let _ = write_txn.open_table(COMBINATIONS_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Persist one operation atomically
    pub fn commit(&self, write: &FloorWrite) -> StorageResult<()> {
        if write.is_empty() {
            return Ok(());
        }

        let txn = self.db.begin_write()?;
        for table in &write.tables {
            put(&txn, TABLES_TABLE, table.id, table)?;
        }
        for state in &write.states {
            put(&txn, STATES_TABLE, state.table_id, state)?;
        }
        for combination in &write.combinations {
            put(&txn, COMBINATIONS_TABLE, combination.id, combination)?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Load every persisted record
    pub fn load(&self) -> StorageResult<StoredFloor> {
        Ok(StoredFloor {
            tables: self.read_all(TABLES_TABLE)?,
            states: self.read_all(STATES_TABLE)?,
            combinations: self.read_all(COMBINATIONS_TABLE)?,
        })
    }

    pub fn get_table(&self, id: i64) -> StorageResult<Option<DiningTable>> {
        self.read_one(TABLES_TABLE, id)
    }

    pub fn get_state(&self, table_id: i64) -> StorageResult<Option<TableState>> {
        self.read_one(STATES_TABLE, table_id)
    }

    pub fn get_combination(&self, id: i64) -> StorageResult<Option<Combination>> {
        self.read_one(COMBINATIONS_TABLE, id)
    }

    fn read_one<T: DeserializeOwned>(
        &self,
        def: RecordTable,
        key: i64,
    ) -> StorageResult<Option<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(def)?;
        match table.get(key)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    fn read_all<T: DeserializeOwned>(
        &self,
        def: RecordTable,
    ) -> StorageResult<Vec<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(def)?;

        let mut records = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            records.push(serde_json::from_slice(value.value())?);
        }
        Ok(records)
    }

    /// Get storage statistics
    pub fn get_stats(&self) -> StorageResult<StorageStats> {
        let read_txn = self.db.begin_read()?;

        let tables = read_txn.open_table(TABLES_TABLE)?;
        let states = read_txn.open_table(STATES_TABLE)?;
        let combinations = read_txn.open_table(COMBINATIONS_TABLE)?;

        Ok(StorageStats {
            table_count: tables.len()?,
            state_count: states.len()?,
            combination_count: combinations.len()?,
        })
    }
}

fn put<T: Serialize>(
    txn: &WriteTransaction,
    def: RecordTable,
    key: i64,
    value: &T,
) -> StorageResult<()> {
    let bytes = serde_json::to_vec(value)?;
    let mut table = txn.open_table(def)?;
    table.insert(key, bytes.as_slice())?;
    Ok(())
}

/// Storage statistics
#[derive(Debug, Clone, serde::Serialize)]
pub struct StorageStats {
    pub table_count: u64,
    pub state_count: u64,
    pub combination_count: u64,
}

//! In-process store for dry runs and tests

use async_trait::async_trait;
use sea_orm::DbErr;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::error::PersistenceError;
use crate::model::RowBatch;
use crate::persist::{Persister, RowCount};

/// Keeps every appended batch in memory, keyed by table name.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<&'static str, Vec<RowBatch>>>,
    failing: Mutex<HashSet<&'static str>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later append to `table` fail.
    pub fn fail_table(&self, table: &'static str) {
        lock(&self.failing).insert(table);
    }

    pub fn row_count(&self, table: &str) -> usize {
        lock(&self.tables)
            .get(table)
            .map(|batches| batches.iter().map(RowBatch::len).sum())
            .unwrap_or(0)
    }

    pub fn batches(&self, table: &str) -> Vec<RowBatch> {
        lock(&self.tables).get(table).cloned().unwrap_or_default()
    }

    /// Row counts for every table that received at least one batch.
    pub fn summary(&self) -> HashMap<&'static str, usize> {
        lock(&self.tables)
            .iter()
            .map(|(table, batches)| (*table, batches.iter().map(RowBatch::len).sum()))
            .collect()
    }
}

#[async_trait]
impl Persister for MemoryStore {
    async fn append(&self, batch: &RowBatch) -> Result<RowCount, PersistenceError> {
        let table = batch.table_name();
        if lock(&self.failing).contains(table) {
            return Err(PersistenceError {
                table,
                rows: batch.len(),
                source: DbErr::Custom(format!("table {} is unavailable", table)),
            });
        }

        if batch.is_empty() {
            return Ok(0);
        }

        lock(&self.tables).entry(table).or_default().push(batch.clone());
        Ok(batch.len() as RowCount)
    }
}

// A poisoned lock only means another test thread panicked mid-append; the map is still usable.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

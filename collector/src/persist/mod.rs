//! Append-only persistence
//!
//! A batch lands in the table named by its dataset. There is no existence
//! check and no upsert: appending the same rows twice stores them twice.

pub mod memory;
pub mod sea_orm_store;

pub use memory::MemoryStore;
pub use sea_orm_store::SeaOrmStore;

use async_trait::async_trait;

use crate::error::PersistenceError;
use crate::model::RowBatch;

/// Number of rows a successful append added to its table.
pub type RowCount = u64;

#[async_trait]
pub trait Persister: Send + Sync {
    /// Append `batch` to `batch.table_name()`.
    async fn append(&self, batch: &RowBatch) -> Result<RowCount, PersistenceError>;
}

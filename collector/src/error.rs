//! Error taxonomy for the collection pipeline.
//!
//! Fetch, normalize and persist each return their own error type so the
//! orchestrator can attribute a failed unit of work to the stage that broke.

use thiserror::Error;

/// Upstream exchange request failed or returned something unusable.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request to {endpoint} failed: {source}")]
    Request {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned HTTP {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("could not decode {endpoint} response: {reason}")]
    Decode { endpoint: String, reason: String },
}

/// A raw field could not be coerced into its canonical type.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("schema violation at row {row}, field `{field}`: {reason}")]
pub struct SchemaViolation {
    pub row: usize,
    pub field: &'static str,
    pub reason: String,
}

impl SchemaViolation {
    pub fn new(row: usize, field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            row,
            field,
            reason: reason.into(),
        }
    }
}

/// Appending a batch to the store failed. Nothing from this batch is assumed written.
#[derive(Error, Debug)]
#[error("failed to append {rows} rows to {table}: {source}")]
pub struct PersistenceError {
    pub table: &'static str,
    pub rows: usize,
    #[source]
    pub source: sea_orm::DbErr,
}

#[derive(Error, Debug)]
pub enum CollectorError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("only {found} symbols qualify for ranking, {required} required")]
    InsufficientCandidates { found: usize, required: usize },

    #[error(transparent)]
    SchemaViolation(#[from] SchemaViolation),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl CollectorError {
    /// Short stage label used in logs and the run manifest.
    pub fn kind(&self) -> &'static str {
        match self {
            CollectorError::Fetch(_) => "fetch",
            CollectorError::InsufficientCandidates { .. } => "insufficient_candidates",
            CollectorError::SchemaViolation(_) => "schema_violation",
            CollectorError::Persistence(_) => "persistence",
        }
    }
}

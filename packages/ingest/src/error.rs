//! Typed errors for the ingestion pipeline.
//!
//! Fetch failures come from `remotive_client::RemotiveError`; the
//! transformer and loader define their own below.

use thiserror::Error;

/// A publication date that could not be read as a calendar date.
///
/// Field-level only: the transformer substitutes a missing date and keeps the row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unparseable publication date: {raw:?}")]
pub struct DateParseError {
    pub raw: String,
}

/// Errors raised while writing a batch. The batch is rolled back before
/// any of these reach the caller.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("database connection failed: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("failed to ensure postings table: {0}")]
    Schema(#[source] sqlx::Error),

    #[error("failed to begin transaction: {0}")]
    Begin(#[source] sqlx::Error),

    #[error("failed to insert posting {id} (row {row}): {source}")]
    Insert {
        row: usize,
        id: i32,
        #[source]
        source: sqlx::Error,
    },

    #[error("failed to commit batch: {0}")]
    Commit(#[source] sqlx::Error),
}

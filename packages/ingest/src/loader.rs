//! Batch loader for the `postings` table.
//!
//! Each call opens its own connection, writes the whole batch in one
//! transaction with insert-or-ignore semantics, and closes the connection
//! whatever the outcome. A failed insert rolls back every row of the batch.

use serde::Serialize;
use sqlx::postgres::PgConnectOptions;
use sqlx::{Connection, PgConnection};
use tracing::{debug, error, info, warn};

use crate::error::LoadError;
use crate::posting::Posting;

/// What one committed batch did to the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub attempted: usize,
    pub inserted: usize,
    /// Rows whose id was already present.
    pub skipped: usize,
}

/// Loads batches into Postgres over a fresh, unpooled connection per call.
#[derive(Debug, Clone)]
pub struct PostgresLoader {
    options: PgConnectOptions,
}

impl PostgresLoader {
    pub fn new(options: PgConnectOptions) -> Self {
        Self { options }
    }

    pub async fn load(&self, postings: &[Posting]) -> Result<LoadReport, LoadError> {
        let mut conn = PgConnection::connect_with(&self.options)
            .await
            .map_err(LoadError::Connect)?;
        debug!("Database connection is set");

        let result = load_batch(&mut conn, postings).await;

        if let Err(e) = conn.close().await {
            warn!(error = %e, "Failed to close database connection");
        }

        match &result {
            Ok(report) => info!(
                inserted = report.inserted,
                skipped = report.skipped,
                "Batch loaded into postings"
            ),
            Err(e) => error!(error = %e, rows = postings.len(), "Batch rolled back"),
        }

        result
    }
}

/// Ensure the table, then insert every posting inside a single transaction.
pub async fn load_batch(
    conn: &mut PgConnection,
    postings: &[Posting],
) -> Result<LoadReport, LoadError> {
    Posting::ensure_table(conn).await.map_err(LoadError::Schema)?;

    let mut tx = conn.begin().await.map_err(LoadError::Begin)?;
    let mut inserted = 0;

    for (row, posting) in postings.iter().enumerate() {
        match posting.insert_ignore(&mut tx).await {
            Ok(true) => inserted += 1,
            Ok(false) => debug!(id = posting.id, "Posting already stored"),
            Err(source) => {
                if let Err(e) = tx.rollback().await {
                    warn!(error = %e, "Rollback failed; transaction is discarded on close");
                }
                return Err(LoadError::Insert {
                    row,
                    id: posting.id,
                    source,
                });
            }
        }
    }

    tx.commit().await.map_err(LoadError::Commit)?;

    Ok(LoadReport {
        attempted: postings.len(),
        inserted,
        skipped: postings.len() - inserted,
    })
}

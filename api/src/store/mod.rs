//! Database access for stations and their readings.
//!
//! Every mutation runs inside its own transaction which is committed on
//! success and rolled back explicitly on failure.

pub mod readings;
pub mod stations;

use sqlx::{Postgres, Transaction};
use tracing::warn;

use crate::geo::EwktError;

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("Stored location could not be decoded: {0}")]
    Decode(#[from] EwktError),
}

/// Commits `tx` when `result` is `Ok`, otherwise rolls it back and hands the
/// original error back to the caller.
async fn finish<T>(
    tx: Transaction<'_, Postgres>,
    result: Result<T, PersistenceError>,
) -> Result<T, PersistenceError> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "Failed to roll back transaction");
            }
            Err(err)
        }
    }
}

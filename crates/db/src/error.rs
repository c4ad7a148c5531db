//! Store error classification and bounded execution.

use std::future::Future;
use std::time::Duration;

/// PostgreSQL SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Budget for single-row reads and writes.
pub const ROW_TIMEOUT: Duration = Duration::from_secs(3);

/// Categorized failure of a store call.
///
/// Not-found is not an error here: repositories return `Option`/`bool` so
/// callers decide which entity and id to report.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A `uq_*` unique constraint rejected the write.
    #[error("Duplicate value violates unique constraint: {0}")]
    Conflict(String),

    /// The call did not finish within its budget and was cancelled.
    #[error("Store call exceeded its {0:?} budget")]
    Timeout(Duration),

    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
                if let Some(constraint) = db_err.constraint() {
                    if constraint.starts_with("uq_") {
                        return StoreError::Conflict(constraint.to_string());
                    }
                }
            }
        }
        StoreError::Database(err)
    }
}

/// Run `fut` under `budget`. Dropping the future on expiry cancels the
/// in-flight query and rolls back any open transaction.
pub(crate) async fn bounded<T, F>(
    operation: &'static str,
    budget: Duration,
    fut: F,
) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(budget, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(operation, budget_ms = budget.as_millis() as u64, "Store call timed out");
            Err(StoreError::Timeout(budget))
        }
    }
}

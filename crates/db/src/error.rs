use catalog_core::error::CoreError;

/// Failure of a write that validates its input inside the transaction.
///
/// Reconciling writes re-read the current child rows under a row lock and
/// plan against them, so a submission can be rejected after the
/// transaction has begun. Either way nothing is committed.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// The submission does not fit the rows read under the lock.
    #[error(transparent)]
    Rejected(#[from] CoreError),

    /// The database failed; the transaction was rolled back.
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

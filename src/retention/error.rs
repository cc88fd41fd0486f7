use thiserror::Error;

use crate::db::DbError;

#[derive(Debug, Error)]
pub enum RetentionError {
    /// The audit event store could not be reached. Nothing was deleted.
    #[error("Audit event store unavailable: {0}")]
    StoreUnavailable(#[source] DbError),

    /// The retention period cannot produce a valid cutoff. Nothing was deleted.
    #[error("Invalid retention configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Audit event store error: {0}")]
    Store(#[source] DbError),
}

impl From<DbError> for RetentionError {
    fn from(err: DbError) -> Self {
        if err.is_unavailable() {
            RetentionError::StoreUnavailable(err)
        } else {
            RetentionError::Store(err)
        }
    }
}

impl RetentionError {
    /// Short label for metrics and structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            RetentionError::StoreUnavailable(_) => "store_unavailable",
            RetentionError::InvalidConfiguration(_) => "invalid_configuration",
            RetentionError::Store(_) => "store_error",
        }
    }
}

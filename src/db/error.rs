use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Database not configured")]
    NotConfigured,

    #[error("Not found")]
    NotFound,

    #[error("Validation error: {0}")]
    Validation(String),

    #[cfg(any(feature = "database-sqlite", feature = "database-postgres"))]
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[cfg(any(feature = "database-sqlite", feature = "database-postgres"))]
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DbError {
    /// Whether the error means the store could not be reached at all,
    /// as opposed to the store rejecting or failing a statement.
    pub fn is_unavailable(&self) -> bool {
        match self {
            DbError::NotConfigured => true,
            #[cfg(any(feature = "database-sqlite", feature = "database-postgres"))]
            DbError::Sqlx(err) => matches!(
                err,
                sqlx::Error::PoolTimedOut
                    | sqlx::Error::PoolClosed
                    | sqlx::Error::Io(_)
                    | sqlx::Error::Tls(_)
                    | sqlx::Error::WorkerCrashed
            ),
            _ => false,
        }
    }
}

pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_classification() {
        assert!(DbError::NotConfigured.is_unavailable());
        assert!(!DbError::NotFound.is_unavailable());
        assert!(!DbError::Internal("boom".into()).is_unavailable());
    }

    #[cfg(any(feature = "database-sqlite", feature = "database-postgres"))]
    #[test]
    fn test_pool_errors_are_unavailable() {
        assert!(DbError::from(sqlx::Error::PoolTimedOut).is_unavailable());
        assert!(DbError::from(sqlx::Error::PoolClosed).is_unavailable());
        assert!(
            DbError::from(sqlx::Error::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "refused",
            )))
            .is_unavailable()
        );
        assert!(!DbError::from(sqlx::Error::RowNotFound).is_unavailable());
    }
}

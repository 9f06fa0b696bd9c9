//! Repository contracts and their PostgreSQL implementations.
//!
//! Each aggregate exposes a command (write) trait and a query (read)
//! trait. Every operation returns `Result<_, RepositoryError>`: expected
//! conditions (not-found, ownership mismatch, constraint violations) are
//! typed values, transient infrastructure failures map to
//! `StoreUnavailable`, and nothing panics at this boundary.
//!
//! Ownership rules shared by all implementations:
//! - reads with a requesting owner treat foreign records as `NotFound`
//!   (another user's record must not be observably present);
//! - writes against a foreign record fail with `Unauthorized`, never
//!   silently succeed.

mod analysis_repository;
mod credit_repository;
mod document_repository;
mod idea_repository;
mod user_repository;

pub use analysis_repository::*;
pub use credit_repository::*;
pub use document_repository::*;
pub use idea_repository::*;
pub use user_repository::*;

use ideaforge_domain::errors::{MappingError, RepositoryError};
use tracing::error;

/// Convert a sqlx failure into the shared repository taxonomy.
///
/// Constraint violations are expected domain outcomes (a lost version
/// race, a duplicate insert); everything else from the driver is treated
/// as a transient store failure the caller may retry.
pub(crate) fn map_sqlx_err(err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::RowNotFound => RepositoryError::NotFound,
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepositoryError::ConstraintViolation(db.message().to_string())
        }
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            RepositoryError::ConstraintViolation(db.message().to_string())
        }
        other => RepositoryError::StoreUnavailable(other.to_string()),
    }
}

/// Convert a mapping failure, logging integrity violations loudly.
pub(crate) fn map_mapping_err(err: MappingError) -> RepositoryError {
    let converted: RepositoryError = err.into();
    if converted.is_integrity_violation() {
        error!(
            code = converted.error_code(),
            error = %converted,
            "Stored record failed integrity checks"
        );
    }
    converted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err = map_sqlx_err(sqlx::Error::RowNotFound);
        assert_eq!(err.error_code(), "NOT_FOUND");
    }

    #[test]
    fn test_driver_failures_are_retryable() {
        let err = map_sqlx_err(sqlx::Error::PoolTimedOut);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_corrupt_records_stay_corrupt() {
        let err = map_mapping_err(MappingError::corrupt("row-1", "bad discriminator"));
        assert_eq!(err.error_code(), "CORRUPT_RECORD");
        assert!(err.is_integrity_violation());
    }
}

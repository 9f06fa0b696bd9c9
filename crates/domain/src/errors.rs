//! Error types for the IdeaForge domain.
//!
//! The taxonomy separates expected, recoverable conditions (`NotFound`,
//! `Unauthorized`, `InvalidValue`) from integrity violations that indicate a
//! programming or data bug (`CorruptRecord`, `ImmutableRecord`) and from
//! transient infrastructure failures (`StoreUnavailable`). All of them are
//! returned as typed results; repositories never panic for an expected
//! condition.

use crate::category::HackathonTrack;
use crate::credit::TransactionType;

/// Value-object construction failures.
///
/// Raised when a raw primitive cannot be promoted into its validated
/// domain type. These are expected conditions the caller can recover from
/// (reject the input, ask the user again).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidValue {
    /// Score outside the 0-100 inclusive range
    #[error("Score out of range: {value} not in [0, 100]")]
    ScoreOutOfRange {
        /// The rejected raw value
        value: f64,
    },

    /// Locale code outside the supported set
    #[error("Unsupported locale: {code:?} (supported: {supported:?})")]
    UnsupportedLocale {
        /// The rejected code
        code: String,
        /// The closed set of supported codes
        supported: &'static [&'static str],
    },

    /// Document versions start at 1
    #[error("Invalid document version: {value} (versions start at 1)")]
    InvalidVersion {
        /// The rejected raw value
        value: i64,
    },

    /// General categories require a non-empty name
    #[error("Category name must not be empty")]
    EmptyCategoryName,

    /// Hackathon track outside the competition set
    #[error("Unknown hackathon track: {value:?} (known: {known:?})")]
    UnknownTrack {
        /// The rejected track code
        value: String,
        /// The closed set of known track codes
        known: &'static [&'static str],
    },

    /// Document type outside the enumerated set
    #[error("Unknown document type: {0:?}")]
    UnknownDocumentType(String),

    /// Transaction type outside the enumerated set
    #[error("Unknown transaction type: {0:?}")]
    UnknownTransactionType(String),

    /// Idea source outside the enumerated set
    #[error("Unknown idea source: {0:?}")]
    UnknownIdeaSource(String),

    /// Idea status outside the enumerated set
    #[error("Unknown idea status: {0:?}")]
    UnknownIdeaStatus(String),

    /// User tier outside the enumerated set
    #[error("Unknown user tier: {0:?}")]
    UnknownUserTier(String),

    /// Transaction amount sign disagrees with its type
    #[error("Amount {amount} not allowed for {tx_type:?} transactions")]
    InvalidAmount {
        /// The transaction type whose sign rule was violated
        tx_type: TransactionType,
        /// The rejected amount
        amount: i64,
    },

    /// Submitted idea/project text must not be empty
    #[error("Subject text must not be empty")]
    EmptyText,

    /// A hackathon analysis requires a hackathon-tagged category
    #[error("Expected a hackathon category, got general ({0:?})")]
    ExpectedHackathonCategory(String),
}

impl InvalidValue {
    /// Convenience constructor for an unknown track, listing the known set.
    pub fn unknown_track(value: impl Into<String>) -> Self {
        Self::UnknownTrack {
            value: value.into(),
            known: HackathonTrack::codes(),
        }
    }
}

/// Failures translating between stored records and domain entities.
#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    /// Stored discriminator and payload shape disagree.
    ///
    /// This is a data-integrity bug, never repaired with a best-effort
    /// guess; the offending record id is carried for diagnostics.
    #[error("Corrupt record {id}: {detail}")]
    CorruptRecord {
        /// Id of the offending record (as stored)
        id: String,
        /// What disagreed
        detail: String,
    },

    /// Payload column failed to deserialize
    #[error("Malformed payload for record {id}: {source}")]
    Malformed {
        /// Id of the offending record (as stored)
        id: String,
        /// Underlying deserialization failure
        #[source]
        source: serde_json::Error,
    },
}

impl MappingError {
    /// Build a corrupt-record error.
    pub fn corrupt(id: impl ToString, detail: impl Into<String>) -> Self {
        Self::CorruptRecord {
            id: id.to_string(),
            detail: detail.into(),
        }
    }

    /// Build a corrupt-record error from a stored scalar that failed
    /// value-object validation.
    pub fn invalid_stored(id: impl ToString, source: InvalidValue) -> Self {
        Self::CorruptRecord {
            id: id.to_string(),
            detail: format!("stored value failed validation: {source}"),
        }
    }

    /// Id of the record that failed to map.
    pub fn record_id(&self) -> &str {
        match self {
            Self::CorruptRecord { id, .. } | Self::Malformed { id, .. } => id,
        }
    }
}

/// Repository-level errors, shared by every storage backend.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// The requested record does not exist (or is hidden from the
    /// requesting owner, which must look identical)
    #[error("Not found")]
    NotFound,

    /// The record exists but belongs to a different user
    #[error("Unauthorized: record owned by another user")]
    Unauthorized,

    /// A raw stored or supplied value failed validation
    #[error("Invalid value: {0}")]
    InvalidValue(#[from] InvalidValue),

    /// Stored discriminator/payload mismatch (data-integrity bug)
    #[error("Corrupt record {id}: {detail}")]
    CorruptRecord {
        /// Id of the offending record
        id: String,
        /// What disagreed
        detail: String,
    },

    /// Attempted mutation of an append-only ledger entry
    #[error("Immutable record: credit transactions cannot be updated or deleted")]
    ImmutableRecord,

    /// Uniqueness or referential constraint rejected the write
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Transient infrastructure failure; callers may retry with backoff
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl RepositoryError {
    /// Machine-readable code for logs and API envelopes.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::InvalidValue(_) => "INVALID_VALUE",
            Self::CorruptRecord { .. } => "CORRUPT_RECORD",
            Self::ImmutableRecord => "IMMUTABLE_RECORD",
            Self::ConstraintViolation(_) => "CONSTRAINT_VIOLATION",
            Self::StoreUnavailable(_) => "STORE_UNAVAILABLE",
        }
    }

    /// Whether the caller may retry the operation with backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }

    /// Whether this error indicates a programming or data-integrity bug
    /// that must be surfaced loudly (error-severity logging) rather than
    /// handled as a normal domain outcome.
    pub fn is_integrity_violation(&self) -> bool {
        matches!(self, Self::CorruptRecord { .. } | Self::ImmutableRecord)
    }
}

impl From<MappingError> for RepositoryError {
    fn from(err: MappingError) -> Self {
        match err {
            MappingError::CorruptRecord { id, detail } => Self::CorruptRecord { id, detail },
            MappingError::Malformed { id, source } => Self::CorruptRecord {
                id,
                detail: format!("payload failed to deserialize: {source}"),
            },
        }
    }
}

/// Result alias for value-object construction.
pub type DomainResult<T> = Result<T, InvalidValue>;

/// Result alias for repository operations.
pub type RepoResult<T> = Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(RepositoryError::NotFound.error_code(), "NOT_FOUND");
        assert_eq!(
            RepositoryError::ImmutableRecord.error_code(),
            "IMMUTABLE_RECORD"
        );
    }

    #[test]
    fn test_retryable() {
        assert!(RepositoryError::StoreUnavailable("timeout".into()).is_retryable());
        assert!(!RepositoryError::NotFound.is_retryable());
        assert!(!RepositoryError::Unauthorized.is_retryable());
    }

    #[test]
    fn test_integrity_violations() {
        assert!(RepositoryError::ImmutableRecord.is_integrity_violation());
        assert!(RepositoryError::CorruptRecord {
            id: "x".into(),
            detail: "d".into()
        }
        .is_integrity_violation());
        assert!(!RepositoryError::NotFound.is_integrity_violation());
    }

    #[test]
    fn test_mapping_error_conversion() {
        let err: RepositoryError = MappingError::corrupt("abc", "missing category").into();
        assert_eq!(err.error_code(), "CORRUPT_RECORD");
    }

    #[test]
    fn test_mapping_error_record_id() {
        let err = MappingError::corrupt("abc", "missing category");
        assert_eq!(err.record_id(), "abc");
        let err = MappingError::invalid_stored("abc", InvalidValue::EmptyText);
        assert_eq!(err.record_id(), "abc");
    }
}

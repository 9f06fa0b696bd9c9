//! Application layer for IdeaForge
//!
//! Use-case services orchestrating the persistence core: creating and
//! curating ideas, generating and versioning documents, recording analyses
//! from the external scorer's output shape, and running the credit
//! deduct/refund flow. Also the flattened DTOs the presentation layer
//! serializes.
//!
//! ## Modules
//!
//! - `services` - IdeaService, DocumentService, AnalysisService,
//!   CreditService, plus the service context and event-publisher port
//! - `dto` - JSON-serializable views of entities
//! - `validation` - input-shape validation for caller-supplied requests

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dto;
pub mod services;
pub mod validation;

pub use services::{
    AnalysisOutcome, AnalysisService, CreditService, DocumentService, EventPublisher,
    IdeaService, NoOpEventPublisher, ServiceConfig, ServiceContext,
};
pub use validation::{CreateIdeaRequest, GenerateDocumentRequest, UpdateIdeaRequest, Validatable};

use ideaforge_domain::errors::RepositoryError;
use thiserror::Error;

/// Application-level errors.
#[derive(Error, Debug)]
pub enum ApplicationError {
    /// Resource not found (or hidden from the requesting user)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The acting user does not own the target record
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Caller-supplied value failed domain validation
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Request-shape validation failed
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// The user's balance cannot cover the action
    #[error("Insufficient credits: need {required}, have {available}")]
    InsufficientCredits {
        /// Credits the action costs
        required: i64,
        /// Credits currently available
        available: i64,
    },

    /// Concurrent writers collided; re-read and retry
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Stored data failed integrity checks (bug, surfaced loudly)
    #[error("Data integrity violation: {0}")]
    DataIntegrity(String),

    /// Transient store failure; retryable with backoff
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Anything unexpected
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Machine-readable code for API envelopes.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::ValidationFailed(_) => "VALIDATION_FAILED",
            Self::InsufficientCredits { .. } => "INSUFFICIENT_CREDITS",
            Self::Conflict(_) => "CONFLICT",
            Self::DataIntegrity(_) => "DATA_INTEGRITY",
            Self::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the caller may retry with backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ServiceUnavailable(_))
    }
}

impl From<RepositoryError> for ApplicationError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound("record".to_string()),
            RepositoryError::Unauthorized => {
                Self::Unauthorized("record owned by another user".to_string())
            }
            RepositoryError::InvalidValue(inner) => Self::InvalidInput(inner.to_string()),
            RepositoryError::CorruptRecord { id, detail } => {
                Self::DataIntegrity(format!("record {id}: {detail}"))
            }
            RepositoryError::ImmutableRecord => {
                Self::DataIntegrity("attempted mutation of an append-only record".to_string())
            }
            RepositoryError::ConstraintViolation(detail) => Self::Conflict(detail),
            RepositoryError::StoreUnavailable(detail) => Self::ServiceUnavailable(detail),
        }
    }
}

impl From<ideaforge_domain::errors::InvalidValue> for ApplicationError {
    fn from(err: ideaforge_domain::errors::InvalidValue) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

/// Result alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            ApplicationError::NotFound("x".into()).error_code(),
            "NOT_FOUND"
        );
        assert_eq!(
            ApplicationError::InsufficientCredits {
                required: 5,
                available: 2
            }
            .error_code(),
            "INSUFFICIENT_CREDITS"
        );
    }

    #[test]
    fn test_repository_error_conversion() {
        let err: ApplicationError = RepositoryError::ImmutableRecord.into();
        assert_eq!(err.error_code(), "DATA_INTEGRITY");

        let err: ApplicationError = RepositoryError::StoreUnavailable("down".into()).into();
        assert!(err.is_retryable());

        let err: ApplicationError = RepositoryError::ConstraintViolation("dup".into()).into();
        assert_eq!(err.error_code(), "CONFLICT");
    }
}

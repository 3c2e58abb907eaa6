//! Engine error taxonomy

use mockstack_core::ErrorCode;
use thiserror::Error;

/// Failures raised by the document-store engine.
///
/// The engine never retries and never partially applies an operation: every
/// error is raised synchronously as the operation's single outcome. Adapters
/// rewrap these into their client's exception type using [`DynamoError::code`]
/// for the stable code string and status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DynamoError {
    /// The operation referenced a table that does not exist.
    #[error("Requested resource not found")]
    ResourceNotFound,

    /// CreateTable named a table that already exists.
    #[error("Table already exists: {0}")]
    ResourceInUse(String),

    /// The request was malformed: a missing or mistyped key attribute, an
    /// unknown index, or a condition without defined semantics.
    #[error("{0}")]
    Validation(String),
}

impl DynamoError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Validation failure with the service's standard message preamble.
    pub fn invalid_parameter(detail: impl std::fmt::Display) -> Self {
        Self::Validation(format!(
            "One or more parameter values were invalid: {detail}"
        ))
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::ResourceNotFound => ErrorCode::ResourceNotFoundException,
            Self::ResourceInUse(_) => ErrorCode::ResourceInUseException,
            Self::Validation(_) => ErrorCode::ValidationException,
        }
    }
}

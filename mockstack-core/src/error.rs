//! Service error codes and formatting

use serde::Serialize;
use thiserror::Error;

/// Stable machine-readable error codes shared by the service emulators.
///
/// Adapters translate these into their client's exception hierarchy; the
/// code string and HTTP-like status are part of that contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    ResourceNotFoundException,
    ResourceInUseException,
    ValidationException,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ResourceNotFoundException => "ResourceNotFoundException",
            Self::ResourceInUseException => "ResourceInUseException",
            Self::ValidationException => "ValidationException",
        }
    }

    /// HTTP-like status an adapter should report for this code.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::ResourceNotFoundException
            | Self::ResourceInUseException
            | Self::ValidationException => 400,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A service failure as an adapter consumes it: code plus human message.
#[derive(Debug, Error)]
#[error("{code}: {message}")]
pub struct ServiceError {
    pub code: ErrorCode,
    pub message: String,
}

impl ServiceError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Format as a DynamoDB-style JSON error body.
    pub fn to_json(&self) -> String {
        #[derive(Serialize)]
        struct JsonError<'a> {
            #[serde(rename = "__type")]
            error_type: String,
            message: &'a str,
        }

        let error = JsonError {
            error_type: format!("com.amazonaws.dynamodb.v20120810#{}", self.code.as_str()),
            message: &self.message,
        };

        serde_json::to_string(&error).unwrap_or_else(|_| {
            format!(
                r#"{{"__type":"{}","message":"{}"}}"#,
                self.code.as_str(),
                self.message
            )
        })
    }
}

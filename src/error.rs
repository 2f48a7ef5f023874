//! Error handling for the event catalog

use crate::flyer_extraction::ExtractionRejection;
use serde::Serialize;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Action requires a session
    #[error("Not logged in")]
    Unauthenticated,

    /// Session present but lacks rights over the target
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Missing or invalid field
    #[error("Validation error: {0}")]
    Validation(String),

    /// Username already registered
    #[error("Username already taken: {0}")]
    DuplicateUsername(String),

    /// Username/password mismatch
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Flyer extraction ended in a rejection
    #[error("Flyer extraction rejected: {0}")]
    Extraction(#[from] ExtractionRejection),

    /// A newer upload replaced this extraction before it finished
    #[error("Flyer extraction superseded by a newer upload")]
    Superseded,

    /// Config error
    #[error("Config error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Caller-facing failure description
#[derive(Debug, Clone, Serialize)]
pub struct Failure {
    pub error_code: &'static str,
    pub message: String,
}

impl Error {
    /// Stable machine-readable code
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Unauthenticated => "UNAUTHENTICATED",
            Error::Unauthorized(_) => "UNAUTHORIZED",
            Error::Validation(_) => "VALIDATION_ERROR",
            Error::DuplicateUsername(_) => "DUPLICATE_USERNAME",
            Error::InvalidCredentials => "INVALID_CREDENTIALS",
            Error::NotFound(_) => "NOT_FOUND",
            Error::Extraction(rejection) => match rejection {
                ExtractionRejection::NotAnEvent => "NOT_AN_EVENT",
                ExtractionRejection::Unreadable => "UNREADABLE_FLYER",
                ExtractionRejection::MalformedResponse { .. } => "MALFORMED_EXTRACTION",
                ExtractionRejection::TransportFailure { .. } => "EXTRACTION_TRANSPORT",
            },
            Error::Superseded => "SUPERSEDED",
            Error::Config(_) => "CONFIG_ERROR",
            Error::Serialization(_) => "SERIALIZATION_ERROR",
            Error::Http(_) => "HTTP_ERROR",
            Error::Io(_) => "IO_ERROR",
        }
    }

    /// Actionable message for the person at the keyboard
    pub fn user_message(&self) -> String {
        match self {
            Error::Unauthenticated => "Please log in to continue.".to_string(),
            Error::Unauthorized(_) => "You can only change events you created.".to_string(),
            Error::Validation(msg) => msg.clone(),
            Error::DuplicateUsername(name) => {
                format!("The username \"{}\" is already taken. Pick another one.", name)
            }
            Error::InvalidCredentials => {
                "Username or password is incorrect.".to_string()
            }
            Error::NotFound(msg) => format!("{} It may have been removed.", msg),
            Error::Extraction(rejection) => match rejection {
                ExtractionRejection::NotAnEvent => {
                    "This image doesn't look like an event flyer. Try another photo or enter the event manually."
                        .to_string()
                }
                ExtractionRejection::Unreadable => {
                    "The flyer couldn't be read. Retake the photo with better lighting or enter the event manually."
                        .to_string()
                }
                ExtractionRejection::MalformedResponse { .. } => {
                    "We couldn't understand the flyer details. Please enter the event manually."
                        .to_string()
                }
                ExtractionRejection::TransportFailure { .. } => {
                    "Scanning failed because the service could not be reached. Try again in a moment."
                        .to_string()
                }
            },
            Error::Superseded => "A newer flyer upload replaced this one.".to_string(),
            Error::Config(_)
            | Error::Serialization(_)
            | Error::Http(_)
            | Error::Io(_) => "Something went wrong. Please try again.".to_string(),
        }
    }

    /// Convert into a caller-facing failure, logging it
    pub fn to_failure(&self) -> Failure {
        let failure = Failure {
            error_code: self.error_code(),
            message: self.user_message(),
        };

        match self {
            Error::Config(_) | Error::Serialization(_) | Error::Http(_) | Error::Io(_) => {
                tracing::error!(
                    error_code = %failure.error_code,
                    error = %self,
                    "Operation failed"
                );
            }
            _ => {
                tracing::warn!(
                    error_code = %failure.error_code,
                    error = %self,
                    "Operation rejected"
                );
            }
        }

        failure
    }
}

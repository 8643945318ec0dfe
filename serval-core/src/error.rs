// Error types for the Serval resolution engine

use http::StatusCode;
use thiserror::Error;

/// Errors raised while resolving, dispatching or rendering a request.
///
/// "No custom handler for this resource" is not an error: finders report it
/// as `Ok(None)`. [`Error::NotFound`] is only produced once every fallback
/// has been exhausted.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Render missing: {0}")]
    RenderMissing(String),

    #[error("Action not supported: {0}")]
    ActionNotSupported(String),

    #[error("Handler not registered: {0}")]
    HandlerNotRegistered(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        let status = match self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::ActionNotSupported(_) => StatusCode::METHOD_NOT_ALLOWED,
            Error::InvalidInput(_)
            | Error::RenderMissing(_)
            | Error::HandlerNotRegistered(_)
            | Error::Serialization(_)
            | Error::Configuration(_)
            | Error::Internal(_)
            | Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        status.as_u16()
    }

    /// Whether this error comes from a user-facing condition (4xx) rather
    /// than a framework or integration bug.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

//! Error types for the SDK.
//!
//! Every failing call surfaces exactly one of these variants. The variant
//! tells the caller whether a retry makes sense: `Server` and `Transport`
//! are retriable, `Validation` and `Credential` never are.

use thiserror::Error;

/// Result type for SDK operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when using the SDK.
#[derive(Error, Debug)]
pub enum Error {
    /// Bad caller input, rejected before any network call.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Malformed credential (an empty field).
    #[error("Credential error: {0}")]
    Credential(String),

    /// The request could not be canonicalized for signing.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Connection, DNS, TLS or timeout failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The provider rejected the request (HTTP 4xx).
    #[error("Client error ({status_code}): [{code}] {message}")]
    Client {
        /// HTTP status code.
        status_code: u16,
        /// Provider error code, e.g. `KMS.0205`.
        code: String,
        /// Human-readable error message.
        message: String,
    },

    /// The provider reported the resource as absent (HTTP 404).
    #[error("Not found: [{code}] {message}")]
    NotFound {
        /// Provider error code.
        code: String,
        /// Human-readable error message.
        message: String,
    },

    /// The provider failed to process the request (HTTP 5xx).
    #[error("Server error ({status_code}): [{code}] {message}")]
    Server {
        /// HTTP status code.
        status_code: u16,
        /// Provider error code, `unknown` when the body carried none.
        code: String,
        /// Human-readable error message.
        message: String,
    },

    /// The response violates the documented contract.
    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl Error {
    /// Returns true if the caller may retry the call.
    ///
    /// Only server-side and transport failures qualify. Note that a retry of
    /// a non-idempotent operation such as key creation may still create a
    /// duplicate; that decision stays with the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Server { .. } | Error::Transport(_))
    }

    /// Returns true for provider 4xx rejections, including `NotFound`.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::Client { .. } | Error::NotFound { .. })
    }

    /// Returns the HTTP status code if available.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Client { status_code, .. } | Error::Server { status_code, .. } => {
                Some(*status_code)
            }
            Error::NotFound { .. } => Some(404),
            _ => None,
        }
    }

    /// Returns the provider error code if the provider sent one.
    pub fn provider_code(&self) -> Option<&str> {
        match self {
            Error::Client { code, .. }
            | Error::NotFound { code, .. }
            | Error::Server { code, .. } => Some(code),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Transport(format!("request timed out: {err}"))
        } else {
            Error::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Protocol(format!("undecodable response body: {err}"))
    }
}

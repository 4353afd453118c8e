//! Error types and handling for the Orchestrate SDK
//!
//! Every failing operation returns an [`Error`] that can be branched on
//! directly or through its [`ErrorKind`]. Argument problems are reported
//! before anything is sent; everything else is derived from the HTTP
//! response or from the transport.
//!
//! # Error Categories
//!
//! - **Invalid argument**: a client-side precondition was violated (null
//!   item, zero limit, both pagination cursors supplied)
//! - **Not found**: the service answered 404
//! - **Precondition failed**: the service answered 412 to an `If-Match` or
//!   `If-None-Match` request
//! - **HTTP errors**: any other non-2xx answer, with status, code and message
//! - **Transport**: connection failures and timeouts
//! - **Deserialization**: a response body that does not fit the requested type
//!
//! # Example
//!
//! ```no_run
//! # use orchestrate_sdk::{Client, Error, Ref};
//! # async fn example(client: &Client, stale: Ref) -> Result<(), Box<dyn std::error::Error>> {
//! let item = serde_json::json!({"id": 2, "value": "v2"});
//! match client.put_if_match("users", "2", &item, &stale).await {
//!     Ok(written) => println!("now at {}", written.path.reference),
//!     Err(Error::PreconditionFailed { .. }) => println!("lost the race"),
//!     Err(Error::NotFound { .. }) => println!("collection is gone"),
//!     Err(e) => return Err(e.into()),
//! }
//! # Ok(())
//! # }
//! ```

use thiserror::Error;

/// Result type alias for the SDK
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the SDK
#[derive(Error, Debug)]
pub enum Error {
    /// An argument was rejected before any request was sent
    #[error("invalid argument `{argument}`: {message}")]
    InvalidArgument {
        /// Name of the offending argument, as used on the wire
        argument: &'static str,
        /// What is wrong with it
        message: String,
    },

    /// The collection, document or ref does not exist (404)
    #[error("not found: {message} (req={request_id:?})")]
    NotFound {
        /// Error message from server
        message: String,
        /// Request ID from x-orchestrate-req-id header
        request_id: Option<String>,
    },

    /// A conditional write or delete did not match the current state (412)
    #[error("precondition failed: {message} (req={request_id:?})")]
    PreconditionFailed {
        /// Error message from server
        message: String,
        /// Request ID from x-orchestrate-req-id header
        request_id: Option<String>,
    },

    /// Any other non-2xx response from the service
    #[error("http {status}: {code} - {message} (req={request_id:?})")]
    Http {
        /// HTTP status code
        status: u16,
        /// Error code from server (e.g. `security_unauthorized`)
        code: String,
        /// Error message from server
        message: String,
        /// Request ID from x-orchestrate-req-id header
        request_id: Option<String>,
    },

    /// Deserialization error
    #[error("deserialize: {0}")]
    Deserialize(String),

    /// Network error
    #[error("network: {0}")]
    Network(String),

    /// Request timeout
    #[error("timeout")]
    Timeout,

    /// Configuration error
    #[error("config: {0}")]
    Config(String),

    /// Other errors
    #[error("other: {0}")]
    Other(String),
}

/// Coarse classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Rejected locally before a request was sent
    InvalidArgument,
    /// 404 from the service
    NotFound,
    /// 412 from the service
    PreconditionFailed,
    /// Any other non-2xx response
    Service,
    /// Connection failure or timeout
    Transport,
    /// Response body could not be decoded
    Deserialize,
    /// Invalid client configuration
    Config,
    /// Other/unknown error
    Other,
}

impl ErrorKind {
    /// Short label, used for logging and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::NotFound => "not_found",
            ErrorKind::PreconditionFailed => "precondition_failed",
            ErrorKind::Service => "service",
            ErrorKind::Transport => "transport",
            ErrorKind::Deserialize => "deserialize",
            ErrorKind::Config => "config",
            ErrorKind::Other => "other",
        }
    }
}

impl Error {
    /// Get the error kind for categorization
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::PreconditionFailed { .. } => ErrorKind::PreconditionFailed,
            Error::Http { .. } => ErrorKind::Service,
            Error::Network(_) | Error::Timeout => ErrorKind::Transport,
            Error::Deserialize(_) => ErrorKind::Deserialize,
            Error::Config(_) => ErrorKind::Config,
            Error::Other(_) => ErrorKind::Other,
        }
    }

    /// Name of the rejected argument for [`Error::InvalidArgument`]
    pub fn argument(&self) -> Option<&'static str> {
        match self {
            Error::InvalidArgument { argument, .. } => Some(*argument),
            _ => None,
        }
    }

    /// True for a 404 answer
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// True for a 412 answer
    pub fn is_precondition_failed(&self) -> bool {
        matches!(self, Error::PreconditionFailed { .. })
    }

    /// Get the HTTP status code if the error came from a response
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::NotFound { .. } => Some(404),
            Error::PreconditionFailed { .. } => Some(412),
            Error::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Get the request ID if available
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Error::NotFound { request_id, .. }
            | Error::PreconditionFailed { request_id, .. }
            | Error::Http { request_id, .. } => request_id.as_deref(),
            _ => None,
        }
    }

    pub(crate) fn invalid_argument(argument: &'static str, message: impl Into<String>) -> Self {
        Error::InvalidArgument {
            argument,
            message: message.into(),
        }
    }

    /// Map a non-2xx response onto the taxonomy
    pub(crate) fn from_response(
        status: u16,
        code: &str,
        message: &str,
        request_id: Option<String>,
    ) -> Self {
        match status {
            404 => Error::NotFound {
                message: message.to_string(),
                request_id,
            },
            412 => Error::PreconditionFailed {
                message: message.to_string(),
                request_id,
            },
            _ => Error::Http {
                status,
                code: code.to_string(),
                message: message.to_string(),
                request_id,
            },
        }
    }
}

/// Server error response structure
#[derive(Debug, serde::Deserialize)]
pub(crate) struct ErrorResponse {
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
    #[allow(dead_code)]
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout
        } else if err.is_connect() || err.is_request() {
            Error::Network(err.to_string())
        } else if err.is_decode() {
            Error::Deserialize(err.to_string())
        } else {
            Error::Other(err.to_string())
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Deserialize(err.to_string())
    }
}

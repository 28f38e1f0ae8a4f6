//! Failure types and the error classifier.
//!
//! Every failure a fetch can produce is a [`FetchError`]. Before a failure
//! reaches presentation code it is normalized by the [`ErrorClassifier`]
//! into a [`NetErrorData`]: a stable numeric code plus a human-readable
//! message.

mod classifier;
pub mod codes;

use std::error::Error as StdError;

use thiserror::Error;

pub use classifier::ErrorClassifier;

/// Boxed error used for caller-defined failures.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Errors that can occur while reading, fetching, or persisting data.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport returned a non-success status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Remote answered but reported failure in its response envelope.
    #[error("Request rejected ({code}): {message}")]
    Business { code: i32, message: String },

    /// Error raised by the HTTP client.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Low-level I/O failure (sockets, connection resets).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Payload could not be decoded.
    #[error("Failed to decode payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// No cached value exists for a local-only read.
    #[error("No cached value available")]
    NotFound,

    /// Remote reported success but carried no payload.
    #[error("Response reported success without a payload")]
    MissingPayload,

    /// A required value was absent.
    #[error("Unexpected null value: {0}")]
    NullValue(String),

    /// Index past the end of a sequence.
    #[error("Index {index} out of bounds for length {len}")]
    OutOfBounds { index: usize, len: usize },

    /// Value had a different shape than expected.
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// Persisting a successful remote value failed.
    #[error("Failed to persist remote value: {source}")]
    Persist {
        #[source]
        source: BoxError,
    },

    /// Any other caller-defined failure.
    #[error("{0}")]
    Other(#[source] BoxError),
}

impl FetchError {
    /// Wrap an arbitrary error.
    pub fn other<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        FetchError::Other(Box::new(err))
    }

    /// Wrap a persistence failure.
    pub fn persist<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        FetchError::Persist { source: err.into() }
    }

    /// Whether this failure is an absent local value.
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::NotFound)
    }
}

/// Normalized failure description shown to users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetErrorData {
    pub code: i32,
    pub message: String,
    /// The code came from a response envelope, not from the transport.
    ///
    /// Envelope codes live in the server's own namespace and never count as
    /// network, server or auth failures, whatever their value.
    pub business: bool,
}

impl NetErrorData {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            business: false,
        }
    }

    /// A failure reported by the server inside a response envelope.
    pub fn business(code: i32, message: impl Into<String>) -> Self {
        Self {
            business: true,
            ..Self::new(code, message)
        }
    }

    /// Connectivity, timeout, and socket failures.
    ///
    /// These are the only failures retried by default.
    pub fn is_network_error(&self) -> bool {
        !self.business
            && matches!(
                self.code,
                codes::NETWORK_ERROR | codes::NETWORK_TIMEOUT | codes::SOCKET_EXCEPTION
            )
    }

    /// Any 5xx status.
    pub fn is_server_error(&self) -> bool {
        !self.business && (500..=599).contains(&self.code)
    }

    /// The session is no longer authorized.
    pub fn needs_reauth(&self) -> bool {
        !self.business && self.code == codes::UNAUTHORIZED
    }
}

impl std::fmt::Display for NetErrorData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code)
    }
}

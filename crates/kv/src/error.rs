//! Error types for the key-value contract.

use std::io;

use snafu::Snafu;

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that a key-value backend can surface.
#[derive(Debug, Snafu)]
pub enum Error {
    /// Key not found in the store.
    #[snafu(display("Key not found"))]
    NotFound,

    /// A conditional write's predicate was not satisfied.
    #[snafu(display("Predicate failed"))]
    PredicateFailed,

    /// Value exceeds the backend's size limit.
    #[snafu(display("Value too large: {size} bytes (max {max})"))]
    ValueTooLarge {
        /// Actual size of the value in bytes.
        size: usize,
        /// Maximum allowed size in bytes.
        max: usize,
    },

    /// I/O error from the underlying backend.
    #[snafu(display("I/O error: {source}"))]
    Io {
        /// The underlying I/O error.
        source: io::Error,
    },

    /// Backend-specific failure.
    #[snafu(display("Backend error: {reason}"))]
    Backend {
        /// Description of the failure.
        reason: String,
    },
}

// Provide automatic conversion from io::Error for ergonomic ? usage
impl From<io::Error> for Error {
    fn from(source: io::Error) -> Self {
        Error::Io { source }
    }
}

//! Error types for staging operations.

use basin_types::CodecError;
use snafu::Snafu;

/// Result type alias for staging operations.
pub type Result<T> = std::result::Result<T, StagingError>;

/// Errors surfaced by the staging manager.
///
/// `NotFound`, `PreconditionFailed`, `InvalidValue`, `TooManyTries`, and
/// `Aborted` are user-visible: their messages are safe to show to end
/// users verbatim. The remaining variants wrap backend or serialization
/// failures and surface them unchanged.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum StagingError {
    /// The key is not present in the staging area.
    #[snafu(display("not found"))]
    NotFound,

    /// A stored value must carry a non-empty identity.
    #[snafu(display("invalid value: empty identity"))]
    InvalidValue,

    /// A conditional write lost: the key already exists.
    #[snafu(display("precondition failed"))]
    PreconditionFailed,

    /// An optimistic update exhausted its retry budget.
    ///
    /// Persistent contention on one key is a backend-health signal, not
    /// something the staging layer masks indefinitely.
    #[snafu(display("too many tries"))]
    TooManyTries {
        /// Number of attempts made before giving up.
        tries: u32,
    },

    /// An update callback rejected the current value; nothing was written.
    #[snafu(display("update aborted: {reason}"))]
    Aborted {
        /// Caller-supplied reason for the abort.
        reason: String,
    },

    /// The operation was cancelled before completion.
    #[snafu(display("operation cancelled"))]
    Cancelled,

    /// A stored frame could not be decoded. Non-retryable.
    #[snafu(display("codec error: {source}"))]
    Codec {
        /// The underlying codec error.
        source: CodecError,
    },

    /// The underlying key-value store failed.
    #[snafu(display("store error: {source}"))]
    Store {
        /// The underlying store error.
        source: basin_kv::Error,
    },
}

impl StagingError {
    /// Maps a store-level error onto the staging error set.
    ///
    /// `NotFound` and `PredicateFailed` have staging-level meanings;
    /// everything else surfaces unchanged.
    pub(crate) fn from_store(source: basin_kv::Error) -> Self {
        match source {
            basin_kv::Error::NotFound => StagingError::NotFound,
            basin_kv::Error::PredicateFailed => StagingError::PreconditionFailed,
            source => StagingError::Store { source },
        }
    }
}

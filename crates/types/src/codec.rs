//! Canonical serialization for staged values.
//!
//! Staged values are stored as a postcard frame of `Option<Value>`. The
//! one-byte option discriminant is the reserved tombstone encoding: a
//! `None` frame marks a staged deletion and is distinguishable from the
//! physical absence of the key. Encoding is deterministic, so a frame can
//! be used as a compare-and-set predicate byte-for-byte.

use serde::{Serialize, de::DeserializeOwned};
use snafu::Snafu;

use crate::types::Value;

/// Error type for codec operations.
#[derive(Debug, Snafu)]
pub enum CodecError {
    /// Encoding failed.
    #[snafu(display("Encoding failed: {source}"))]
    Encode {
        /// The underlying postcard error.
        source: postcard::Error,
    },

    /// Decoding failed.
    #[snafu(display("Decoding failed: {source}"))]
    Decode {
        /// The underlying postcard error.
        source: postcard::Error,
    },

    /// The frame decoded cleanly but left unconsumed bytes behind.
    #[snafu(display("Decoding failed: {remaining} trailing bytes"))]
    TrailingBytes {
        /// Number of unconsumed bytes after the frame.
        remaining: usize,
    },
}

/// Encodes a staged value to its storage frame.
///
/// `None` produces the tombstone frame.
///
/// # Errors
///
/// Returns `CodecError::Encode` if serialization fails.
pub fn encode_staged(value: Option<&Value>) -> Result<Vec<u8>, CodecError> {
    encode(&value)
}

/// Decodes a storage frame back into a staged value.
///
/// The tombstone frame decodes to `None`.
///
/// # Errors
///
/// Returns `CodecError::Decode` for malformed frames and
/// `CodecError::TrailingBytes` for frames with garbage after the value.
/// Both are non-retryable.
pub fn decode_staged(bytes: &[u8]) -> Result<Option<Value>, CodecError> {
    decode(bytes)
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, CodecError> {
    postcard::to_allocvec(value).map_err(|source| CodecError::Encode { source })
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    let (value, rest) =
        postcard::take_from_bytes(bytes).map_err(|source| CodecError::Decode { source })?;
    if !rest.is_empty() {
        return Err(CodecError::TrailingBytes { remaining: rest.len() });
    }
    Ok(value)
}

//! Core types and value codec for the Basin staging layer.
//!
//! This crate provides the foundational types shared by the staging stack:
//! - Staging tokens, keys, values, and value records
//! - The canonical staged-value codec (postcard-based, with a reserved
//!   tombstone frame)
//! - Codec error types using snafu

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod codec;
pub mod types;

// Re-export commonly used types at crate root
pub use codec::{CodecError, decode_staged, encode_staged};
pub use types::{Key, StagingToken, Value, ValueRecord};

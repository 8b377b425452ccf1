//! Ordered key-value contract for the Basin staging layer.
//!
//! This crate defines the minimal interface the staging layer requires of
//! its storage backend, and ships one implementation:
//!
//! - [`Store`] -- the backend trait: point get, unconditional and
//!   conditional set, delete, and forward range scans
//! - [`MemStore`] -- an ordered in-memory backend for tests and embedding
//!
//! # Backend Contract
//!
//! Every implementation must provide:
//!
//! 1. Strict lexicographic ordering of keys in scans.
//! 2. Atomic per-key writes; [`Store::set_if`] is an atomic
//!    compare-and-set.
//! 3. Read-your-writes within a single caller.
//!
//! Cross-key atomicity is *not* required and callers must not assume it.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod memory;
mod store;

pub use error::{Error, Result};
pub use memory::{DEFAULT_SCAN_BATCH, MAX_VALUE_SIZE, MemStore};
pub use store::{Entry, ScanIterator, ScanOptions, Store};

//! Per-branch staging areas over an ordered key-value store.
//!
//! A staging area holds one branch's uncommitted writes as a sorted,
//! mutable overlay on top of the branch's immutable committed contents.
//! Each overlay is addressed by an opaque [`StagingToken`]; several tokens
//! may coexist for one branch so a commit can seal the active overlay and
//! open a fresh one atomically.
//!
//! The [`StagingManager`] is a stateless facade over any
//! [`basin_kv::Store`]: it owns no mutable state of its own and is safe to
//! share across threads. It provides:
//!
//! - Point reads and writes, conditional writes, and staged deletions
//!   (tombstones)
//! - Optimistic read-modify-write with bounded retries
//! - Prefix-scoped and whole-token bulk drops that are resume-safe under
//!   partial failure
//! - In-order paginated iteration with seek, via [`StagingIter`]
//!
//! [`StagingToken`]: basin_types::StagingToken

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod iterator;
mod keys;
mod manager;

pub use error::{Result, StagingError};
pub use iterator::StagingIter;
pub use keys::{prefix_upper_bound, staging_key, token_range};
pub use manager::{ManagerConfig, StagingManager};

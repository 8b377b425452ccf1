//! Proptest strategies for staging domain values.
//!
//! Reusable generators for property-based testing across crates.
//! Strategies bias toward the byte values the key arithmetic cares about
//! (0x00 and 0xFF runs) while still exploring arbitrary content.
//!
//! # Usage
//!
//! ```no_run
//! use basin_test_utils::strategies;
//! use proptest::prelude::*;
//!
//! proptest! {
//!     #[test]
//!     fn my_property(key in strategies::arb_user_key()) {
//!         // test invariant with a randomly generated key
//!     }
//! }
//! ```

use basin_types::{StagingToken, Value};
use proptest::prelude::*;

/// Generates an arbitrary staging token of 1-16 characters matching
/// `[a-z][a-z0-9_-]{0,15}`.
pub fn arb_token() -> impl Strategy<Value = StagingToken> {
    "[a-z][a-z0-9_-]{0,15}".prop_map(|token| StagingToken::new(token))
}

/// Generates a byte drawn from a small alphabet heavy in `0x00` and `0xFF`
/// so generated keys collide and exercise prefix-boundary arithmetic.
fn arb_edge_byte() -> impl Strategy<Value = u8> {
    prop_oneof![Just(0x00), Just(0x01), Just(0xFE), Just(0xFF), Just(b'a'), Just(b'b')]
}

/// Generates an arbitrary non-empty user key of 1-6 edge-biased bytes.
pub fn arb_user_key() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(arb_edge_byte(), 1..7)
}

/// Generates an arbitrary key prefix of 0-4 edge-biased bytes, including
/// the empty prefix.
pub fn arb_prefix() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(arb_edge_byte(), 0..5)
}

/// Generates an arbitrary [`Value`] with a non-empty identity and 0-31
/// data bytes (an empty `data` is a valid value, not a tombstone).
pub fn arb_value() -> impl Strategy<Value = Value> {
    (proptest::collection::vec(any::<u8>(), 1..17), proptest::collection::vec(any::<u8>(), 0..32))
        .prop_map(|(identity, data)| Value { identity, data })
}

/// Generates an arbitrary staged value: a regular [`Value`] or a
/// tombstone (`None`).
pub fn arb_staged_value() -> impl Strategy<Value = Option<Value>> {
    proptest::option::weighted(0.8, arb_value())
}

/// Generates a deduplicated set of 1-24 user keys.
pub fn arb_key_set() -> impl Strategy<Value = Vec<Vec<u8>>> {
    proptest::collection::btree_set(arb_user_key(), 1..25)
        .prop_map(|keys| keys.into_iter().collect())
}

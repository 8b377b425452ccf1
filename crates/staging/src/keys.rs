//! Physical key layout for staging entries.
//!
//! A staging entry for `(token, key)` is stored at the physical key
//! `token ‖ 0x00 ‖ key`. Tokens never contain NUL, which yields three
//! properties the manager relies on:
//!
//! 1. For tokens `T1 < T2` (as strings), every physical key under `T1`
//!    sorts before every physical key under `T2`.
//! 2. Within one token, physical order equals user-key byte order.
//! 3. A token's entries form exactly the half-open physical range
//!    `[token ‖ 0x00, token ‖ 0x01)`.
//!
//! Key format: {token:var}{0x00}{user_key:var}

use basin_types::StagingToken;

/// Separator between the encoded token and the user key. Cannot appear
/// inside a token.
const TOKEN_SEPARATOR: u8 = 0x00;

/// Encodes the physical key for a staging entry.
pub fn staging_key(token: &StagingToken, key: &[u8]) -> Vec<u8> {
    let token = token.as_bytes();
    let mut physical = Vec::with_capacity(token.len() + 1 + key.len());
    physical.extend_from_slice(token);
    physical.push(TOKEN_SEPARATOR);
    physical.extend_from_slice(key);
    physical
}

/// Returns the half-open physical range `[lo, hi)` covering every entry of
/// `token`.
///
/// `lo` is the physical key of the empty user key; `hi` is the smallest
/// physical key strictly greater than every key of the token. The presence
/// of any physical key in this range constitutes the existence of the
/// token -- there is no separate metadata record.
pub fn token_range(token: &StagingToken) -> (Vec<u8>, Vec<u8>) {
    let lo = staging_key(token, b"");
    let mut hi = lo.clone();
    if let Some(last) = hi.last_mut() {
        *last = TOKEN_SEPARATOR + 1;
    }
    (lo, hi)
}

/// Computes the smallest byte string strictly greater than every string
/// beginning with `prefix`.
///
/// The last non-`0xFF` byte is incremented and all trailing `0xFF` bytes
/// are stripped. Returns `None` when no such bound exists: an empty prefix
/// or a prefix of only `0xFF` bytes covers everything up to the end of the
/// enclosing range.
///
/// The bound is exact: keys that merely compare greater than `prefix`
/// without starting with it (for example `prefix` with a later-sorting
/// sibling byte) fall outside `[prefix, upper)`.
pub fn prefix_upper_bound(prefix: &[u8]) -> Option<Vec<u8>> {
    let last = prefix.iter().rposition(|&b| b != 0xFF)?;
    let mut upper = prefix[..=last].to_vec();
    upper[last] += 1;
    Some(upper)
}

//! Core type definitions for the staging layer.
//!
//! Staging areas are identified by opaque tokens. Each token owns an
//! independent namespace of byte-string keys mapping to staged values.
//! A staged value of `None` is a tombstone: it records the deletion of a
//! key that exists in the committed base.

use std::{fmt, ops::Deref};

use serde::{Deserialize, Serialize};

/// Identifies one logical staging area.
///
/// Tokens are opaque printable strings. A token springs into existence on
/// the first write made under it and ceases to exist when its last key is
/// removed; no explicit create or destroy is needed. Several tokens may be
/// attached to one branch at once while a commit seals the previous one.
///
/// # Invariant
///
/// A token must not contain a NUL byte: the physical key layout uses NUL
/// as the token/key separator. Tokens produced by the versioning layer are
/// printable identifiers, which satisfies this by construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StagingToken(String);

impl StagingToken {
    /// Creates a token from a raw string.
    pub fn new(token: impl Into<String>) -> Self {
        let token = token.into();
        debug_assert!(!token.contains('\0'), "staging token must not contain NUL");
        Self(token)
    }

    /// Returns the token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the token's raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl From<&str> for StagingToken {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl From<String> for StagingToken {
    fn from(token: String) -> Self {
        Self::new(token)
    }
}

impl fmt::Display for StagingToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A user-facing key within a staging area.
///
/// Keys are arbitrary non-empty byte strings. Lexicographic byte order is
/// the only ordering that matters: it is the order iteration yields keys in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Key(Vec<u8>);

impl Key {
    /// Returns the key's raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consumes the key, returning the underlying bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl Deref for Key {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for Key {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Key {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Key {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

/// A staged value: an identity hash plus opaque data bytes.
///
/// `data` is never interpreted by the staging layer. `identity` is a
/// content hash the commit layer uses to detect effectively-unchanged
/// writes; it must be non-empty for every stored value (a tombstone is
/// represented as the *absence* of a `Value`, not an empty one).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Value {
    /// Content hash of the logical value.
    pub identity: Vec<u8>,
    /// Opaque payload bytes. May be empty.
    pub data: Vec<u8>,
}

impl Value {
    /// Creates a value from identity and data bytes.
    pub fn new(identity: impl Into<Vec<u8>>, data: impl Into<Vec<u8>>) -> Self {
        Self { identity: identity.into(), data: data.into() }
    }
}

/// One element of staging iteration: a key and its staged value.
///
/// `value == None` means the key is staged for deletion (a tombstone).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueRecord {
    /// The user key.
    pub key: Key,
    /// The staged value, or `None` for a tombstone.
    pub value: Option<Value>,
}

//! The staging manager: per-token mutable overlays on an ordered store.

use basin_kv::{ScanOptions, Store};
use basin_types::{StagingToken, Value, decode_staged, encode_staged};
use serde::{Deserialize, Serialize};
use snafu::ResultExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::{
    error::{CodecSnafu, Result, StagingError, StoreSnafu},
    iterator::StagingIter,
    keys::{prefix_upper_bound, staging_key, token_range},
};

/// Tuning knobs for a [`StagingManager`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Keys deleted per bulk-drop batch; also the default scan page size
    /// for listing.
    pub batch_size: usize,
    /// Attempts the optimistic update loop makes before giving up.
    pub max_tries: u32,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self { batch_size: 1000, max_tries: 3 }
    }
}

/// Manages per-token staging areas on top of an ordered key-value store.
///
/// The manager is a stateless facade: it holds a store handle and a
/// config, owns no mutable state, and is safe to invoke from any number
/// of concurrent callers. Serialization is delegated entirely to the
/// backend's per-key atomicity.
pub struct StagingManager<S> {
    store: S,
    config: ManagerConfig,
}

impl<S: Store> StagingManager<S> {
    /// Creates a manager over `store` with the default configuration.
    pub fn new(store: S) -> Self {
        Self::with_config(store, ManagerConfig::default())
    }

    /// Creates a manager over `store` with an explicit configuration.
    pub fn with_config(store: S, config: ManagerConfig) -> Self {
        Self { store, config }
    }

    /// Reads the value staged under `(token, key)`.
    ///
    /// Returns `Ok(None)` for a tombstone: the key is staged for deletion.
    ///
    /// # Errors
    ///
    /// Returns `StagingError::NotFound` if the key is absent from the
    /// staging area (which is distinct from holding a tombstone).
    pub fn get(
        &self,
        cancel: &CancellationToken,
        token: &StagingToken,
        key: &[u8],
    ) -> Result<Option<Value>> {
        check_cancelled(cancel)?;
        let physical = staging_key(token, key);
        let bytes = self.store.get(&physical).map_err(StagingError::from_store)?;
        decode_staged(&bytes).context(CodecSnafu)
    }

    /// Stages `value` under `(token, key)`. A `value` of `None` stages a
    /// tombstone.
    ///
    /// With `overwrite` the write is unconditional. Without it, the write
    /// succeeds only if the key is absent from the staging area.
    ///
    /// # Errors
    ///
    /// Returns `StagingError::InvalidValue` if `value` carries an empty
    /// identity, and `StagingError::PreconditionFailed` if `overwrite` is
    /// false and the key already exists.
    pub fn set(
        &self,
        cancel: &CancellationToken,
        token: &StagingToken,
        key: &[u8],
        value: Option<&Value>,
        overwrite: bool,
    ) -> Result<()> {
        check_cancelled(cancel)?;
        validate_value(value)?;
        let physical = staging_key(token, key);
        let bytes = encode_staged(value).context(CodecSnafu)?;
        if overwrite {
            self.store.set(&physical, &bytes).context(StoreSnafu)
        } else {
            self.store.set_if(&physical, &bytes, None).map_err(StagingError::from_store)
        }
    }

    /// Optimistic read-modify-write of the value staged under
    /// `(token, key)`.
    ///
    /// Reads the current value (`None` if the key is absent or holds a
    /// tombstone), applies `f`, and commits the result with a
    /// compare-and-set against the bytes read. On a lost race the loop
    /// retries from the read, up to the configured number of tries.
    ///
    /// `f` may run more than once and must therefore be idempotent and
    /// free of side effects. An error from `f` aborts the update with no
    /// write and is returned untouched.
    ///
    /// # Errors
    ///
    /// Returns `StagingError::TooManyTries` once the retry budget is
    /// exhausted, and `StagingError::InvalidValue` if `f` produces a value
    /// with an empty identity.
    pub fn update<F>(
        &self,
        cancel: &CancellationToken,
        token: &StagingToken,
        key: &[u8],
        mut f: F,
    ) -> Result<()>
    where
        F: FnMut(Option<&Value>) -> Result<Option<Value>>,
    {
        let physical = staging_key(token, key);
        for attempt in 1..=self.config.max_tries {
            check_cancelled(cancel)?;

            let raw = match self.store.get(&physical) {
                Ok(bytes) => Some(bytes),
                Err(basin_kv::Error::NotFound) => None,
                Err(source) => return Err(StagingError::Store { source }),
            };
            let current = match &raw {
                Some(bytes) => decode_staged(bytes).context(CodecSnafu)?,
                None => None,
            };

            let next = f(current.as_ref())?;
            validate_value(next.as_ref())?;
            let bytes = encode_staged(next.as_ref()).context(CodecSnafu)?;

            match self.store.set_if(&physical, &bytes, raw.as_deref()) {
                Ok(()) => return Ok(()),
                Err(basin_kv::Error::PredicateFailed) => {
                    trace!(token = %token, attempt, "staged update lost the race, retrying");
                },
                Err(source) => return Err(StagingError::Store { source }),
            }
        }
        Err(StagingError::TooManyTries { tries: self.config.max_tries })
    }

    /// Physically removes `(token, key)` from the staging area.
    ///
    /// This is not a tombstone: the staging record itself is deleted.
    /// Succeeds whether or not the key existed.
    pub fn drop_key(
        &self,
        cancel: &CancellationToken,
        token: &StagingToken,
        key: &[u8],
    ) -> Result<()> {
        check_cancelled(cancel)?;
        let physical = staging_key(token, key);
        self.store.delete(&physical).context(StoreSnafu)
    }

    /// Removes every key of `token` whose bytes start with `prefix`.
    ///
    /// An empty prefix removes the whole token. Deletion proceeds in
    /// batches; a failure or cancellation partway through leaves the
    /// already-deleted keys gone and the rest intact, and calling again
    /// completes the job. No tombstones are left behind.
    pub fn drop_by_prefix(
        &self,
        cancel: &CancellationToken,
        token: &StagingToken,
        prefix: &[u8],
    ) -> Result<()> {
        let (_, hi) = token_range(token);
        let start = staging_key(token, prefix);
        let end = match prefix_upper_bound(prefix) {
            Some(upper) => staging_key(token, &upper),
            // Empty or all-0xFF prefix: no bound exists inside the token,
            // drop until the end of its range.
            None => hi,
        };
        self.drop_physical_range(cancel, token, start, &end)
    }

    /// Removes every key of `token`. Equivalent to a drop with an empty
    /// prefix.
    pub fn drop_token(&self, cancel: &CancellationToken, token: &StagingToken) -> Result<()> {
        self.drop_by_prefix(cancel, token, b"")
    }

    /// Opens a forward iterator over `token` in ascending key order.
    ///
    /// `batch_size == 0` selects the configured default. The iterator is
    /// not a snapshot: writes racing the iteration may or may not be
    /// observed, but keys are never duplicated or yielded out of order.
    pub fn list(
        &self,
        cancel: &CancellationToken,
        token: &StagingToken,
        batch_size: usize,
    ) -> Result<StagingIter<'_, S>> {
        check_cancelled(cancel)?;
        let batch_size = if batch_size == 0 { self.config.batch_size } else { batch_size };
        Ok(StagingIter::new(&self.store, cancel.clone(), token, batch_size))
    }

    /// Deletes all physical keys in `[cursor, end)` in batches, rescanning
    /// from just above the last deleted key so that a retry after partial
    /// failure makes forward progress.
    fn drop_physical_range(
        &self,
        cancel: &CancellationToken,
        token: &StagingToken,
        mut cursor: Vec<u8>,
        end: &[u8],
    ) -> Result<()> {
        // A zero batch size means "use the default", as it does for list.
        let batch_size = if self.config.batch_size == 0 {
            ManagerConfig::default().batch_size
        } else {
            self.config.batch_size
        };
        let mut total = 0usize;
        loop {
            check_cancelled(cancel)?;

            let mut batch = Vec::with_capacity(batch_size);
            {
                let opts = ScanOptions { start: cursor.clone(), batch_size };
                let mut scan = self.store.scan(opts).context(StoreSnafu)?;
                while batch.len() < batch_size {
                    match scan.next() {
                        Some(Ok(entry)) if entry.key.as_slice() < end => batch.push(entry.key),
                        Some(Ok(_)) | None => break,
                        Some(Err(source)) => return Err(StagingError::Store { source }),
                    }
                }
            }
            let Some(last) = batch.last() else {
                break;
            };
            cursor = last.clone();
            cursor.push(0x00);

            for key in &batch {
                self.store.delete(key).context(StoreSnafu)?;
            }
            total += batch.len();
            debug!(token = %token, deleted = batch.len(), total, "dropped staging batch");
        }
        Ok(())
    }
}

fn check_cancelled(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(StagingError::Cancelled);
    }
    Ok(())
}

fn validate_value(value: Option<&Value>) -> Result<()> {
    if let Some(value) = value {
        if value.identity.is_empty() {
            return Err(StagingError::InvalidValue);
        }
    }
    Ok(())
}

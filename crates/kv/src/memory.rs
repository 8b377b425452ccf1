//! In-memory ordered store.
//!
//! All data is held in a `BTreeMap` behind a `parking_lot::RwLock` and is
//! lost when the last handle is dropped. Intended for tests and embedding;
//! it is also the reference implementation of the [`Store`] contract.
//!
//! Scans take the read lock once per page, never across calls, so a slow
//! consumer does not block writers. A scan racing concurrent writes may or
//! may not observe them but never yields duplicates or out-of-order keys.

use std::{
    collections::{BTreeMap, VecDeque},
    ops::Bound,
    sync::Arc,
};

use parking_lot::RwLock;

use crate::{
    error::{Error, Result},
    store::{Entry, ScanIterator, ScanOptions, Store},
};

/// Maximum value size accepted by the in-memory store: 4 MiB.
///
/// Real backends dictate their own limit; this one is chosen to match the
/// smallest limit among the hosted backends the staging layer targets.
pub const MAX_VALUE_SIZE: usize = 4 << 20;

/// Default number of entries fetched per scan page.
pub const DEFAULT_SCAN_BATCH: usize = 1000;

type Entries = Arc<RwLock<BTreeMap<Vec<u8>, Vec<u8>>>>;

/// In-memory, `BTreeMap`-based ordered store.
///
/// Cloning is cheap and clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemStore {
    entries: Entries,
}

impl MemStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently stored.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Store for MemStore {
    fn get(&self, key: &[u8]) -> Result<Vec<u8>> {
        self.entries.read().get(key).cloned().ok_or(Error::NotFound)
    }

    fn set(&self, key: &[u8], value: &[u8]) -> Result<()> {
        check_value_size(value)?;
        self.entries.write().insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn set_if(&self, key: &[u8], value: &[u8], predicate: Option<&[u8]>) -> Result<()> {
        check_value_size(value)?;
        let mut map = self.entries.write();
        let satisfied = match (predicate, map.get(key)) {
            (None, None) => true,
            (Some(expected), Some(current)) => current.as_slice() == expected,
            _ => false,
        };
        if !satisfied {
            return Err(Error::PredicateFailed);
        }
        map.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<()> {
        self.entries.write().remove(key);
        Ok(())
    }

    fn scan(&self, opts: ScanOptions) -> Result<Box<dyn ScanIterator + '_>> {
        let batch_size = if opts.batch_size == 0 { DEFAULT_SCAN_BATCH } else { opts.batch_size };
        Ok(Box::new(MemScanIter {
            entries: Arc::clone(&self.entries),
            next_start: opts.start,
            batch_size,
            buf: VecDeque::new(),
            exhausted: false,
        }))
    }
}

fn check_value_size(value: &[u8]) -> Result<()> {
    if value.len() > MAX_VALUE_SIZE {
        return Err(Error::ValueTooLarge { size: value.len(), max: MAX_VALUE_SIZE });
    }
    Ok(())
}

/// Paged forward scan over a [`MemStore`].
///
/// Each page copies up to `batch_size` entries under the read lock and
/// remembers where the next page begins. A short page means the range was
/// exhausted at the time it was read.
struct MemScanIter {
    entries: Entries,
    next_start: Vec<u8>,
    batch_size: usize,
    buf: VecDeque<Entry>,
    exhausted: bool,
}

impl MemScanIter {
    fn refill(&mut self) {
        {
            let map = self.entries.read();
            let page = map
                .range::<[u8], _>((Bound::Included(self.next_start.as_slice()), Bound::Unbounded))
                .take(self.batch_size)
                .map(|(key, value)| Entry { key: key.clone(), value: value.clone() });
            self.buf.extend(page);
        }
        if self.buf.len() < self.batch_size {
            self.exhausted = true;
        } else if let Some(last) = self.buf.back() {
            // Smallest key strictly greater than the last one returned.
            let mut next = last.key.clone();
            next.push(0x00);
            self.next_start = next;
        }
    }
}

impl Iterator for MemScanIter {
    type Item = Result<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buf.is_empty() && !self.exhausted {
            self.refill();
        }
        self.buf.pop_front().map(Ok)
    }
}

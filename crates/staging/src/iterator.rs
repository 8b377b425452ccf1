//! Cursor over one staging token's entries.

use basin_kv::{Entry, ScanIterator, ScanOptions, Store};
use basin_types::{Key, StagingToken, ValueRecord, decode_staged};
use tokio_util::sync::CancellationToken;

use crate::{error::StagingError, keys::token_range};

/// A lazy, forward, restartable cursor over a token's keys.
///
/// Keys are yielded in strict ascending order with no duplicates. The
/// cursor hides backend pagination: it fetches a page on the first
/// [`next`] after construction or a seek, and transparently fetches the
/// following page when one runs out.
///
/// Clean exhaustion and failure are distinguishable: after [`next`]
/// returns `false`, [`err`] is `None` only if the token's range was fully
/// consumed.
///
/// [`next`]: StagingIter::next
/// [`err`]: StagingIter::err
pub struct StagingIter<'a, S: Store> {
    store: &'a S,
    cancel: CancellationToken,
    token_prefix: Vec<u8>,
    hi: Vec<u8>,
    batch_size: usize,
    scan: Option<Box<dyn ScanIterator + 'a>>,
    /// Physical key where the next backend fetch begins.
    next_start: Vec<u8>,
    current: Option<ValueRecord>,
    err: Option<StagingError>,
    exhausted: bool,
    closed: bool,
}

impl<'a, S: Store> StagingIter<'a, S> {
    pub(crate) fn new(
        store: &'a S,
        cancel: CancellationToken,
        token: &StagingToken,
        batch_size: usize,
    ) -> Self {
        let (lo, hi) = token_range(token);
        Self {
            store,
            cancel,
            token_prefix: lo.clone(),
            hi,
            batch_size,
            scan: None,
            next_start: lo,
            current: None,
            err: None,
            exhausted: false,
            closed: false,
        }
    }

    /// Advances to the next record.
    ///
    /// Returns `false` on exhaustion, failure, cancellation, or after
    /// [`close`](StagingIter::close).
    pub fn next(&mut self) -> bool {
        if self.closed || self.exhausted || self.err.is_some() {
            return false;
        }
        if self.cancel.is_cancelled() {
            self.fail(StagingError::Cancelled);
            return false;
        }
        if self.scan.is_none() {
            let opts =
                ScanOptions { start: self.next_start.clone(), batch_size: self.batch_size };
            match self.store.scan(opts) {
                Ok(scan) => self.scan = Some(scan),
                Err(source) => {
                    self.fail(StagingError::Store { source });
                    return false;
                },
            }
        }
        let item = match self.scan.as_mut() {
            Some(scan) => scan.next(),
            None => return false,
        };
        match item {
            None => {
                self.finish();
                false
            },
            Some(Err(source)) => {
                self.fail(StagingError::Store { source });
                false
            },
            Some(Ok(entry)) => {
                if entry.key.as_slice() >= self.hi.as_slice() {
                    self.finish();
                    return false;
                }
                self.take_entry(entry)
            },
        }
    }

    /// Returns the record the cursor is positioned on.
    ///
    /// `None` unless the preceding [`next`](StagingIter::next) returned
    /// `true`.
    pub fn value(&self) -> Option<&ValueRecord> {
        self.current.as_ref()
    }

    /// Repositions the cursor at the first key greater than or equal to
    /// `key` within the token.
    ///
    /// The cursor returns to the fresh state; no backend fetch happens
    /// until the next [`next`](StagingIter::next) call.
    pub fn seek_ge(&mut self, key: &[u8]) {
        if self.closed {
            return;
        }
        // token_prefix is `token ‖ 0x00`, which staging_key also produces.
        let mut start = self.token_prefix.clone();
        start.extend_from_slice(key);
        self.scan = None;
        self.next_start = start;
        self.current = None;
        self.err = None;
        self.exhausted = false;
    }

    /// Returns the error that stopped iteration, if any.
    ///
    /// `None` after clean exhaustion.
    pub fn err(&self) -> Option<&StagingError> {
        self.err.as_ref()
    }

    /// Releases backend resources. Idempotent; subsequent
    /// [`next`](StagingIter::next) calls return `false`.
    pub fn close(&mut self) {
        self.scan = None;
        self.current = None;
        self.closed = true;
    }

    fn take_entry(&mut self, entry: Entry) -> bool {
        let user_key = entry.key[self.token_prefix.len()..].to_vec();
        match decode_staged(&entry.value) {
            Ok(value) => {
                self.current = Some(ValueRecord { key: Key::from(user_key), value });
                true
            },
            Err(source) => {
                self.fail(StagingError::Codec { source });
                false
            },
        }
    }

    fn finish(&mut self) {
        self.scan = None;
        self.current = None;
        self.exhausted = true;
    }

    fn fail(&mut self, err: StagingError) {
        self.scan = None;
        self.current = None;
        self.err = Some(err);
    }
}

//! Fault injection for store-backed tests.
//!
//! [`FlakyStore`] wraps any [`Store`] and fails mutations once an armed
//! budget runs out, simulating a backend that dies partway through a bulk
//! operation. Tests use it to verify that interrupted work is resumable:
//! partial progress stays durable and a retry completes the job.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use basin_kv::{Error, Result, ScanIterator, ScanOptions, Store};

/// A [`Store`] wrapper that injects a failure after a configured number of
/// mutations.
///
/// While armed, each `set`, `set_if`, and `delete` consumes one unit of
/// budget; the mutation that finds the budget empty fails with
/// [`Error::Backend`] and leaves the wrapped store untouched. Reads and
/// scans always pass through. Disarm (or re-arm) at any time; all state is
/// atomic, so the wrapper can be shared across threads.
#[derive(Debug)]
pub struct FlakyStore<S> {
    inner: S,
    budget: AtomicUsize,
    armed: AtomicBool,
}

impl<S> FlakyStore<S> {
    /// Wraps `inner` with fault injection disarmed.
    pub fn new(inner: S) -> Self {
        Self { inner, budget: AtomicUsize::new(0), armed: AtomicBool::new(false) }
    }

    /// Arms the wrapper: the next `mutations` mutations succeed, then every
    /// following one fails until [`disarm`](FlakyStore::disarm) is called.
    pub fn arm(&self, mutations: usize) {
        self.budget.store(mutations, Ordering::SeqCst);
        self.armed.store(true, Ordering::SeqCst);
    }

    /// Disarms the wrapper; all operations pass through again.
    pub fn disarm(&self) {
        self.armed.store(false, Ordering::SeqCst);
    }

    /// Returns a reference to the wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn charge(&self) -> Result<()> {
        if !self.armed.load(Ordering::SeqCst) {
            return Ok(());
        }
        let charged = self.budget.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |budget| {
            budget.checked_sub(1)
        });
        match charged {
            Ok(_) => Ok(()),
            Err(_) => Err(Error::Backend { reason: "injected failure".to_string() }),
        }
    }
}

impl<S: Store> Store for FlakyStore<S> {
    fn get(&self, key: &[u8]) -> Result<Vec<u8>> {
        self.inner.get(key)
    }

    fn set(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.charge()?;
        self.inner.set(key, value)
    }

    fn set_if(&self, key: &[u8], value: &[u8], predicate: Option<&[u8]>) -> Result<()> {
        self.charge()?;
        self.inner.set_if(key, value, predicate)
    }

    fn delete(&self, key: &[u8]) -> Result<()> {
        self.charge()?;
        self.inner.delete(key)
    }

    fn scan(&self, opts: ScanOptions) -> Result<Box<dyn ScanIterator + '_>> {
        self.inner.scan(opts)
    }
}

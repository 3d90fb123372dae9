use std::sync::Arc;

use thiserror::Error;

use supplychain_core::ContractError;

/// One entry produced by a range scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: Vec<u8>,
}

/// World-state access error.
///
/// These are **store errors** (I/O, commit validation) as opposed to contract
/// errors (validation, invariants).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("backend failure: {0}")]
    Backend(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// A key read by the transaction changed before it could commit.
    #[error("read conflict on key '{0}'")]
    MvccConflict(String),

    #[error("transaction has no timestamp")]
    MissingTimestamp,

    #[error("iterator already closed")]
    Closed,
}

impl From<StoreError> for ContractError {
    fn from(value: StoreError) -> Self {
        match value {
            missing @ StoreError::MissingTimestamp => ContractError::timestamp(missing.to_string()),
            other => ContractError::store(other.to_string()),
        }
    }
}

/// Backend half of a range scan.
///
/// Implementations hold whatever resource backs the scan (snapshot, cursor,
/// stream) until `close` is called.
pub trait StateIterator {
    fn next_entry(&mut self) -> Option<Result<KeyValue, StoreError>>;

    /// Release the underlying resource. Called exactly once by `ScanGuard`.
    fn close(&mut self) -> Result<(), StoreError>;
}

/// Scoped range scan.
///
/// Yields entries in key order and closes the backing iterator on every exit
/// path: explicit [`ScanGuard::close`], early `break`, `?` returns, and unwinds.
pub struct ScanGuard<'a> {
    inner: Box<dyn StateIterator + 'a>,
    closed: bool,
}

impl<'a> ScanGuard<'a> {
    pub fn new(inner: impl StateIterator + 'a) -> Self {
        Self {
            inner: Box::new(inner),
            closed: false,
        }
    }

    /// Close the scan, surfacing any release failure to the caller.
    pub fn close(mut self) -> Result<(), StoreError> {
        self.closed = true;
        self.inner.close()
    }
}

impl Iterator for ScanGuard<'_> {
    type Item = Result<KeyValue, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.closed {
            return None;
        }
        self.inner.next_entry()
    }
}

impl Drop for ScanGuard<'_> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(e) = self.inner.close() {
            tracing::warn!("failed to close range iterator: {e}");
        }
    }
}

impl core::fmt::Debug for ScanGuard<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ScanGuard")
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

/// Key/value world state as seen by one transaction.
///
/// Writes are visible to later reads of the same transaction; durability is
/// decided by the host after the invocation returns.
pub trait WorldState {
    /// Read the value under `key`. `Ok(None)` is a successful read of nothing.
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    fn put_state(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError>;

    /// Scan `[start_key, end_key)` in key order. An empty bound is unbounded,
    /// so `("", "")` scans everything.
    fn state_by_range(&self, start_key: &str, end_key: &str)
    -> Result<ScanGuard<'_>, StoreError>;
}

impl<S> WorldState for Arc<S>
where
    S: WorldState + ?Sized,
{
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).get_state(key)
    }

    fn put_state(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        (**self).put_state(key, value)
    }

    fn state_by_range(
        &self,
        start_key: &str,
        end_key: &str,
    ) -> Result<ScanGuard<'_>, StoreError> {
        (**self).state_by_range(start_key, end_key)
    }
}

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use supplychain_core::TxTimestamp;

use crate::context::TransactionContext;
use crate::world_state::{KeyValue, ScanGuard, StateIterator, StoreError, WorldState};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Versioned {
    value: Vec<u8>,
    /// Sequence number of the committing transaction.
    version: u64,
}

/// In-memory ledger with per-transaction simulation.
///
/// Intended for tests/dev. Plays the host's part: each invocation runs in a
/// [`TxSimulator`] whose writes are applied only by [`TxSimulator::commit`],
/// after its read set has been validated against the committed state.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    committed: RwLock<BTreeMap<String, Versioned>>,
    last_commit: AtomicU64,
    tx_counter: AtomicU64,
    open_iterators: Arc<AtomicUsize>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start simulating a transaction. Pass `None` to model a proposal whose
    /// timestamp is missing.
    pub fn begin(&self, timestamp: impl Into<Option<TxTimestamp>>) -> TxSimulator<'_> {
        let n = self.tx_counter.fetch_add(1, Ordering::SeqCst) + 1;
        TxSimulator {
            ledger: self,
            tx_id: format!("tx{n:08}"),
            timestamp: timestamp.into(),
            reads: RwLock::new(BTreeMap::new()),
            ranges: RwLock::new(Vec::new()),
            writes: RwLock::new(BTreeMap::new()),
        }
    }

    /// Committed value under `key`, outside of any transaction.
    pub fn committed_value(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let state = self.read_committed()?;
        Ok(state.get(key).map(|v| v.value.clone()))
    }

    pub fn committed_keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.read_committed()?.keys().cloned().collect())
    }

    /// Number of range iterators handed out and not yet closed.
    pub fn open_iterators(&self) -> usize {
        self.open_iterators.load(Ordering::SeqCst)
    }

    fn read_committed(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, BTreeMap<String, Versioned>>, StoreError> {
        self.committed
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }
}

/// Keys read and written by one transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadWriteSet {
    /// Key → committed version observed (`None` when the key was absent).
    pub reads: BTreeMap<String, Option<u64>>,
    pub writes: BTreeMap<String, Vec<u8>>,
}

#[derive(Debug, Clone)]
struct RangeRead {
    start: String,
    end: String,
    observed: Vec<(String, u64)>,
}

/// One transaction's view of an [`InMemoryLedger`].
///
/// Reads fall through pending writes to the committed state; dropping the
/// simulator without committing discards every write.
#[derive(Debug)]
pub struct TxSimulator<'a> {
    ledger: &'a InMemoryLedger,
    tx_id: String,
    timestamp: Option<TxTimestamp>,
    reads: RwLock<BTreeMap<String, Option<u64>>>,
    ranges: RwLock<Vec<RangeRead>>,
    writes: RwLock<BTreeMap<String, Vec<u8>>>,
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Backend("lock poisoned".to_string())
}

fn range_bounds<'k>(start: &'k str, end: &'k str) -> (Bound<&'k str>, Bound<&'k str>) {
    let lower = if start.is_empty() {
        Bound::Unbounded
    } else {
        Bound::Included(start)
    };
    let upper = if end.is_empty() {
        Bound::Unbounded
    } else {
        Bound::Excluded(end)
    };
    (lower, upper)
}

fn scan_committed(
    state: &BTreeMap<String, Versioned>,
    start: &str,
    end: &str,
) -> Vec<(String, u64)> {
    if !start.is_empty() && !end.is_empty() && start >= end {
        return vec![];
    }
    state
        .range::<str, _>(range_bounds(start, end))
        .map(|(k, v)| (k.clone(), v.version))
        .collect()
}

impl TxSimulator<'_> {
    pub fn rw_set(&self) -> Result<ReadWriteSet, StoreError> {
        Ok(ReadWriteSet {
            reads: self.reads.read().map_err(poisoned)?.clone(),
            writes: self.writes.read().map_err(poisoned)?.clone(),
        })
    }

    /// Validate the read set and apply the writes atomically.
    ///
    /// Returns the commit sequence number assigned to the writes.
    pub fn commit(self) -> Result<u64, StoreError> {
        let reads = self.reads.into_inner().map_err(poisoned)?;
        let ranges = self.ranges.into_inner().map_err(poisoned)?;
        let writes = self.writes.into_inner().map_err(poisoned)?;

        let mut state = self.ledger.committed.write().map_err(poisoned)?;

        for (key, seen) in &reads {
            let current = state.get(key).map(|v| v.version);
            if current != *seen {
                return Err(StoreError::MvccConflict(key.clone()));
            }
        }
        for range in &ranges {
            if scan_committed(&state, &range.start, &range.end) != range.observed {
                return Err(StoreError::MvccConflict(format!(
                    "range [{}, {})",
                    range.start, range.end
                )));
            }
        }

        let version = self.ledger.last_commit.fetch_add(1, Ordering::SeqCst) + 1;
        let written = writes.len();
        for (key, value) in writes {
            state.insert(key, Versioned { value, version });
        }

        tracing::debug!(tx_id = %self.tx_id, version, written, "transaction committed");
        Ok(version)
    }
}

impl WorldState for TxSimulator<'_> {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        if let Some(pending) = self.writes.read().map_err(poisoned)?.get(key) {
            return Ok(Some(pending.clone()));
        }

        let state = self.ledger.read_committed()?;
        let entry = state.get(key);
        self.reads
            .write()
            .map_err(poisoned)?
            .entry(key.to_string())
            .or_insert_with(|| entry.map(|v| v.version));
        Ok(entry.map(|v| v.value.clone()))
    }

    fn put_state(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        if key.is_empty() {
            return Err(StoreError::InvalidKey("key must not be empty".to_string()));
        }
        self.writes
            .write()
            .map_err(poisoned)?
            .insert(key.to_string(), value);
        Ok(())
    }

    fn state_by_range(
        &self,
        start_key: &str,
        end_key: &str,
    ) -> Result<ScanGuard<'_>, StoreError> {
        let mut merged: BTreeMap<String, Vec<u8>> = BTreeMap::new();
        let observed = {
            let state = self.ledger.read_committed()?;
            let observed = scan_committed(&state, start_key, end_key);
            for (key, _) in &observed {
                if let Some(v) = state.get(key) {
                    merged.insert(key.clone(), v.value.clone());
                }
            }
            observed
        };
        self.ranges.write().map_err(poisoned)?.push(RangeRead {
            start: start_key.to_string(),
            end: end_key.to_string(),
            observed,
        });

        let writes = self.writes.read().map_err(poisoned)?;
        if start_key.is_empty() || end_key.is_empty() || start_key < end_key {
            for (key, value) in writes.range::<str, _>(range_bounds(start_key, end_key)) {
                merged.insert(key.clone(), value.clone());
            }
        }

        let entries = merged
            .into_iter()
            .map(|(key, value)| KeyValue { key, value })
            .collect::<Vec<_>>();
        Ok(ScanGuard::new(SnapshotIterator::open(
            entries,
            self.ledger.open_iterators.clone(),
        )))
    }
}

impl TransactionContext for TxSimulator<'_> {
    type Stub = Self;

    fn stub(&self) -> &Self::Stub {
        self
    }

    fn tx_id(&self) -> &str {
        &self.tx_id
    }

    fn tx_timestamp(&self) -> Result<TxTimestamp, StoreError> {
        self.timestamp.ok_or(StoreError::MissingTimestamp)
    }
}

/// Range iterator over a materialized snapshot.
struct SnapshotIterator {
    entries: std::vec::IntoIter<KeyValue>,
    open: Arc<AtomicUsize>,
    closed: bool,
}

impl SnapshotIterator {
    fn open(entries: Vec<KeyValue>, open: Arc<AtomicUsize>) -> Self {
        open.fetch_add(1, Ordering::SeqCst);
        Self {
            entries: entries.into_iter(),
            open,
            closed: false,
        }
    }
}

impl StateIterator for SnapshotIterator {
    fn next_entry(&mut self) -> Option<Result<KeyValue, StoreError>> {
        if self.closed {
            return Some(Err(StoreError::Closed));
        }
        self.entries.next().map(Ok)
    }

    fn close(&mut self) -> Result<(), StoreError> {
        if self.closed {
            return Err(StoreError::Closed);
        }
        self.closed = true;
        self.open.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

//! World-state access contract and an in-memory ledger.
//!
//! Contract code only sees [`TransactionContext`] and [`WorldState`]; the
//! in-memory ledger stands in for the host platform in tests and the dev host.

pub mod context;
pub mod in_memory;
pub mod world_state;

pub use context::TransactionContext;
pub use in_memory::{InMemoryLedger, ReadWriteSet, TxSimulator};
pub use world_state::{KeyValue, ScanGuard, StateIterator, StoreError, WorldState};

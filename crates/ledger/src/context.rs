use supplychain_core::TxTimestamp;

use crate::world_state::{StoreError, WorldState};

/// Per-invocation collaborator handed to every lifecycle operation.
///
/// Exposes the transaction's view of world state and the proposer-assigned
/// timestamp. Nothing else about the host leaks into contract code.
pub trait TransactionContext {
    type Stub: WorldState;

    fn stub(&self) -> &Self::Stub;

    fn tx_id(&self) -> &str;

    fn tx_timestamp(&self) -> Result<TxTimestamp, StoreError>;
}

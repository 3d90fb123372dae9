//! Entity trait and the JSON state codec.
//!
//! An entity is stored as one JSON document under its own key. The codec is
//! the only place that turns records into bytes and back.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{ContractError, ContractResult};

/// Entity marker + minimal interface.
pub trait Entity: Serialize + DeserializeOwned {
    /// Human-readable entity kind, used in error messages.
    const KIND: &'static str;

    /// World-state key this entity is stored under.
    fn key(&self) -> &str;
}

/// Serialize an entity into its stored representation.
pub fn encode<E: Entity>(entity: &E) -> ContractResult<Vec<u8>> {
    serde_json::to_vec(entity)
        .map_err(|e| ContractError::Encode(format!("{} {}: {e}", E::KIND, entity.key())))
}

/// Decode stored bytes directly into an entity value.
///
/// Schema mismatches (missing fields, `null`, wrong types) fail instead of
/// producing a default-filled record.
pub fn decode<E: Entity>(key: &str, bytes: &[u8]) -> ContractResult<E> {
    serde_json::from_slice(bytes)
        .map_err(|e| ContractError::Decode(format!("{} {key}: {e}", E::KIND)))
}

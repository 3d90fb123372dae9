//! `supplychain-core` — contract foundation building blocks.
//!
//! This crate contains **pure** primitives (no world-state access): the
//! contract error model, the entity codec, and transaction timestamps.

pub mod entity;
pub mod error;
pub mod timestamp;

pub use entity::{Entity, decode, encode};
pub use error::{ContractError, ContractResult};
pub use timestamp::TxTimestamp;

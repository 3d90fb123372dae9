//! Products domain module (world-state backed).
//!
//! This crate contains the product record and its lifecycle operations,
//! implemented as deterministic contract logic over an abstract transaction
//! context (no host runtime, no concrete storage).

pub mod contract;
pub mod product;

pub use contract::{ProductLifecycle, SupplyChainContract};
pub use product::{NewProduct, Product, ProductUpdate, STATUS_MANUFACTURED, seed_products};

//! Chaincode composition root: configuration, function routing, and the dev
//! host that serves invocations against an in-memory ledger.

pub mod config;
pub mod host;
pub mod router;

pub use config::ChaincodeConfig;
pub use host::{DevHost, HostError, Invocation, Response};
pub use router::{Chaincode, Function, InvokeError};

//! Development host.
//!
//! Stands in for the peer: every invocation runs in its own transaction on an
//! in-memory ledger. Submitted transactions are committed when the chaincode
//! succeeds and discarded when it fails; read-only ones are never committed.
//!
//! Wire format is one JSON object per line in each direction:
//!
//! ```text
//! -> {"function":"CreateProduct","args":["p3","Tablet","CompanyA","",""],"timestamp":{"seconds":1714564800}}
//! <- {"status":200}
//! -> {"function":"QueryProduct","args":["p404"]}
//! <- {"status":500,"message":"product p404 does not exist","kind":"not_found"}
//! ```

use std::io::{BufRead, Write};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

use supplychain_core::TxTimestamp;
use supplychain_ledger::{InMemoryLedger, StoreError, TransactionContext};
use supplychain_products::{ProductLifecycle, SupplyChainContract};

use crate::router::{Chaincode, Function, InvokeError};

pub const STATUS_OK: u16 = 200;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_ERROR: u16 = 500;

/// One transaction proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    pub function: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// Proposer-assigned timestamp; operations that need one fail without it.
    #[serde(default)]
    pub timestamp: Option<TxTimestamp>,
}

impl Invocation {
    pub fn new<I, S>(function: impl Into<String>, args: I, timestamp: TxTimestamp) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            function: function.into(),
            args: args.into_iter().map(Into::into).collect(),
            timestamp: Some(timestamp),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Machine-readable error kind, e.g. `not_found`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl Response {
    pub fn ok(payload: Option<JsonValue>) -> Self {
        Self {
            status: STATUS_OK,
            payload,
            message: None,
            kind: None,
        }
    }

    pub fn error(status: u16, kind: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            payload: None,
            message: Some(message.into()),
            kind: Some(kind.to_string()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }
}

#[derive(Debug, Error)]
pub enum HostError {
    #[error(transparent)]
    Invoke(#[from] InvokeError),

    #[error("commit failed: {0}")]
    Commit(#[from] StoreError),
}

impl HostError {
    pub fn kind(&self) -> &'static str {
        match self {
            HostError::Invoke(e) => e.kind(),
            HostError::Commit(_) => "commit",
        }
    }
}

/// In-memory peer hosting one chaincode.
#[derive(Debug)]
pub struct DevHost<L = SupplyChainContract> {
    ledger: InMemoryLedger,
    chaincode: Chaincode<L>,
}

impl<L: ProductLifecycle> DevHost<L> {
    pub fn new(chaincode: Chaincode<L>) -> Self {
        Self {
            ledger: InMemoryLedger::new(),
            chaincode,
        }
    }

    pub fn ledger(&self) -> &InMemoryLedger {
        &self.ledger
    }

    pub fn chaincode(&self) -> &Chaincode<L> {
        &self.chaincode
    }

    /// Execute one invocation in its own transaction and return the raw payload.
    pub fn execute(&self, invocation: &Invocation) -> Result<Vec<u8>, HostError> {
        let function = self.chaincode.resolve(&invocation.function)?;
        let tx = self.ledger.begin(invocation.timestamp);

        let payload = match self
            .chaincode
            .invoke(&tx, &invocation.function, &invocation.args)
        {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(
                    tx_id = %tx.tx_id(),
                    %function,
                    error_kind = e.kind(),
                    "invocation failed: {e}"
                );
                return Err(e.into());
            }
        };

        if !function.is_read_only() {
            tx.commit()?;
        }
        Ok(payload)
    }

    pub fn handle(&self, invocation: &Invocation) -> Response {
        match self.execute(invocation) {
            Ok(bytes) if bytes.is_empty() => Response::ok(None),
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(value) => Response::ok(Some(value)),
                Err(e) => {
                    Response::error(STATUS_ERROR, "payload", format!("malformed payload: {e}"))
                }
            },
            Err(HostError::Invoke(e @ InvokeError::UnknownFunction { .. }))
            | Err(HostError::Invoke(e @ InvokeError::ArgumentCount { .. })) => {
                Response::error(STATUS_BAD_REQUEST, e.kind(), e.to_string())
            }
            Err(e) => Response::error(STATUS_ERROR, e.kind(), e.to_string()),
        }
    }

    pub fn handle_line(&self, line: &str) -> Response {
        match serde_json::from_str::<Invocation>(line) {
            Ok(invocation) => self.handle(&invocation),
            Err(e) => Response::error(
                STATUS_BAD_REQUEST,
                "malformed_invocation",
                format!("malformed invocation: {e}"),
            ),
        }
    }

    /// Seed the ledger by running `InitLedger` at `timestamp`.
    pub fn bootstrap(&self, timestamp: TxTimestamp) -> anyhow::Result<()> {
        let invocation = Invocation::new(Function::InitLedger.name(), Vec::<String>::new(), timestamp);
        self.execute(&invocation)
            .with_context(|| format!("failed to initialize chaincode '{}'", self.chaincode.name()))?;
        tracing::info!(chaincode = %self.chaincode.name(), "ledger initialized");
        Ok(())
    }

    /// Serve line-delimited invocations until `reader` is exhausted.
    pub fn serve<R: BufRead, W: Write>(&self, reader: R, mut writer: W) -> anyhow::Result<()> {
        for line in reader.lines() {
            let line = line.context("failed to read invocation")?;
            if line.trim().is_empty() {
                continue;
            }

            let response = self.handle_line(&line);
            serde_json::to_writer(&mut writer, &response).context("failed to write response")?;
            writer.write_all(b"\n").context("failed to write response")?;
            writer.flush().context("failed to flush response")?;
        }
        Ok(())
    }
}

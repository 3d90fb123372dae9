//! Contract error model.

use thiserror::Error;

/// Result type used by every lifecycle operation.
pub type ContractResult<T> = Result<T, ContractError>;

/// Contract-level error.
///
/// Every variant aborts the current invocation; the host discards any pending
/// writes. Nothing here is retried locally.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContractError {
    /// A required argument was empty or otherwise malformed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A record with this ID is already stored.
    #[error("product {id} already exists")]
    AlreadyExists { id: String },

    /// The operation requires an existing record and none is stored.
    #[error("product {id} does not exist")]
    NotFound { id: String },

    /// Stored bytes could not be decoded into the expected record.
    #[error("failed to decode state: {0}")]
    Decode(String),

    /// A record could not be serialized for storage.
    #[error("failed to encode state: {0}")]
    Encode(String),

    /// The world-state store failed.
    #[error("failed to access world state: {0}")]
    Store(String),

    /// The transaction timestamp was unavailable or unrepresentable.
    #[error("failed to get transaction timestamp: {0}")]
    Timestamp(String),

    /// A freshly written record was not visible to a subsequent read.
    #[error("product {id} was written but is not visible in world state")]
    WriteVerification { id: String },
}

impl ContractError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn already_exists(id: impl Into<String>) -> Self {
        Self::AlreadyExists { id: id.into() }
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn timestamp(msg: impl Into<String>) -> Self {
        Self::Timestamp(msg.into())
    }

    pub fn write_verification(id: impl Into<String>) -> Self {
        Self::WriteVerification { id: id.into() }
    }

    /// Short, stable name of the error kind (used in logs and host responses).
    pub fn kind(&self) -> &'static str {
        match self {
            ContractError::Validation(_) => "validation",
            ContractError::AlreadyExists { .. } => "already_exists",
            ContractError::NotFound { .. } => "not_found",
            ContractError::Decode(_) => "decode",
            ContractError::Encode(_) => "encode",
            ContractError::Store(_) => "store",
            ContractError::Timestamp(_) => "timestamp",
            ContractError::WriteVerification { .. } => "write_verification",
        }
    }
}

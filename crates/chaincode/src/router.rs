//! Function-name routing.
//!
//! The host invokes the chaincode with a function name and a list of string
//! arguments. The router checks both against the operation table, calls the
//! contract, and renders the result as a JSON payload.

use serde::Serialize;
use thiserror::Error;

use supplychain_core::ContractError;
use supplychain_ledger::TransactionContext;
use supplychain_products::{ProductLifecycle, SupplyChainContract};

/// Operations exposed to the host.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Function {
    InitLedger,
    CreateProduct,
    UpdateProduct,
    TransferOwnership,
    QueryProduct,
    ProductExists,
    GetAllProducts,
}

impl Function {
    pub const ALL: [Function; 7] = [
        Function::InitLedger,
        Function::CreateProduct,
        Function::UpdateProduct,
        Function::TransferOwnership,
        Function::QueryProduct,
        Function::ProductExists,
        Function::GetAllProducts,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Function::InitLedger => "InitLedger",
            Function::CreateProduct => "CreateProduct",
            Function::UpdateProduct => "UpdateProduct",
            Function::TransferOwnership => "TransferOwnership",
            Function::QueryProduct => "QueryProduct",
            Function::ProductExists => "ProductExists",
            Function::GetAllProducts => "GetAllProducts",
        }
    }

    /// Parameter names, in call order.
    pub fn params(self) -> &'static [&'static str] {
        match self {
            Function::InitLedger | Function::GetAllProducts => &[],
            Function::CreateProduct => &["id", "name", "owner", "description", "category"],
            Function::UpdateProduct => &[
                "id",
                "newStatus",
                "newOwner",
                "newDescription",
                "newCategory",
            ],
            Function::TransferOwnership => &["id", "newOwner"],
            Function::QueryProduct | Function::ProductExists => &["id"],
        }
    }

    /// Read-only functions are evaluated; their transactions are never committed.
    pub fn is_read_only(self) -> bool {
        matches!(
            self,
            Function::QueryProduct | Function::ProductExists | Function::GetAllProducts
        )
    }
}

impl core::fmt::Display for Function {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvokeError {
    #[error("function '{function}' is not defined in chaincode '{chaincode}'")]
    UnknownFunction { chaincode: String, function: String },

    #[error("function '{function}' expects {expected} arguments, got {actual}")]
    ArgumentCount {
        function: Function,
        expected: usize,
        actual: usize,
    },

    #[error(transparent)]
    Contract(#[from] ContractError),

    #[error("failed to serialize response payload: {0}")]
    Payload(String),
}

impl InvokeError {
    /// Stable error kind; contract errors report their own.
    pub fn kind(&self) -> &'static str {
        match self {
            InvokeError::UnknownFunction { .. } => "unknown_function",
            InvokeError::ArgumentCount { .. } => "argument_count",
            InvokeError::Contract(e) => e.kind(),
            InvokeError::Payload(_) => "payload",
        }
    }
}

/// A named chaincode wrapping one contract.
#[derive(Debug, Clone)]
pub struct Chaincode<L = SupplyChainContract> {
    name: String,
    contract: L,
}

impl<L> Chaincode<L> {
    pub fn new(name: impl Into<String>, contract: L) -> Self {
        Self {
            name: name.into(),
            contract,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registered functions (contract metadata).
    pub fn functions(&self) -> &'static [Function] {
        &Function::ALL
    }

    pub fn resolve(&self, function: &str) -> Result<Function, InvokeError> {
        Function::from_name(function).ok_or_else(|| InvokeError::UnknownFunction {
            chaincode: self.name.clone(),
            function: function.to_string(),
        })
    }
}

fn payload<T: Serialize>(value: &T) -> Result<Vec<u8>, InvokeError> {
    serde_json::to_vec(value).map_err(|e| InvokeError::Payload(e.to_string()))
}

impl<L: ProductLifecycle> Chaincode<L> {
    /// Run one function inside the given transaction.
    ///
    /// Unit results produce an empty payload.
    pub fn invoke<C: TransactionContext>(
        &self,
        ctx: &C,
        function: &str,
        args: &[String],
    ) -> Result<Vec<u8>, InvokeError> {
        let function = self.resolve(function)?;
        tracing::debug!(%function, tx_id = %ctx.tx_id(), "invoking");

        let c = &self.contract;
        match (function, args) {
            (Function::InitLedger, []) => {
                c.init_ledger(ctx)?;
                Ok(Vec::new())
            }
            (Function::CreateProduct, [id, name, owner, description, category]) => {
                c.create_product(ctx, id, name, owner, description, category)?;
                Ok(Vec::new())
            }
            (Function::UpdateProduct, [id, status, owner, description, category]) => {
                c.update_product(ctx, id, status, owner, description, category)?;
                Ok(Vec::new())
            }
            (Function::TransferOwnership, [id, new_owner]) => {
                c.transfer_ownership(ctx, id, new_owner)?;
                Ok(Vec::new())
            }
            (Function::QueryProduct, [id]) => payload(&c.query_product(ctx, id)?),
            (Function::ProductExists, [id]) => payload(&c.product_exists(ctx, id)?),
            (Function::GetAllProducts, []) => payload(&c.get_all_products(ctx)?),
            (function, _) => Err(InvokeError::ArgumentCount {
                function,
                expected: function.params().len(),
                actual: args.len(),
            }),
        }
    }
}

//! Product lifecycle operations.
//!
//! Each operation validates its arguments, reads what it needs through the
//! transaction context, and writes the next state back. The resulting state
//! depends only on what was read, the arguments, and the transaction
//! timestamp, so every endorsing peer computes the same write set.

use tracing::instrument;

use supplychain_core::{ContractError, ContractResult, decode, encode};
use supplychain_ledger::{TransactionContext, WorldState};

use crate::product::{NewProduct, Product, ProductUpdate, seed_products};

/// Operation surface the chaincode exposes to the host.
pub trait ProductLifecycle {
    /// Seed the ledger with the bootstrap products.
    fn init_ledger<C: TransactionContext>(&self, ctx: &C) -> ContractResult<()>;

    fn create_product<C: TransactionContext>(
        &self,
        ctx: &C,
        id: &str,
        name: &str,
        owner: &str,
        description: &str,
        category: &str,
    ) -> ContractResult<()>;

    /// Update status/owner/description/category; empty arguments are ignored.
    ///
    /// A missing product is first created as a blank placeholder, so this
    /// never fails with `NotFound`.
    fn update_product<C: TransactionContext>(
        &self,
        ctx: &C,
        id: &str,
        new_status: &str,
        new_owner: &str,
        new_description: &str,
        new_category: &str,
    ) -> ContractResult<()>;

    fn transfer_ownership<C: TransactionContext>(
        &self,
        ctx: &C,
        id: &str,
        new_owner: &str,
    ) -> ContractResult<()>;

    fn query_product<C: TransactionContext>(&self, ctx: &C, id: &str) -> ContractResult<Product>;

    fn product_exists<C: TransactionContext>(&self, ctx: &C, id: &str) -> ContractResult<bool>;

    /// Every stored product, in key order.
    fn get_all_products<C: TransactionContext>(&self, ctx: &C) -> ContractResult<Vec<Product>>;
}

/// The supply-chain contract. Stateless; all state lives in world state.
#[derive(Debug, Default, Clone, Copy)]
pub struct SupplyChainContract;

impl SupplyChainContract {
    pub fn new() -> Self {
        Self
    }

    fn timestamp<C: TransactionContext>(ctx: &C) -> ContractResult<String> {
        ctx.tx_timestamp()?.to_rfc3339()
    }

    fn require_id(id: &str) -> ContractResult<()> {
        if id.is_empty() {
            return Err(ContractError::validation("product id cannot be empty"));
        }
        Ok(())
    }

    fn ensure_creatable<C: TransactionContext>(&self, ctx: &C, id: &str) -> ContractResult<()> {
        Self::require_id(id)?;
        if self.product_exists(ctx, id)? {
            return Err(ContractError::already_exists(id));
        }
        Ok(())
    }

    fn put_product<C: TransactionContext>(ctx: &C, product: &Product) -> ContractResult<()> {
        let bytes = encode(product)?;
        ctx.stub().put_state(&product.id, bytes)?;
        tracing::debug!(product_id = %product.id, tx_id = %ctx.tx_id(), "product written");
        Ok(())
    }

    /// Write a new product and check that it reads back.
    fn insert_new<C: TransactionContext>(
        &self,
        ctx: &C,
        new: NewProduct,
        timestamp: &str,
    ) -> ContractResult<()> {
        let product = Product::manufactured(new, timestamp);
        Self::put_product(ctx, &product)?;

        if !self.product_exists(ctx, &product.id)? {
            return Err(ContractError::write_verification(&product.id));
        }
        Ok(())
    }
}

impl ProductLifecycle for SupplyChainContract {
    #[instrument(skip_all, fields(tx_id = %ctx.tx_id()), err)]
    fn init_ledger<C: TransactionContext>(&self, ctx: &C) -> ContractResult<()> {
        let timestamp = Self::timestamp(ctx)?;

        let seeds = seed_products();
        let count = seeds.len();
        for new in seeds {
            self.ensure_creatable(ctx, &new.id)?;
            self.insert_new(ctx, new, &timestamp)?;
        }

        tracing::info!(count, %timestamp, "ledger seeded");
        Ok(())
    }

    #[instrument(skip(self, ctx), fields(tx_id = %ctx.tx_id()), err)]
    fn create_product<C: TransactionContext>(
        &self,
        ctx: &C,
        id: &str,
        name: &str,
        owner: &str,
        description: &str,
        category: &str,
    ) -> ContractResult<()> {
        self.ensure_creatable(ctx, id)?;
        let timestamp = Self::timestamp(ctx)?;
        self.insert_new(
            ctx,
            NewProduct::new(id, name, owner, description, category),
            &timestamp,
        )
    }

    #[instrument(skip(self, ctx), fields(tx_id = %ctx.tx_id()), err)]
    fn update_product<C: TransactionContext>(
        &self,
        ctx: &C,
        id: &str,
        new_status: &str,
        new_owner: &str,
        new_description: &str,
        new_category: &str,
    ) -> ContractResult<()> {
        Self::require_id(id)?;

        if !self.product_exists(ctx, id)? {
            tracing::warn!(product_id = %id, "update of unknown product; creating placeholder");
            self.create_product(ctx, id, "", "", "", "")?;
        }

        let mut product = self.query_product(ctx, id)?;
        product.apply_update(
            &ProductUpdate::new(new_status, new_owner, new_description, new_category),
            ctx.tx_timestamp()?,
        )?;
        Self::put_product(ctx, &product)
    }

    #[instrument(skip(self, ctx), fields(tx_id = %ctx.tx_id()), err)]
    fn transfer_ownership<C: TransactionContext>(
        &self,
        ctx: &C,
        id: &str,
        new_owner: &str,
    ) -> ContractResult<()> {
        Self::require_id(id)?;
        if new_owner.is_empty() {
            return Err(ContractError::validation("new owner cannot be empty"));
        }

        let mut product = self.query_product(ctx, id)?;
        product.transfer_to(new_owner, ctx.tx_timestamp()?)?;
        Self::put_product(ctx, &product)
    }

    #[instrument(level = "debug", skip(self, ctx))]
    fn query_product<C: TransactionContext>(&self, ctx: &C, id: &str) -> ContractResult<Product> {
        if !self.product_exists(ctx, id)? {
            return Err(ContractError::not_found(id));
        }

        let bytes = ctx
            .stub()
            .get_state(id)?
            .ok_or_else(|| ContractError::not_found(id))?;
        decode(id, &bytes)
    }

    fn product_exists<C: TransactionContext>(&self, ctx: &C, id: &str) -> ContractResult<bool> {
        Ok(ctx.stub().get_state(id)?.is_some())
    }

    #[instrument(level = "debug", skip_all, err)]
    fn get_all_products<C: TransactionContext>(&self, ctx: &C) -> ContractResult<Vec<Product>> {
        let mut scan = ctx.stub().state_by_range("", "")?;

        let mut products = Vec::new();
        for entry in scan.by_ref() {
            let kv = entry?;
            products.push(decode::<Product>(&kv.key, &kv.value)?);
        }
        scan.close()?;

        Ok(products)
    }
}

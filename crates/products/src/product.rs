use serde::{Deserialize, Serialize};

use supplychain_core::{ContractResult, Entity, TxTimestamp};

/// Status every product starts its life with.
pub const STATUS_MANUFACTURED: &str = "Manufactured";

/// Stored product record.
///
/// Serialized as one JSON object under its `id`. All fields are required on
/// decode; `status` is a free-text label with no enforced transitions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub status: String,
    pub owner: String,
    pub created_at: String,
    pub updated_at: String,
    pub description: String,
    pub category: String,
}

impl Entity for Product {
    const KIND: &'static str = "product";

    fn key(&self) -> &str {
        &self.id
    }
}

/// Caller-supplied fields of a product about to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub id: String,
    pub name: String,
    pub owner: String,
    pub description: String,
    pub category: String,
}

impl NewProduct {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        owner: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            owner: owner.into(),
            description: description.into(),
            category: category.into(),
        }
    }
}

/// Partial update; an empty field leaves the stored value unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductUpdate {
    pub status: String,
    pub owner: String,
    pub description: String,
    pub category: String,
}

impl ProductUpdate {
    pub fn new(
        status: impl Into<String>,
        owner: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            status: status.into(),
            owner: owner.into(),
            description: description.into(),
            category: category.into(),
        }
    }
}

fn overwrite_if_set(field: &mut String, value: &str) {
    if !value.is_empty() {
        *field = value.to_string();
    }
}

impl Product {
    /// Build a freshly manufactured product; both timestamps are `timestamp`.
    pub fn manufactured(new: NewProduct, timestamp: &str) -> Self {
        Self {
            id: new.id,
            name: new.name,
            status: STATUS_MANUFACTURED.to_string(),
            owner: new.owner,
            created_at: timestamp.to_string(),
            updated_at: timestamp.to_string(),
            description: new.description,
            category: new.category,
        }
    }

    /// Overwrite the non-empty fields of `update` and move `updated_at`.
    pub fn apply_update(&mut self, update: &ProductUpdate, at: TxTimestamp) -> ContractResult<()> {
        self.touch(at)?;
        overwrite_if_set(&mut self.status, &update.status);
        overwrite_if_set(&mut self.owner, &update.owner);
        overwrite_if_set(&mut self.description, &update.description);
        overwrite_if_set(&mut self.category, &update.category);
        Ok(())
    }

    pub fn transfer_to(&mut self, new_owner: &str, at: TxTimestamp) -> ContractResult<()> {
        self.touch(at)?;
        self.owner = new_owner.to_string();
        Ok(())
    }

    /// Set `updated_at` to `at`, or keep the latest recorded time when `at`
    /// is earlier. `updated_at` never decreases and never precedes
    /// `created_at`.
    fn touch(&mut self, at: TxTimestamp) -> ContractResult<()> {
        let floor = TxTimestamp::parse_rfc3339(&self.created_at)?
            .max(TxTimestamp::parse_rfc3339(&self.updated_at)?);
        if at < floor {
            tracing::warn!(
                product_id = %self.id,
                updated_at = %self.updated_at,
                tx_seconds = at.seconds,
                "transaction timestamp precedes the last change; keeping updated_at"
            );
        }
        self.updated_at = at.max(floor).to_rfc3339()?;
        Ok(())
    }
}

/// Products written by `InitLedger`.
pub fn seed_products() -> Vec<NewProduct> {
    vec![
        NewProduct::new(
            "p1",
            "Laptop",
            "CompanyA",
            "High-end gaming laptop",
            "Electronics",
        ),
        NewProduct::new(
            "p2",
            "Smartphone",
            "CompanyB",
            "Latest model smartphone",
            "Electronics",
        ),
    ]
}

//! Test catalogs: `Catalog` implementations backed by fixed data.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use keepsake_core::catalog::Catalog;
use keepsake_core::error::DomainError;
use uuid::Uuid;

/// A catalog holding a fixed set of products and variants.
#[derive(Debug, Default, Clone)]
pub struct StaticCatalog {
    products: HashSet<Uuid>,
    variants: HashMap<Uuid, Uuid>,
}

impl StaticCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a product.
    #[must_use]
    pub fn with_product(mut self, product_id: Uuid) -> Self {
        self.products.insert(product_id);
        self
    }

    /// Add a variant of `product_id`, registering the product too.
    #[must_use]
    pub fn with_variant(mut self, product_id: Uuid, variant_id: Uuid) -> Self {
        self.products.insert(product_id);
        self.variants.insert(variant_id, product_id);
        self
    }
}

#[async_trait]
impl Catalog for StaticCatalog {
    async fn product_exists(&self, product_id: Uuid) -> Result<bool, DomainError> {
        Ok(self.products.contains(&product_id))
    }

    async fn variant_exists(&self, variant_id: Uuid) -> Result<bool, DomainError> {
        Ok(self.variants.contains_key(&variant_id))
    }

    async fn variant_belongs_to_product(
        &self,
        variant_id: Uuid,
        product_id: Uuid,
    ) -> Result<bool, DomainError> {
        Ok(self.variants.get(&variant_id) == Some(&product_id))
    }
}

/// A catalog that always returns an infrastructure error.
#[derive(Debug)]
pub struct FailingCatalog;

#[async_trait]
impl Catalog for FailingCatalog {
    async fn product_exists(&self, _product_id: Uuid) -> Result<bool, DomainError> {
        Err(DomainError::Infrastructure("catalog unavailable".into()))
    }

    async fn variant_exists(&self, _variant_id: Uuid) -> Result<bool, DomainError> {
        Err(DomainError::Infrastructure("catalog unavailable".into()))
    }

    async fn variant_belongs_to_product(
        &self,
        _variant_id: Uuid,
        _product_id: Uuid,
    ) -> Result<bool, DomainError> {
        Err(DomainError::Infrastructure("catalog unavailable".into()))
    }
}

//! Product catalog abstraction.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::DomainError;

/// Read-only view of the host platform's product catalog.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Whether a product with this id exists.
    async fn product_exists(&self, product_id: Uuid) -> Result<bool, DomainError>;

    /// Whether a product variant with this id exists.
    async fn variant_exists(&self, variant_id: Uuid) -> Result<bool, DomainError>;

    /// Whether the variant belongs to the product.
    async fn variant_belongs_to_product(
        &self,
        variant_id: Uuid,
        product_id: Uuid,
    ) -> Result<bool, DomainError>;
}

//! `PostgreSQL` implementation of the `Catalog` trait.
//!
//! Reads the `products` and `product_variants` tables the host platform
//! keeps in sync.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use keepsake_core::catalog::Catalog;
use keepsake_core::error::DomainError;

/// PostgreSQL-backed product catalog.
#[derive(Debug, Clone)]
pub struct PgProductCatalog {
    pool: PgPool,
}

impl PgProductCatalog {
    /// Creates a new `PgProductCatalog`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn exists(&self, sql: &str, ids: &[Uuid]) -> Result<bool, DomainError> {
        let mut query = sqlx::query_scalar::<_, bool>(sql);
        for id in ids {
            query = query.bind(*id);
        }
        query
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::Infrastructure(e.to_string()))
    }
}

#[async_trait]
impl Catalog for PgProductCatalog {
    async fn product_exists(&self, product_id: Uuid) -> Result<bool, DomainError> {
        self.exists("SELECT EXISTS (SELECT 1 FROM products WHERE id = $1)", &[product_id])
            .await
    }

    async fn variant_exists(&self, variant_id: Uuid) -> Result<bool, DomainError> {
        self.exists(
            "SELECT EXISTS (SELECT 1 FROM product_variants WHERE id = $1)",
            &[variant_id],
        )
        .await
    }

    async fn variant_belongs_to_product(
        &self,
        variant_id: Uuid,
        product_id: Uuid,
    ) -> Result<bool, DomainError> {
        self.exists(
            "SELECT EXISTS (SELECT 1 FROM product_variants WHERE id = $1 AND product_id = $2)",
            &[variant_id, product_id],
        )
        .await
    }
}

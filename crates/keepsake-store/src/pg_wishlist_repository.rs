//! `PostgreSQL` implementation of the `WishlistRepository` trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use tracing::warn;
use uuid::Uuid;

use keepsake_core::error::DomainError;
use keepsake_core::repository::{StoredItem, StoredWishlist, WishlistRepository};
use keepsake_core::token::WishlistToken;

const SELECT_WISHLIST: &str = "SELECT w.id, w.token, w.owner_id, w.version, w.created_at, \
     w.updated_at, i.product_id, i.variant_id \
     FROM wishlists w LEFT JOIN wishlist_items i ON i.wishlist_id = w.id";

const ORDER_ITEMS: &str = "ORDER BY i.product_id, i.variant_id NULLS FIRST";

/// One wishlist joined with one of its items. A wishlist without items
/// yields a single row with no `product_id`.
#[derive(Debug, sqlx::FromRow)]
struct WishlistItemRow {
    id: Uuid,
    token: String,
    owner_id: Option<Uuid>,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    product_id: Option<Uuid>,
    variant_id: Option<Uuid>,
}

/// PostgreSQL-backed wishlist repository.
#[derive(Debug, Clone)]
pub struct PgWishlistRepository {
    pool: PgPool,
}

impl PgWishlistRepository {
    /// Creates a new `PgWishlistRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Loads a wishlist and its items in one statement, so the version and
    /// the items come from the same snapshot.
    async fn fetch_where(
        &self,
        predicate: &str,
        key: impl for<'q> sqlx::Encode<'q, sqlx::Postgres> + sqlx::Type<sqlx::Postgres> + Send,
    ) -> Result<Option<StoredWishlist>, DomainError> {
        let sql = format!("{SELECT_WISHLIST} WHERE {predicate} {ORDER_ITEMS}");
        let rows = sqlx::query_as::<_, WishlistItemRow>(&sql)
            .bind(key)
            .fetch_all(&self.pool)
            .await
            .map_err(infrastructure)?;
        hydrate(&rows)
    }
}

/// Folds joined rows into a stored wishlist.
fn hydrate(rows: &[WishlistItemRow]) -> Result<Option<StoredWishlist>, DomainError> {
    let Some(first) = rows.first() else {
        return Ok(None);
    };

    let token = WishlistToken::parse(first.token.as_str()).map_err(|e| {
        DomainError::Infrastructure(format!(
            "stored token for wishlist {} is invalid: {e}",
            first.id
        ))
    })?;

    Ok(Some(StoredWishlist {
        id: first.id,
        token,
        owner_id: first.owner_id,
        items: rows
            .iter()
            .filter_map(|row| {
                row.product_id.map(|product_id| StoredItem {
                    product_id,
                    variant_id: row.variant_id,
                })
            })
            .collect(),
        version: first.version,
        created_at: first.created_at,
        updated_at: first.updated_at,
    }))
}

fn infrastructure(err: sqlx::Error) -> DomainError {
    DomainError::Infrastructure(err.to_string())
}

/// Maps unique-key violations to a conflict; everything else is
/// infrastructure.
fn write_error(err: sqlx::Error, wishlist: &StoredWishlist) -> DomainError {
    if matches!(&err, sqlx::Error::Database(db) if db.is_unique_violation()) {
        return DomainError::ConcurrencyConflict {
            wishlist_id: wishlist.id,
            expected: wishlist.version,
            actual: -1,
        };
    }
    infrastructure(err)
}

async fn current_version(
    conn: &mut PgConnection,
    id: Uuid,
) -> Result<Option<i64>, DomainError> {
    sqlx::query_scalar::<_, i64>("SELECT version FROM wishlists WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(infrastructure)
}

async fn write_wishlist(
    conn: &mut PgConnection,
    wishlist: &StoredWishlist,
) -> Result<(), DomainError> {
    if wishlist.version == 0 {
        let inserted = sqlx::query(
            "INSERT INTO wishlists (id, token, owner_id, version, created_at, updated_at) \
             VALUES ($1, $2, $3, 1, $4, $5) ON CONFLICT DO NOTHING",
        )
        .bind(wishlist.id)
        .bind(wishlist.token.as_str())
        .bind(wishlist.owner_id)
        .bind(wishlist.created_at)
        .bind(wishlist.updated_at)
        .execute(&mut *conn)
        .await
        .map_err(|e| write_error(e, wishlist))?;
        if inserted.rows_affected() == 0 {
            return Err(DomainError::ConcurrencyConflict {
                wishlist_id: wishlist.id,
                expected: 0,
                actual: -1,
            });
        }
    } else {
        let updated = sqlx::query(
            "UPDATE wishlists SET owner_id = $3, version = version + 1, updated_at = $4 \
             WHERE id = $1 AND version = $2",
        )
        .bind(wishlist.id)
        .bind(wishlist.version)
        .bind(wishlist.owner_id)
        .bind(wishlist.updated_at)
        .execute(&mut *conn)
        .await
        .map_err(|e| write_error(e, wishlist))?;
        if updated.rows_affected() == 0 {
            let actual = current_version(conn, wishlist.id).await?.unwrap_or(-1);
            return Err(DomainError::ConcurrencyConflict {
                wishlist_id: wishlist.id,
                expected: wishlist.version,
                actual,
            });
        }
        sqlx::query("DELETE FROM wishlist_items WHERE wishlist_id = $1")
            .bind(wishlist.id)
            .execute(&mut *conn)
            .await
            .map_err(infrastructure)?;
    }

    for item in &wishlist.items {
        sqlx::query(
            "INSERT INTO wishlist_items (wishlist_id, product_id, variant_id) VALUES ($1, $2, $3)",
        )
        .bind(wishlist.id)
        .bind(item.product_id)
        .bind(item.variant_id)
        .execute(&mut *conn)
        .await
        .map_err(infrastructure)?;
    }
    Ok(())
}

async fn delete_wishlist(
    conn: &mut PgConnection,
    wishlist: &StoredWishlist,
) -> Result<(), DomainError> {
    let deleted = sqlx::query("DELETE FROM wishlists WHERE id = $1 AND version = $2")
        .bind(wishlist.id)
        .bind(wishlist.version)
        .execute(&mut *conn)
        .await
        .map_err(infrastructure)?;
    if deleted.rows_affected() == 0 {
        return match current_version(conn, wishlist.id).await? {
            Some(actual) => Err(DomainError::ConcurrencyConflict {
                wishlist_id: wishlist.id,
                expected: wishlist.version,
                actual,
            }),
            None => Err(DomainError::WishlistNotFound(format!("id {}", wishlist.id))),
        };
    }
    Ok(())
}

#[async_trait]
impl WishlistRepository for PgWishlistRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<StoredWishlist>, DomainError> {
        self.fetch_where("w.id = $1", id).await
    }

    async fn find_by_token(
        &self,
        token: &WishlistToken,
    ) -> Result<Option<StoredWishlist>, DomainError> {
        self.fetch_where("w.token = $1", token.as_str()).await
    }

    async fn find_by_owner(
        &self,
        customer_id: Uuid,
    ) -> Result<Option<StoredWishlist>, DomainError> {
        self.fetch_where("w.owner_id = $1", customer_id).await
    }

    async fn save(&self, wishlist: &StoredWishlist) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(infrastructure)?;
        write_wishlist(&mut tx, wishlist).await?;
        tx.commit().await.map_err(infrastructure)
    }

    async fn merge(
        &self,
        target: &StoredWishlist,
        discarded: &StoredWishlist,
    ) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(infrastructure)?;
        if let Err(err) = delete_wishlist(&mut tx, discarded).await {
            warn!(discarded_id = %discarded.id, error = %err, "merge aborted");
            return Err(err);
        }
        if let Err(err) = write_wishlist(&mut tx, target).await {
            warn!(target_id = %target.id, error = %err, "merge aborted");
            return Err(err);
        }
        tx.commit().await.map_err(infrastructure)
    }

    async fn delete(&self, wishlist: &StoredWishlist) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(infrastructure)?;
        delete_wishlist(&mut tx, wishlist).await?;
        tx.commit().await.map_err(infrastructure)
    }
}

//! Wishlist repository abstraction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;
use crate::token::WishlistToken;

/// Stored representation of a wishlist line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StoredItem {
    /// Product the item refers to.
    pub product_id: Uuid,
    /// Variant of the product, if the item is variant-specific.
    pub variant_id: Option<Uuid>,
}

/// Stored representation of a wishlist and its items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredWishlist {
    /// Surrogate identifier.
    pub id: Uuid,
    /// Opaque access token.
    pub token: WishlistToken,
    /// Owning customer, `None` for anonymous wishlists.
    pub owner_id: Option<Uuid>,
    /// Items in the wishlist.
    pub items: Vec<StoredItem>,
    /// Version the state was loaded at; `0` for a wishlist never persisted.
    pub version: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last mutation.
    pub updated_at: DateTime<Utc>,
}

/// Repository trait for loading and persisting wishlists.
///
/// Every write is checked against `version`: the write succeeds only if the
/// stored version still equals it, after which the stored version is
/// `version + 1`. A wishlist with version `0` is inserted, and inserting over
/// an existing id, token, or owner is a conflict.
#[async_trait]
pub trait WishlistRepository: Send + Sync {
    /// Find a wishlist by surrogate id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<StoredWishlist>, DomainError>;

    /// Find a wishlist by token.
    async fn find_by_token(
        &self,
        token: &WishlistToken,
    ) -> Result<Option<StoredWishlist>, DomainError>;

    /// Find the wishlist owned by a customer.
    async fn find_by_owner(&self, customer_id: Uuid)
    -> Result<Option<StoredWishlist>, DomainError>;

    /// Insert or update a wishlist with optimistic concurrency.
    async fn save(&self, wishlist: &StoredWishlist) -> Result<(), DomainError>;

    /// Atomically save `target` and delete `discarded`. Either both writes
    /// take effect or neither does.
    async fn merge(
        &self,
        target: &StoredWishlist,
        discarded: &StoredWishlist,
    ) -> Result<(), DomainError>;

    /// Delete a wishlist and its items, checked against its version.
    async fn delete(&self, wishlist: &StoredWishlist) -> Result<(), DomainError>;
}

//! Query handlers for the Wishlist context.
//!
//! This module contains query handlers that load wishlists from the
//! repository and return read-only snapshots.

use chrono::{DateTime, Utc};
use keepsake_core::aggregate::AggregateRoot;
use keepsake_core::error::DomainError;
use keepsake_core::repository::WishlistRepository;
use keepsake_core::token::WishlistToken;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::aggregates::{Wishlist, WishlistItem};

/// One saved entry in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotItem {
    /// The product identifier.
    pub product_id: Uuid,
    /// The variant identifier, `null` for product-level entries.
    pub variant_id: Option<Uuid>,
}

impl From<WishlistItem> for SnapshotItem {
    fn from(item: WishlistItem) -> Self {
        Self {
            product_id: item.product_id,
            variant_id: item.variant_id,
        }
    }
}

/// Read-only view of a wishlist aggregate.
#[derive(Debug, Clone, Serialize)]
pub struct WishlistSnapshot {
    /// The wishlist identifier.
    pub id: Uuid,
    /// The access token.
    pub token: WishlistToken,
    /// The owning customer, `null` when anonymous.
    pub owner_id: Option<Uuid>,
    /// Saved items (sorted for determinism).
    pub items: Vec<SnapshotItem>,
    /// Current persisted version.
    pub version: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last mutation.
    pub updated_at: DateTime<Utc>,
}

impl From<&Wishlist> for WishlistSnapshot {
    fn from(wishlist: &Wishlist) -> Self {
        Self {
            id: wishlist.id,
            token: wishlist.token().clone(),
            owner_id: wishlist.owner_id(),
            items: wishlist
                .sorted_items()
                .into_iter()
                .map(SnapshotItem::from)
                .collect(),
            version: wishlist.version(),
            created_at: wishlist.created_at(),
            updated_at: wishlist.updated_at(),
        }
    }
}

/// Retrieves a wishlist by its token.
///
/// # Errors
///
/// Returns `DomainError::WishlistNotFound` if no wishlist has the token.
pub async fn get_wishlist_by_token(
    token: &WishlistToken,
    repo: &dyn WishlistRepository,
) -> Result<WishlistSnapshot, DomainError> {
    let stored = repo
        .find_by_token(token)
        .await?
        .ok_or_else(|| DomainError::WishlistNotFound(format!("token {token}")))?;
    Ok(WishlistSnapshot::from(&Wishlist::from_stored(stored)))
}

/// Retrieves a wishlist by its surrogate id.
///
/// # Errors
///
/// Returns `DomainError::WishlistNotFound` if no wishlist has the id.
pub async fn get_wishlist_by_id(
    wishlist_id: Uuid,
    repo: &dyn WishlistRepository,
) -> Result<WishlistSnapshot, DomainError> {
    let stored = repo
        .find_by_id(wishlist_id)
        .await?
        .ok_or_else(|| DomainError::WishlistNotFound(format!("id {wishlist_id}")))?;
    Ok(WishlistSnapshot::from(&Wishlist::from_stored(stored)))
}

/// Retrieves the wishlist owned by a customer without creating one.
///
/// # Errors
///
/// Returns `DomainError::WishlistNotFound` if the customer owns no wishlist.
pub async fn get_wishlist_for_customer(
    customer_id: Uuid,
    repo: &dyn WishlistRepository,
) -> Result<WishlistSnapshot, DomainError> {
    let stored = repo
        .find_by_owner(customer_id)
        .await?
        .ok_or_else(|| DomainError::WishlistNotFound(format!("customer {customer_id}")))?;
    Ok(WishlistSnapshot::from(&Wishlist::from_stored(stored)))
}

//! Aggregate roots for the Wishlist context.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use keepsake_core::aggregate::AggregateRoot;
use keepsake_core::clock::Clock;
use keepsake_core::error::DomainError;
use keepsake_core::repository::{StoredItem, StoredWishlist};
use keepsake_core::token::WishlistToken;
use uuid::Uuid;

/// A saved product, or a saved variant of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WishlistItem {
    /// The product identifier.
    pub product_id: Uuid,
    /// The variant identifier, `None` for a product-level entry.
    pub variant_id: Option<Uuid>,
}

impl WishlistItem {
    /// A product-level entry.
    #[must_use]
    pub fn product(product_id: Uuid) -> Self {
        Self {
            product_id,
            variant_id: None,
        }
    }

    /// A variant entry.
    #[must_use]
    pub fn variant(product_id: Uuid, variant_id: Uuid) -> Self {
        Self {
            product_id,
            variant_id: Some(variant_id),
        }
    }
}

impl From<StoredItem> for WishlistItem {
    fn from(item: StoredItem) -> Self {
        Self {
            product_id: item.product_id,
            variant_id: item.variant_id,
        }
    }
}

impl From<WishlistItem> for StoredItem {
    fn from(item: WishlistItem) -> Self {
        Self {
            product_id: item.product_id,
            variant_id: item.variant_id,
        }
    }
}

/// The aggregate root for a wishlist.
#[derive(Debug, Clone)]
pub struct Wishlist {
    /// Aggregate identifier.
    pub id: Uuid,
    token: WishlistToken,
    owner_id: Option<Uuid>,
    items: HashSet<WishlistItem>,
    /// Version the aggregate was loaded at (commit count).
    pub(crate) version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Wishlist {
    /// Creates a new, empty, not yet persisted wishlist.
    #[must_use]
    pub fn new(
        id: Uuid,
        token: WishlistToken,
        owner_id: Option<Uuid>,
        clock: &dyn Clock,
    ) -> Self {
        let now = clock.now();
        Self {
            id,
            token,
            owner_id,
            items: HashSet::new(),
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuilds a wishlist from its stored state.
    #[must_use]
    pub fn from_stored(stored: StoredWishlist) -> Self {
        Self {
            id: stored.id,
            token: stored.token,
            owner_id: stored.owner_id,
            items: stored.items.into_iter().map(WishlistItem::from).collect(),
            version: stored.version,
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        }
    }

    /// Captures the current state for persistence. Items are sorted.
    #[must_use]
    pub fn to_stored(&self) -> StoredWishlist {
        StoredWishlist {
            id: self.id,
            token: self.token.clone(),
            owner_id: self.owner_id,
            items: self.sorted_items().into_iter().map(StoredItem::from).collect(),
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// The access token.
    #[must_use]
    pub fn token(&self) -> &WishlistToken {
        &self.token
    }

    /// The owning customer, `None` when anonymous.
    #[must_use]
    pub fn owner_id(&self) -> Option<Uuid> {
        self.owner_id
    }

    /// Whether no customer owns this wishlist.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.owner_id.is_none()
    }

    /// Items in a stable order.
    #[must_use]
    pub fn sorted_items(&self) -> Vec<WishlistItem> {
        let mut items: Vec<WishlistItem> = self.items.iter().copied().collect();
        items.sort();
        items
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the wishlist holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Timestamp of the last mutation.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Whether the product-level entry is present.
    #[must_use]
    pub fn has_product(&self, product_id: Uuid) -> bool {
        self.items.contains(&WishlistItem::product(product_id))
    }

    /// Whether an entry for the variant is present.
    #[must_use]
    pub fn has_variant(&self, variant_id: Uuid) -> bool {
        self.items
            .iter()
            .any(|item| item.variant_id == Some(variant_id))
    }

    /// Adds the product-level entry. Returns `false` if it was already
    /// present, in which case nothing changes.
    pub fn add_product(&mut self, product_id: Uuid, clock: &dyn Clock) -> bool {
        let inserted = self.items.insert(WishlistItem::product(product_id));
        if inserted {
            self.touch(clock);
        }
        inserted
    }

    /// Adds a variant entry. Returns `false` if the variant was already
    /// present, in which case nothing changes.
    pub fn add_variant(&mut self, product_id: Uuid, variant_id: Uuid, clock: &dyn Clock) -> bool {
        if self.has_variant(variant_id) {
            return false;
        }
        self.items.insert(WishlistItem::variant(product_id, variant_id));
        self.touch(clock);
        true
    }

    /// Removes the product-level entry.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ItemNotFound` if the product is not in the
    /// wishlist.
    pub fn remove_product(
        &mut self,
        product_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        if !self.items.remove(&WishlistItem::product(product_id)) {
            return Err(DomainError::ItemNotFound(format!(
                "product {product_id} not found in wishlist {}",
                self.token
            )));
        }
        self.touch(clock);
        Ok(())
    }

    /// Removes the entry for a variant.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ItemNotFound` if the variant is not in the
    /// wishlist.
    pub fn remove_variant(
        &mut self,
        variant_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        let before = self.items.len();
        self.items.retain(|item| item.variant_id != Some(variant_id));
        if self.items.len() == before {
            return Err(DomainError::ItemNotFound(format!(
                "variant {variant_id} not found in wishlist {}",
                self.token
            )));
        }
        self.touch(clock);
        Ok(())
    }

    /// Copies every item of `other` that is not already present. Returns the
    /// number of items added.
    pub fn absorb(&mut self, other: &Wishlist, clock: &dyn Clock) -> usize {
        let mut added = 0;
        for item in other.sorted_items() {
            let inserted = match item.variant_id {
                Some(variant_id) if self.has_variant(variant_id) => false,
                _ => self.items.insert(item),
            };
            if inserted {
                added += 1;
            }
        }
        if added > 0 {
            self.touch(clock);
        }
        added
    }

    /// Binds an anonymous wishlist to a customer. Returns `false` if the
    /// customer already owns it.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if a different customer owns it.
    pub fn assign_owner(
        &mut self,
        customer_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<bool, DomainError> {
        match self.owner_id {
            Some(owner) if owner == customer_id => Ok(false),
            Some(owner) => Err(DomainError::Validation(format!(
                "wishlist {} is owned by customer {owner}",
                self.token
            ))),
            None => {
                self.owner_id = Some(customer_id);
                self.touch(clock);
                Ok(true)
            }
        }
    }

    fn touch(&mut self, clock: &dyn Clock) {
        self.updated_at = clock.now();
    }
}

impl AggregateRoot for Wishlist {
    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn mark_committed(&mut self) {
        self.version += 1;
    }
}

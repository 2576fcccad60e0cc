//! Command handlers for the Wishlist context.
//!
//! This module contains application-level command handler functions that
//! orchestrate domain logic: validate against the catalog, load the
//! aggregate, apply the mutation, persist it.

use keepsake_core::aggregate::AggregateRoot;
use keepsake_core::catalog::Catalog;
use keepsake_core::clock::Clock;
use keepsake_core::command::Command;
use keepsake_core::error::DomainError;
use keepsake_core::repository::WishlistRepository;
use keepsake_core::token::WishlistToken;
use tracing::debug;
use uuid::Uuid;

use crate::application::query_handlers::WishlistSnapshot;
use crate::domain::aggregates::Wishlist;
use crate::domain::commands::{
    AddProduct, AddVariant, CustomerDeleted, DeleteWishlist, RemoveProduct, RemoveVariant,
};

/// Result of a successfully handled command.
#[derive(Debug)]
pub struct WishlistCommandResult {
    /// The wishlist affected by the command.
    pub wishlist_id: Uuid,
    /// Whether anything was written. Idempotent re-adds report `false`.
    pub changed: bool,
    /// State of the wishlist after the command.
    pub snapshot: WishlistSnapshot,
}

impl WishlistCommandResult {
    pub(crate) fn new(wishlist: &Wishlist, changed: bool) -> Self {
        Self {
            wishlist_id: wishlist.id,
            changed,
            snapshot: WishlistSnapshot::from(wishlist),
        }
    }
}

/// Loads a wishlist by token.
///
/// # Errors
///
/// Returns `DomainError::WishlistNotFound` if no wishlist has the token.
pub(crate) async fn load_by_token(
    token: &WishlistToken,
    repo: &dyn WishlistRepository,
) -> Result<Wishlist, DomainError> {
    repo.find_by_token(token)
        .await?
        .map(Wishlist::from_stored)
        .ok_or_else(|| DomainError::WishlistNotFound(format!("token {token}")))
}

/// Saves the wishlist and advances its version to match the store.
pub(crate) async fn commit(
    wishlist: &mut Wishlist,
    repo: &dyn WishlistRepository,
) -> Result<(), DomainError> {
    repo.save(&wishlist.to_stored()).await?;
    wishlist.mark_committed();
    Ok(())
}

async fn ensure_product_exists(
    catalog: &dyn Catalog,
    product_id: Uuid,
) -> Result<(), DomainError> {
    if catalog.product_exists(product_id).await? {
        Ok(())
    } else {
        Err(DomainError::Validation(format!("product {product_id} does not exist")))
    }
}

async fn ensure_variant_exists(
    catalog: &dyn Catalog,
    variant_id: Uuid,
) -> Result<(), DomainError> {
    if catalog.variant_exists(variant_id).await? {
        Ok(())
    } else {
        Err(DomainError::Validation(format!("variant {variant_id} does not exist")))
    }
}

/// Handles the `AddProduct` command: checks the catalog, adds the product
/// and persists the wishlist if it changed.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the product is not in the catalog,
/// `DomainError::WishlistNotFound` if the token is unknown, and any
/// repository or catalog error unchanged.
pub async fn handle_add_product(
    command: &AddProduct,
    clock: &dyn Clock,
    catalog: &dyn Catalog,
    repo: &dyn WishlistRepository,
) -> Result<WishlistCommandResult, DomainError> {
    ensure_product_exists(catalog, command.product_id).await?;
    let mut wishlist = load_by_token(&command.token, repo).await?;

    let changed = wishlist.add_product(command.product_id, clock);
    if changed {
        commit(&mut wishlist, repo).await?;
    } else {
        debug!(
            command = command.command_type(),
            correlation_id = %command.correlation_id(),
            token = ?command.wishlist_token(),
            product_id = %command.product_id,
            "product already in wishlist"
        );
    }

    Ok(WishlistCommandResult::new(&wishlist, changed))
}

/// Handles the `AddVariant` command: checks the variant exists and belongs
/// to the stated product, adds it and persists the wishlist if it changed.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the product or variant is not in the
/// catalog or the variant belongs to another product,
/// `DomainError::WishlistNotFound` if the token is unknown, and any
/// repository or catalog error unchanged.
pub async fn handle_add_variant(
    command: &AddVariant,
    clock: &dyn Clock,
    catalog: &dyn Catalog,
    repo: &dyn WishlistRepository,
) -> Result<WishlistCommandResult, DomainError> {
    ensure_product_exists(catalog, command.product_id).await?;
    ensure_variant_exists(catalog, command.variant_id).await?;
    if !catalog
        .variant_belongs_to_product(command.variant_id, command.product_id)
        .await?
    {
        return Err(DomainError::Validation(format!(
            "variant {} does not belong to product {}",
            command.variant_id, command.product_id
        )));
    }
    let mut wishlist = load_by_token(&command.token, repo).await?;

    let changed = wishlist.add_variant(command.product_id, command.variant_id, clock);
    if changed {
        commit(&mut wishlist, repo).await?;
    } else {
        debug!(
            command = command.command_type(),
            correlation_id = %command.correlation_id(),
            token = ?command.wishlist_token(),
            variant_id = %command.variant_id,
            "variant already in wishlist"
        );
    }

    Ok(WishlistCommandResult::new(&wishlist, changed))
}

/// Handles the `RemoveProduct` command: checks the catalog, loads the
/// aggregate, removes the product and persists the wishlist.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the product is not in the catalog,
/// `DomainError::ItemNotFound` if the product is not in the wishlist,
/// `DomainError::WishlistNotFound` if the token is unknown.
pub async fn handle_remove_product(
    command: &RemoveProduct,
    clock: &dyn Clock,
    catalog: &dyn Catalog,
    repo: &dyn WishlistRepository,
) -> Result<WishlistCommandResult, DomainError> {
    ensure_product_exists(catalog, command.product_id).await?;
    let mut wishlist = load_by_token(&command.token, repo).await?;

    wishlist.remove_product(command.product_id, clock)?;
    commit(&mut wishlist, repo).await?;

    Ok(WishlistCommandResult::new(&wishlist, true))
}

/// Handles the `RemoveVariant` command: checks the catalog, loads the
/// aggregate, removes the variant and persists the wishlist.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the variant is not in the catalog,
/// `DomainError::ItemNotFound` if the variant is not in the wishlist,
/// `DomainError::WishlistNotFound` if the token is unknown.
pub async fn handle_remove_variant(
    command: &RemoveVariant,
    clock: &dyn Clock,
    catalog: &dyn Catalog,
    repo: &dyn WishlistRepository,
) -> Result<WishlistCommandResult, DomainError> {
    ensure_variant_exists(catalog, command.variant_id).await?;
    let mut wishlist = load_by_token(&command.token, repo).await?;

    wishlist.remove_variant(command.variant_id, clock)?;
    commit(&mut wishlist, repo).await?;

    Ok(WishlistCommandResult::new(&wishlist, true))
}

/// Handles the `DeleteWishlist` command. Returns the deleted wishlist's id.
///
/// # Errors
///
/// Returns `DomainError::WishlistNotFound` if the token is unknown.
pub async fn handle_delete_wishlist(
    command: &DeleteWishlist,
    repo: &dyn WishlistRepository,
) -> Result<Uuid, DomainError> {
    let wishlist = load_by_token(&command.token, repo).await?;
    repo.delete(&wishlist.to_stored()).await?;
    debug!(
        command = command.command_type(),
        correlation_id = %command.correlation_id(),
        token = ?command.wishlist_token(),
        wishlist_id = %wishlist.id,
        "wishlist deleted"
    );
    Ok(wishlist.id)
}

/// Handles the `CustomerDeleted` command: removes the customer's wishlist if
/// there is one. Returns the deleted wishlist's id.
///
/// # Errors
///
/// Returns any repository error unchanged.
pub async fn handle_customer_deleted(
    command: &CustomerDeleted,
    repo: &dyn WishlistRepository,
) -> Result<Option<Uuid>, DomainError> {
    let Some(stored) = repo.find_by_owner(command.customer_id).await? else {
        return Ok(None);
    };
    repo.delete(&stored).await?;
    debug!(
        command = command.command_type(),
        correlation_id = %command.correlation_id(),
        wishlist_id = %stored.id,
        "customer wishlist deleted"
    );
    Ok(Some(stored.id))
}

#[cfg(test)]
mod tests {
    use keepsake_core::error::DomainError;
    use keepsake_core::repository::{StoredItem, StoredWishlist, WishlistRepository};
    use keepsake_core::token::WishlistToken;
    use keepsake_test_support::{
        ConflictingWishlistRepository, FailingCatalog, FailingWishlistRepository, FixedClock,
        InMemoryWishlistRepository, StaticCatalog,
    };
    use uuid::Uuid;

    use crate::application::command_handlers::{
        handle_add_product, handle_add_variant, handle_customer_deleted, handle_delete_wishlist,
        handle_remove_product, handle_remove_variant,
    };
    use crate::domain::commands::{
        AddProduct, AddVariant, CustomerDeleted, DeleteWishlist, RemoveProduct, RemoveVariant,
    };

    fn token(value: &str) -> WishlistToken {
        WishlistToken::parse(value).unwrap()
    }

    fn stored_wishlist(token_value: &str, items: Vec<StoredItem>) -> StoredWishlist {
        let now = FixedClock::test_epoch().0;
        StoredWishlist {
            id: Uuid::new_v4(),
            token: token(token_value),
            owner_id: None,
            items,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    fn product_item(product_id: Uuid) -> StoredItem {
        StoredItem {
            product_id,
            variant_id: None,
        }
    }

    #[tokio::test]
    async fn test_handle_add_product_persists_new_item() {
        // Arrange
        let clock = FixedClock::test_epoch();
        let product_id = Uuid::new_v4();
        let catalog = StaticCatalog::new().with_product(product_id);
        let stored = stored_wishlist("t1", Vec::new());
        let repo = InMemoryWishlistRepository::with_wishlists(vec![stored.clone()]);
        let command = AddProduct {
            correlation_id: Uuid::new_v4(),
            token: token("t1"),
            product_id,
        };

        // Act
        let result = handle_add_product(&command, &clock, &catalog, &repo)
            .await
            .unwrap();

        // Assert
        assert!(result.changed);
        assert_eq!(result.wishlist_id, stored.id);
        assert_eq!(result.snapshot.version, 2);
        assert_eq!(result.snapshot.items.len(), 1);
        assert_eq!(result.snapshot.items[0].product_id, product_id);

        let persisted = repo.find_by_id(stored.id).await.unwrap().unwrap();
        assert_eq!(persisted.version, 2);
        assert_eq!(persisted.items, vec![product_item(product_id)]);
    }

    #[tokio::test]
    async fn test_handle_add_product_twice_writes_once() {
        // Arrange
        let clock = FixedClock::test_epoch();
        let product_id = Uuid::new_v4();
        let catalog = StaticCatalog::new().with_product(product_id);
        let repo =
            InMemoryWishlistRepository::with_wishlists(vec![stored_wishlist("t1", Vec::new())]);
        let command = AddProduct {
            correlation_id: Uuid::new_v4(),
            token: token("t1"),
            product_id,
        };

        // Act
        handle_add_product(&command, &clock, &catalog, &repo)
            .await
            .unwrap();
        let second = handle_add_product(&command, &clock, &catalog, &repo)
            .await
            .unwrap();

        // Assert
        assert!(!second.changed);
        assert_eq!(second.snapshot.items.len(), 1);
        assert_eq!(second.snapshot.version, 2);
        assert_eq!(repo.write_count(), 1);
    }

    #[tokio::test]
    async fn test_handle_add_product_rejects_unknown_product() {
        // Arrange
        let clock = FixedClock::test_epoch();
        let product_id = Uuid::new_v4();
        let repo =
            InMemoryWishlistRepository::with_wishlists(vec![stored_wishlist("t1", Vec::new())]);
        let command = AddProduct {
            correlation_id: Uuid::new_v4(),
            token: token("t1"),
            product_id,
        };

        // Act
        let result = handle_add_product(&command, &clock, &StaticCatalog::new(), &repo).await;

        // Assert
        match result.unwrap_err() {
            DomainError::Validation(msg) => assert!(msg.contains(&product_id.to_string())),
            other => panic!("expected Validation, got {other:?}"),
        }
        assert_eq!(repo.write_count(), 0);
    }

    #[tokio::test]
    async fn test_handle_add_product_returns_not_found_for_unknown_token() {
        // Arrange
        let clock = FixedClock::test_epoch();
        let product_id = Uuid::new_v4();
        let catalog = StaticCatalog::new().with_product(product_id);
        let repo = InMemoryWishlistRepository::new();
        let command = AddProduct {
            correlation_id: Uuid::new_v4(),
            token: token("nope"),
            product_id,
        };

        // Act
        let result = handle_add_product(&command, &clock, &catalog, &repo).await;

        // Assert
        assert!(matches!(result, Err(DomainError::WishlistNotFound(_))));
    }

    #[tokio::test]
    async fn test_handle_add_variant_persists_variant_item() {
        // Arrange
        let clock = FixedClock::test_epoch();
        let product_id = Uuid::new_v4();
        let variant_id = Uuid::new_v4();
        let catalog = StaticCatalog::new().with_variant(product_id, variant_id);
        let repo =
            InMemoryWishlistRepository::with_wishlists(vec![stored_wishlist("t1", Vec::new())]);
        let command = AddVariant {
            correlation_id: Uuid::new_v4(),
            token: token("t1"),
            product_id,
            variant_id,
        };

        // Act
        let result = handle_add_variant(&command, &clock, &catalog, &repo)
            .await
            .unwrap();

        // Assert
        assert!(result.changed);
        assert_eq!(result.snapshot.items.len(), 1);
        assert_eq!(result.snapshot.items[0].variant_id, Some(variant_id));
    }

    #[tokio::test]
    async fn test_handle_add_variant_rejects_mismatched_product() {
        // Arrange
        let clock = FixedClock::test_epoch();
        let product_id = Uuid::new_v4();
        let other_product_id = Uuid::new_v4();
        let variant_id = Uuid::new_v4();
        let catalog = StaticCatalog::new()
            .with_variant(product_id, variant_id)
            .with_product(other_product_id);
        let stored = stored_wishlist("t1", Vec::new());
        let repo = InMemoryWishlistRepository::with_wishlists(vec![stored.clone()]);
        let command = AddVariant {
            correlation_id: Uuid::new_v4(),
            token: token("t1"),
            product_id: other_product_id,
            variant_id,
        };

        // Act
        let result = handle_add_variant(&command, &clock, &catalog, &repo).await;

        // Assert
        match result.unwrap_err() {
            DomainError::Validation(msg) => assert!(msg.contains("does not belong")),
            other => panic!("expected Validation, got {other:?}"),
        }
        let persisted = repo.find_by_id(stored.id).await.unwrap().unwrap();
        assert!(persisted.items.is_empty());
        assert_eq!(repo.write_count(), 0);
    }

    #[tokio::test]
    async fn test_handle_add_variant_rejects_unknown_variant() {
        // Arrange
        let clock = FixedClock::test_epoch();
        let product_id = Uuid::new_v4();
        let catalog = StaticCatalog::new().with_product(product_id);
        let repo =
            InMemoryWishlistRepository::with_wishlists(vec![stored_wishlist("t1", Vec::new())]);
        let command = AddVariant {
            correlation_id: Uuid::new_v4(),
            token: token("t1"),
            product_id,
            variant_id: Uuid::new_v4(),
        };

        // Act
        let result = handle_add_variant(&command, &clock, &catalog, &repo).await;

        // Assert
        match result.unwrap_err() {
            DomainError::Validation(msg) => assert!(msg.contains("does not exist")),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_handle_remove_product_persists_removal() {
        // Arrange
        let clock = FixedClock::test_epoch();
        let product_id = Uuid::new_v4();
        let keep_id = Uuid::new_v4();
        let catalog = StaticCatalog::new()
            .with_product(product_id)
            .with_product(keep_id);
        let stored = stored_wishlist(
            "t1",
            vec![product_item(product_id), product_item(keep_id)],
        );
        let repo = InMemoryWishlistRepository::with_wishlists(vec![stored.clone()]);
        let command = RemoveProduct {
            correlation_id: Uuid::new_v4(),
            token: token("t1"),
            product_id,
        };

        // Act
        let result = handle_remove_product(&command, &clock, &catalog, &repo)
            .await
            .unwrap();

        // Assert
        assert_eq!(result.snapshot.items.len(), 1);
        assert_eq!(result.snapshot.items[0].product_id, keep_id);
        let persisted = repo.find_by_id(stored.id).await.unwrap().unwrap();
        assert_eq!(persisted.items, vec![product_item(keep_id)]);
    }

    #[tokio::test]
    async fn test_handle_remove_product_missing_leaves_wishlist_unchanged() {
        // Arrange
        let clock = FixedClock::test_epoch();
        let present = Uuid::new_v4();
        let missing = Uuid::new_v4();
        let catalog = StaticCatalog::new()
            .with_product(present)
            .with_product(missing);
        let stored = stored_wishlist("t1", vec![product_item(present)]);
        let repo = InMemoryWishlistRepository::with_wishlists(vec![stored.clone()]);
        let command = RemoveProduct {
            correlation_id: Uuid::new_v4(),
            token: token("t1"),
            product_id: missing,
        };

        // Act
        let result = handle_remove_product(&command, &clock, &catalog, &repo).await;

        // Assert
        match result.unwrap_err() {
            DomainError::ItemNotFound(msg) => assert!(msg.contains(&missing.to_string())),
            other => panic!("expected ItemNotFound, got {other:?}"),
        }
        let persisted = repo.find_by_id(stored.id).await.unwrap().unwrap();
        assert_eq!(persisted, stored);
        assert_eq!(repo.write_count(), 0);
    }

    #[tokio::test]
    async fn test_handle_remove_variant_persists_removal() {
        // Arrange
        let clock = FixedClock::test_epoch();
        let product_id = Uuid::new_v4();
        let variant_id = Uuid::new_v4();
        let stored = stored_wishlist(
            "t1",
            vec![StoredItem {
                product_id,
                variant_id: Some(variant_id),
            }],
        );
        let catalog = StaticCatalog::new().with_variant(product_id, variant_id);
        let repo = InMemoryWishlistRepository::with_wishlists(vec![stored]);
        let command = RemoveVariant {
            correlation_id: Uuid::new_v4(),
            token: token("t1"),
            variant_id,
        };

        // Act
        let result = handle_remove_variant(&command, &clock, &catalog, &repo)
            .await
            .unwrap();

        // Assert
        assert!(result.snapshot.items.is_empty());
        assert_eq!(result.snapshot.version, 2);
    }

    #[tokio::test]
    async fn test_handle_remove_variant_surfaces_conflict() {
        // Arrange
        let clock = FixedClock::test_epoch();
        let product_id = Uuid::new_v4();
        let variant_id = Uuid::new_v4();
        let stored = stored_wishlist(
            "t1",
            vec![StoredItem {
                product_id,
                variant_id: Some(variant_id),
            }],
        );
        let catalog = StaticCatalog::new().with_variant(product_id, variant_id);
        let repo = ConflictingWishlistRepository::new(InMemoryWishlistRepository::with_wishlists(
            vec![stored.clone()],
        ));
        let command = RemoveVariant {
            correlation_id: Uuid::new_v4(),
            token: token("t1"),
            variant_id,
        };

        // Act
        let result = handle_remove_variant(&command, &clock, &catalog, &repo).await;

        // Assert
        match result.unwrap_err() {
            DomainError::ConcurrencyConflict { wishlist_id, .. } => {
                assert_eq!(wishlist_id, stored.id);
            }
            other => panic!("expected ConcurrencyConflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_handle_remove_product_rejects_product_unknown_to_catalog() {
        // Arrange
        let clock = FixedClock::test_epoch();
        let product_id = Uuid::new_v4();
        let stored = stored_wishlist("t1", vec![product_item(product_id)]);
        let repo = InMemoryWishlistRepository::with_wishlists(vec![stored.clone()]);
        let command = RemoveProduct {
            correlation_id: Uuid::new_v4(),
            token: token("t1"),
            product_id,
        };

        // Act
        let result = handle_remove_product(&command, &clock, &StaticCatalog::new(), &repo).await;

        // Assert
        match result.unwrap_err() {
            DomainError::Validation(msg) => assert!(msg.contains(&product_id.to_string())),
            other => panic!("expected Validation, got {other:?}"),
        }
        let persisted = repo.find_by_id(stored.id).await.unwrap().unwrap();
        assert_eq!(persisted, stored);
        assert_eq!(repo.write_count(), 0);
    }

    #[tokio::test]
    async fn test_handle_remove_variant_rejects_variant_unknown_to_catalog() {
        // Arrange
        let clock = FixedClock::test_epoch();
        let product_id = Uuid::new_v4();
        let variant_id = Uuid::new_v4();
        let catalog = StaticCatalog::new().with_product(product_id);
        let repo =
            InMemoryWishlistRepository::with_wishlists(vec![stored_wishlist("t1", Vec::new())]);
        let command = RemoveVariant {
            correlation_id: Uuid::new_v4(),
            token: token("t1"),
            variant_id,
        };

        // Act
        let result = handle_remove_variant(&command, &clock, &catalog, &repo).await;

        // Assert
        match result.unwrap_err() {
            DomainError::Validation(msg) => assert!(msg.contains(&variant_id.to_string())),
            other => panic!("expected Validation, got {other:?}"),
        }
        assert_eq!(repo.write_count(), 0);
    }

    #[tokio::test]
    async fn test_catalog_failure_is_surfaced_unchanged() {
        // Arrange
        let clock = FixedClock::test_epoch();
        let repo =
            InMemoryWishlistRepository::with_wishlists(vec![stored_wishlist("t1", Vec::new())]);
        let command = AddProduct {
            correlation_id: Uuid::new_v4(),
            token: token("t1"),
            product_id: Uuid::new_v4(),
        };

        // Act
        let result = handle_add_product(&command, &clock, &FailingCatalog, &repo).await;

        // Assert
        match result.unwrap_err() {
            DomainError::Infrastructure(msg) => assert_eq!(msg, "catalog unavailable"),
            other => panic!("expected Infrastructure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_repository_failure_is_surfaced_unchanged() {
        // Arrange
        let clock = FixedClock::test_epoch();
        let product_id = Uuid::new_v4();
        let catalog = StaticCatalog::new().with_product(product_id);
        let command = RemoveProduct {
            correlation_id: Uuid::new_v4(),
            token: token("t1"),
            product_id,
        };

        // Act
        let result =
            handle_remove_product(&command, &clock, &catalog, &FailingWishlistRepository).await;

        // Assert
        assert!(matches!(result, Err(DomainError::Infrastructure(_))));
    }

    #[tokio::test]
    async fn test_handle_delete_wishlist_makes_token_unreachable() {
        // Arrange
        let stored = stored_wishlist("t1", vec![product_item(Uuid::new_v4())]);
        let repo = InMemoryWishlistRepository::with_wishlists(vec![stored.clone()]);
        let command = DeleteWishlist {
            correlation_id: Uuid::new_v4(),
            token: token("t1"),
        };

        // Act
        let deleted = handle_delete_wishlist(&command, &repo).await.unwrap();

        // Assert
        assert_eq!(deleted, stored.id);
        assert!(repo.find_by_token(&token("t1")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_handle_customer_deleted_removes_owned_wishlist_only() {
        // Arrange
        let customer_id = Uuid::new_v4();
        let mut owned = stored_wishlist("owned", Vec::new());
        owned.owner_id = Some(customer_id);
        let anonymous = stored_wishlist("anon", Vec::new());
        let repo =
            InMemoryWishlistRepository::with_wishlists(vec![owned.clone(), anonymous.clone()]);
        let command = CustomerDeleted {
            correlation_id: Uuid::new_v4(),
            customer_id,
        };

        // Act
        let deleted = handle_customer_deleted(&command, &repo).await.unwrap();
        let again = handle_customer_deleted(&command, &repo).await.unwrap();

        // Assert
        assert_eq!(deleted, Some(owned.id));
        assert_eq!(again, None);
        assert_eq!(repo.all(), vec![anonymous]);
    }
}

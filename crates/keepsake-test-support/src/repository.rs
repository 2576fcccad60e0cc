//! Test repositories: mock `WishlistRepository` implementations for tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use keepsake_core::error::DomainError;
use keepsake_core::repository::{StoredWishlist, WishlistRepository};
use keepsake_core::token::WishlistToken;
use uuid::Uuid;

type Rows = HashMap<Uuid, StoredWishlist>;

/// An in-memory repository with the same optimistic-concurrency rules as the
/// `PostgreSQL` store. Counts every successful write so tests can assert that
/// no-op mutations were not persisted.
#[derive(Debug, Default)]
pub struct InMemoryWishlistRepository {
    rows: Mutex<Rows>,
    writes: AtomicUsize,
}

impl InMemoryWishlistRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository pre-populated with stored wishlists, kept at the
    /// versions they carry.
    #[must_use]
    pub fn with_wishlists(wishlists: Vec<StoredWishlist>) -> Self {
        let rows = wishlists.into_iter().map(|w| (w.id, w)).collect();
        Self {
            rows: Mutex::new(rows),
            writes: AtomicUsize::new(0),
        }
    }

    /// Returns a snapshot of every stored wishlist.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn all(&self) -> Vec<StoredWishlist> {
        self.rows.lock().unwrap().values().cloned().collect()
    }

    /// Number of successful `save`, `merge` and `delete` calls.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn find(&self, predicate: impl Fn(&StoredWishlist) -> bool) -> Option<StoredWishlist> {
        self.rows
            .lock()
            .unwrap()
            .values()
            .find(|w| predicate(w))
            .cloned()
    }
}

fn conflict(wishlist_id: Uuid, expected: i64, actual: i64) -> DomainError {
    DomainError::ConcurrencyConflict {
        wishlist_id,
        expected,
        actual,
    }
}

fn write_row(rows: &mut Rows, wishlist: &StoredWishlist) -> Result<(), DomainError> {
    let clashes = rows.values().any(|other| {
        other.id != wishlist.id
            && (other.token == wishlist.token
                || (wishlist.owner_id.is_some() && other.owner_id == wishlist.owner_id))
    });
    if clashes {
        return Err(conflict(wishlist.id, wishlist.version, -1));
    }
    match rows.get(&wishlist.id) {
        None if wishlist.version == 0 => {}
        None => return Err(conflict(wishlist.id, wishlist.version, -1)),
        Some(current) if current.version != wishlist.version => {
            return Err(conflict(wishlist.id, wishlist.version, current.version));
        }
        Some(_) => {}
    }
    let mut row = wishlist.clone();
    row.version += 1;
    rows.insert(row.id, row);
    Ok(())
}

fn delete_row(rows: &mut Rows, wishlist: &StoredWishlist) -> Result<(), DomainError> {
    match rows.get(&wishlist.id) {
        None => Err(DomainError::WishlistNotFound(format!("id {}", wishlist.id))),
        Some(current) if current.version != wishlist.version => {
            Err(conflict(wishlist.id, wishlist.version, current.version))
        }
        Some(_) => {
            rows.remove(&wishlist.id);
            Ok(())
        }
    }
}

#[async_trait]
impl WishlistRepository for InMemoryWishlistRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<StoredWishlist>, DomainError> {
        Ok(self.find(|w| w.id == id))
    }

    async fn find_by_token(
        &self,
        token: &WishlistToken,
    ) -> Result<Option<StoredWishlist>, DomainError> {
        Ok(self.find(|w| &w.token == token))
    }

    async fn find_by_owner(
        &self,
        customer_id: Uuid,
    ) -> Result<Option<StoredWishlist>, DomainError> {
        Ok(self.find(|w| w.owner_id == Some(customer_id)))
    }

    async fn save(&self, wishlist: &StoredWishlist) -> Result<(), DomainError> {
        write_row(&mut self.rows.lock().unwrap(), wishlist)?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn merge(
        &self,
        target: &StoredWishlist,
        discarded: &StoredWishlist,
    ) -> Result<(), DomainError> {
        let mut rows = self.rows.lock().unwrap();
        let mut staged = rows.clone();
        delete_row(&mut staged, discarded)?;
        write_row(&mut staged, target)?;
        *rows = staged;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete(&self, wishlist: &StoredWishlist) -> Result<(), DomainError> {
        delete_row(&mut self.rows.lock().unwrap(), wishlist)?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A repository that reads from an `InMemoryWishlistRepository` but rejects
/// every write with a concurrency conflict, as if another request had
/// committed first.
#[derive(Debug)]
pub struct ConflictingWishlistRepository {
    inner: InMemoryWishlistRepository,
}

impl ConflictingWishlistRepository {
    /// Wrap a seeded in-memory repository.
    #[must_use]
    pub fn new(inner: InMemoryWishlistRepository) -> Self {
        Self { inner }
    }

    /// The wrapped repository, for asserting that nothing was written.
    #[must_use]
    pub fn inner(&self) -> &InMemoryWishlistRepository {
        &self.inner
    }
}

#[async_trait]
impl WishlistRepository for ConflictingWishlistRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<StoredWishlist>, DomainError> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_token(
        &self,
        token: &WishlistToken,
    ) -> Result<Option<StoredWishlist>, DomainError> {
        self.inner.find_by_token(token).await
    }

    async fn find_by_owner(
        &self,
        customer_id: Uuid,
    ) -> Result<Option<StoredWishlist>, DomainError> {
        self.inner.find_by_owner(customer_id).await
    }

    async fn save(&self, wishlist: &StoredWishlist) -> Result<(), DomainError> {
        Err(conflict(wishlist.id, wishlist.version, wishlist.version + 1))
    }

    async fn merge(
        &self,
        target: &StoredWishlist,
        _discarded: &StoredWishlist,
    ) -> Result<(), DomainError> {
        Err(conflict(target.id, target.version, target.version + 1))
    }

    async fn delete(&self, wishlist: &StoredWishlist) -> Result<(), DomainError> {
        Err(conflict(wishlist.id, wishlist.version, wishlist.version + 1))
    }
}

/// A repository that always returns an infrastructure error. Useful for
/// testing error-handling paths.
#[derive(Debug)]
pub struct FailingWishlistRepository;

#[async_trait]
impl WishlistRepository for FailingWishlistRepository {
    async fn find_by_id(&self, _id: Uuid) -> Result<Option<StoredWishlist>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn find_by_token(
        &self,
        _token: &WishlistToken,
    ) -> Result<Option<StoredWishlist>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn find_by_owner(
        &self,
        _customer_id: Uuid,
    ) -> Result<Option<StoredWishlist>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn save(&self, _wishlist: &StoredWishlist) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn merge(
        &self,
        _target: &StoredWishlist,
        _discarded: &StoredWishlist,
    ) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn delete(&self, _wishlist: &StoredWishlist) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}

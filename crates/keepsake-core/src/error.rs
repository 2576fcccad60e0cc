//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// No wishlist matches the given id, token or owner.
    #[error("wishlist not found: {0}")]
    WishlistNotFound(String),

    /// The wishlist holds no item matching the request.
    #[error("item not found: {0}")]
    ItemNotFound(String),

    /// Optimistic concurrency conflict.
    #[error(
        "concurrency conflict on wishlist {wishlist_id}: \
         expected version {expected}, found {actual}"
    )]
    ConcurrencyConflict {
        /// The wishlist that had the conflict.
        wishlist_id: Uuid,
        /// The expected version.
        expected: i64,
        /// The actual version found (`-1` when the row no longer exists or a
        /// unique key is already taken).
        actual: i64,
    },

    /// A validation error in domain logic.
    #[error("validation error: {0}")]
    Validation(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

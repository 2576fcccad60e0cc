//! Shared application state.

use std::sync::Arc;

use keepsake_core::catalog::Catalog;
use keepsake_core::clock::Clock;
use keepsake_core::repository::WishlistRepository;
use keepsake_core::token::TokenGenerator;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Source of wishlist timestamps.
    pub clock: Arc<dyn Clock>,
    /// Source of fresh wishlist tokens.
    pub tokens: Arc<dyn TokenGenerator>,
    /// Wishlist persistence.
    pub wishlists: Arc<dyn WishlistRepository>,
    /// Product catalog lookups.
    pub catalog: Arc<dyn Catalog>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        tokens: Arc<dyn TokenGenerator>,
        wishlists: Arc<dyn WishlistRepository>,
        catalog: Arc<dyn Catalog>,
    ) -> Self {
        Self {
            clock,
            tokens,
            wishlists,
            catalog,
        }
    }
}

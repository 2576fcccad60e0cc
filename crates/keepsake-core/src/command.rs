//! Command abstractions.

use uuid::Uuid;

use crate::token::WishlistToken;

/// Trait that all wishlist commands implement.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// The type name for this command (for logging/routing).
    fn command_type(&self) -> &'static str;

    /// Correlation ID to trace this command through the system.
    fn correlation_id(&self) -> Uuid;

    /// Token of the wishlist the command addresses, when it targets one by
    /// token.
    fn wishlist_token(&self) -> Option<&WishlistToken>;
}

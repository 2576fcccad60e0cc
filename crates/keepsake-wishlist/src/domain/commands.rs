//! Commands for the Wishlist context.

use keepsake_core::command::Command;
use keepsake_core::token::WishlistToken;
use uuid::Uuid;

/// Who is asking for a wishlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerContext {
    /// An anonymous shopper, optionally presenting a token from an earlier
    /// visit.
    Anonymous {
        /// Token previously handed out, if any.
        token: Option<WishlistToken>,
    },
    /// An authenticated customer.
    Customer {
        /// The customer identifier.
        customer_id: Uuid,
    },
}

/// Command to resolve (and create if needed) the wishlist for an owner.
#[derive(Debug, Clone)]
pub struct ResolveWishlist {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Who the wishlist is for.
    pub owner: OwnerContext,
}

/// Command to add a product to a wishlist.
#[derive(Debug, Clone)]
pub struct AddProduct {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The wishlist token.
    pub token: WishlistToken,
    /// The product identifier.
    pub product_id: Uuid,
}

/// Command to add a product variant to a wishlist.
#[derive(Debug, Clone)]
pub struct AddVariant {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The wishlist token.
    pub token: WishlistToken,
    /// The product the variant is stated to belong to.
    pub product_id: Uuid,
    /// The variant identifier.
    pub variant_id: Uuid,
}

/// Command to remove a product from a wishlist.
#[derive(Debug, Clone)]
pub struct RemoveProduct {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The wishlist token.
    pub token: WishlistToken,
    /// The product identifier.
    pub product_id: Uuid,
}

/// Command to remove a product variant from a wishlist.
#[derive(Debug, Clone)]
pub struct RemoveVariant {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The wishlist token.
    pub token: WishlistToken,
    /// The variant identifier.
    pub variant_id: Uuid,
}

/// Command issued when a shopper holding an anonymous wishlist logs in.
#[derive(Debug, Clone)]
pub struct MergeOnLogin {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The customer who authenticated.
    pub customer_id: Uuid,
    /// Token of the anonymous wishlist held before login.
    pub anonymous_token: WishlistToken,
}

/// Command to delete a wishlist.
#[derive(Debug, Clone)]
pub struct DeleteWishlist {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The wishlist token.
    pub token: WishlistToken,
}

/// Command issued when the host deletes a customer account.
#[derive(Debug, Clone)]
pub struct CustomerDeleted {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The deleted customer.
    pub customer_id: Uuid,
}

macro_rules! impl_command {
    ($ty:ty, $name:literal, |$cmd:ident| $token:expr) => {
        impl Command for $ty {
            fn command_type(&self) -> &'static str {
                $name
            }

            fn correlation_id(&self) -> Uuid {
                self.correlation_id
            }

            fn wishlist_token(&self) -> Option<&WishlistToken> {
                let $cmd = self;
                $token
            }
        }
    };
}

impl_command!(ResolveWishlist, "wishlist.resolve", |cmd| match &cmd.owner {
    OwnerContext::Anonymous { token } => token.as_ref(),
    OwnerContext::Customer { .. } => None,
});
impl_command!(AddProduct, "wishlist.add_product", |cmd| Some(&cmd.token));
impl_command!(AddVariant, "wishlist.add_variant", |cmd| Some(&cmd.token));
impl_command!(RemoveProduct, "wishlist.remove_product", |cmd| Some(&cmd.token));
impl_command!(RemoveVariant, "wishlist.remove_variant", |cmd| Some(&cmd.token));
impl_command!(MergeOnLogin, "wishlist.merge_on_login", |cmd| Some(&cmd.anonymous_token));
impl_command!(DeleteWishlist, "wishlist.delete", |cmd| Some(&cmd.token));
impl_command!(CustomerDeleted, "wishlist.customer_deleted", |_cmd| None);

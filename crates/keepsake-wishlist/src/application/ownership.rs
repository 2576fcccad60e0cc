//! Ownership resolution and merge-on-login.
//!
//! Decides which wishlist a request addresses. An authenticated customer
//! has at most one wishlist; an anonymous shopper reaches theirs through its
//! token. When an anonymous shopper logs in, their wishlist is either
//! claimed by the customer or folded into the customer's existing wishlist.

use keepsake_core::aggregate::AggregateRoot;
use keepsake_core::clock::Clock;
use keepsake_core::command::Command;
use keepsake_core::error::DomainError;
use keepsake_core::repository::WishlistRepository;
use keepsake_core::token::TokenGenerator;
use tracing::{debug, info};
use uuid::Uuid;

use crate::application::command_handlers::{WishlistCommandResult, commit, load_by_token};
use crate::domain::aggregates::Wishlist;
use crate::domain::commands::{MergeOnLogin, OwnerContext, ResolveWishlist};

async fn create_wishlist(
    owner_id: Option<Uuid>,
    clock: &dyn Clock,
    tokens: &dyn TokenGenerator,
    repo: &dyn WishlistRepository,
) -> Result<WishlistCommandResult, DomainError> {
    let mut wishlist = Wishlist::new(Uuid::new_v4(), tokens.generate(), owner_id, clock);
    commit(&mut wishlist, repo).await?;
    Ok(WishlistCommandResult::new(&wishlist, true))
}

/// Handles the `ResolveWishlist` command: returns the owner's wishlist,
/// creating one when none exists. `changed` reports whether one was created.
///
/// A token that is unknown, or that belongs to a customer's wishlist, never
/// grants anonymous access; a fresh anonymous wishlist is created instead.
/// Tokens are only generated server-side, so a client cannot choose a token
/// that collides with another shopper's wishlist.
///
/// # Errors
///
/// Returns `DomainError::ConcurrencyConflict` if a concurrent request
/// created the wishlist first, and any repository error unchanged.
pub async fn handle_resolve_wishlist(
    command: &ResolveWishlist,
    clock: &dyn Clock,
    tokens: &dyn TokenGenerator,
    repo: &dyn WishlistRepository,
) -> Result<WishlistCommandResult, DomainError> {
    match &command.owner {
        OwnerContext::Customer { customer_id } => {
            if let Some(stored) = repo.find_by_owner(*customer_id).await? {
                return Ok(WishlistCommandResult::new(&Wishlist::from_stored(stored), false));
            }
            create_wishlist(Some(*customer_id), clock, tokens, repo).await
        }
        OwnerContext::Anonymous { token: Some(token) } => {
            match repo.find_by_token(token).await? {
                Some(stored) if stored.owner_id.is_none() => Ok(WishlistCommandResult::new(
                    &Wishlist::from_stored(stored),
                    false,
                )),
                _ => {
                    debug!(
                        command = command.command_type(),
                        correlation_id = %command.correlation_id(),
                        %token,
                        "token does not address an anonymous wishlist, creating one"
                    );
                    create_wishlist(None, clock, tokens, repo).await
                }
            }
        }
        OwnerContext::Anonymous { token: None } => create_wishlist(None, clock, tokens, repo).await,
    }
}

/// Handles the `MergeOnLogin` command and returns the customer's wishlist.
///
/// - anonymous wishlist already owned by this customer: returned as is;
/// - customer owns no wishlist: the anonymous one is claimed, keeping its
///   token;
/// - otherwise its items are added to the customer's wishlist and it is
///   discarded, both in one repository `merge`.
///
/// # Errors
///
/// Returns `DomainError::WishlistNotFound` if the token is unknown,
/// `DomainError::Validation` if another customer owns the token's wishlist,
/// and `DomainError::ConcurrencyConflict` if either wishlist changed since
/// it was loaded, in which case nothing was written and the caller may retry
/// the whole command.
pub async fn handle_merge_on_login(
    command: &MergeOnLogin,
    clock: &dyn Clock,
    repo: &dyn WishlistRepository,
) -> Result<WishlistCommandResult, DomainError> {
    let mut anonymous = load_by_token(&command.anonymous_token, repo).await?;
    match anonymous.owner_id() {
        Some(owner) if owner == command.customer_id => {
            return Ok(WishlistCommandResult::new(&anonymous, false));
        }
        Some(_) => {
            return Err(DomainError::Validation(format!(
                "wishlist {} belongs to another customer",
                command.anonymous_token
            )));
        }
        None => {}
    }

    let Some(stored) = repo.find_by_owner(command.customer_id).await? else {
        anonymous.assign_owner(command.customer_id, clock)?;
        commit(&mut anonymous, repo).await?;
        info!(
            correlation_id = %command.correlation_id(),
            customer_id = %command.customer_id,
            wishlist_id = %anonymous.id,
            "anonymous wishlist claimed on login"
        );
        return Ok(WishlistCommandResult::new(&anonymous, true));
    };

    let mut target = Wishlist::from_stored(stored);
    let added = target.absorb(&anonymous, clock);
    repo.merge(&target.to_stored(), &anonymous.to_stored()).await?;
    target.mark_committed();
    info!(
        correlation_id = %command.correlation_id(),
        customer_id = %command.customer_id,
        wishlist_id = %target.id,
        discarded_id = %anonymous.id,
        added,
        "anonymous wishlist merged on login"
    );

    Ok(WishlistCommandResult::new(&target, true))
}

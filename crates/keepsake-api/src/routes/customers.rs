//! Routes keyed by customer rather than wishlist token.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Json, Router, routing::get};
use tracing::{info, instrument};
use uuid::Uuid;

use keepsake_wishlist::application::command_handlers;
use keepsake_wishlist::application::query_handlers::{self, WishlistSnapshot};
use keepsake_wishlist::domain::commands;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /{customer_id}/wishlist
#[instrument(skip(state))]
async fn get_customer_wishlist(
    State(state): State<AppState>,
    Path(customer_id): Path<Uuid>,
) -> Result<Json<WishlistSnapshot>, ApiError> {
    let snapshot =
        query_handlers::get_wishlist_for_customer(customer_id, &*state.wishlists).await?;
    Ok(Json(snapshot))
}

/// DELETE /{customer_id}/wishlist
///
/// Called when the host deletes the customer account. Succeeds whether or
/// not the customer had a wishlist.
#[instrument(skip(state))]
async fn customer_deleted(
    State(state): State<AppState>,
    Path(customer_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let command = commands::CustomerDeleted {
        correlation_id: Uuid::new_v4(),
        customer_id,
    };

    info!(correlation_id = %command.correlation_id, "handling customer_deleted command");

    command_handlers::handle_customer_deleted(&command, &*state.wishlists).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Returns the router for customer-scoped endpoints.
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/{customer_id}/wishlist",
        get(get_customer_wishlist).delete(customer_deleted),
    )
}

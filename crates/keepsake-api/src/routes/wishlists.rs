//! Routes for the Wishlist bounded context.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use keepsake_core::token::WishlistToken;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use keepsake_wishlist::application::command_handlers::{self, WishlistCommandResult};
use keepsake_wishlist::application::ownership;
use keepsake_wishlist::application::query_handlers::{self, WishlistSnapshot};
use keepsake_wishlist::domain::commands;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /.
#[derive(Debug, Default, Deserialize)]
pub struct ResolveWishlistRequest {
    /// Authenticated customer, if any. Takes precedence over `token`.
    #[serde(default)]
    pub customer_id: Option<Uuid>,
    /// Token of an anonymous wishlist the caller already holds.
    #[serde(default)]
    pub token: Option<String>,
}

/// Request body for PATCH /{token}/product.
#[derive(Debug, Deserialize)]
pub struct AddProductRequest {
    /// The product to save.
    pub product_id: Uuid,
}

/// Request body for PATCH /{token}/variant.
#[derive(Debug, Deserialize)]
pub struct AddVariantRequest {
    /// The product the variant belongs to.
    pub product_id: Uuid,
    /// The variant to save.
    pub variant_id: Uuid,
}

/// Request body for POST /merge.
#[derive(Debug, Deserialize)]
pub struct MergeOnLoginRequest {
    /// The customer who just logged in.
    pub customer_id: Uuid,
    /// Token of the anonymous wishlist held before login.
    pub token: String,
}

/// Response body returned after a command is successfully handled.
#[derive(Debug, Serialize)]
pub struct CommandResponse {
    /// The wishlist the command addressed.
    pub wishlist_id: Uuid,
    /// Whether the command changed persisted state.
    pub changed: bool,
    /// The wishlist after the command.
    pub wishlist: WishlistSnapshot,
}

impl From<WishlistCommandResult> for CommandResponse {
    fn from(result: WishlistCommandResult) -> Self {
        Self {
            wishlist_id: result.wishlist_id,
            changed: result.changed,
            wishlist: result.snapshot,
        }
    }
}

/// POST /
///
/// Returns 201 when a wishlist was created, 200 when an existing one was
/// resolved.
#[instrument(skip(state, request), fields(customer_id = ?request.customer_id))]
async fn resolve_wishlist(
    State(state): State<AppState>,
    Json(request): Json<ResolveWishlistRequest>,
) -> Result<(StatusCode, Json<CommandResponse>), ApiError> {
    let owner = match request.customer_id {
        Some(customer_id) => commands::OwnerContext::Customer { customer_id },
        None => commands::OwnerContext::Anonymous {
            token: request.token.map(WishlistToken::parse).transpose()?,
        },
    };
    let command = commands::ResolveWishlist {
        correlation_id: Uuid::new_v4(),
        owner,
    };

    info!(correlation_id = %command.correlation_id, "handling resolve_wishlist command");

    let result = ownership::handle_resolve_wishlist(
        &command,
        state.clock.as_ref(),
        state.tokens.as_ref(),
        &*state.wishlists,
    )
    .await?;

    let status = if result.changed {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(CommandResponse::from(result))))
}

/// GET /{token}
#[instrument(skip(state))]
async fn get_wishlist(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<WishlistSnapshot>, ApiError> {
    let token = WishlistToken::parse(token)?;
    let snapshot = query_handlers::get_wishlist_by_token(&token, &*state.wishlists).await?;
    Ok(Json(snapshot))
}

/// GET /by-id/{wishlist_id}
#[instrument(skip(state))]
async fn get_wishlist_by_id(
    State(state): State<AppState>,
    Path(wishlist_id): Path<Uuid>,
) -> Result<Json<WishlistSnapshot>, ApiError> {
    let snapshot = query_handlers::get_wishlist_by_id(wishlist_id, &*state.wishlists).await?;
    Ok(Json(snapshot))
}

/// DELETE /{token}
#[instrument(skip(state))]
async fn delete_wishlist(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<StatusCode, ApiError> {
    let command = commands::DeleteWishlist {
        correlation_id: Uuid::new_v4(),
        token: WishlistToken::parse(token)?,
    };

    info!(correlation_id = %command.correlation_id, "handling delete_wishlist command");

    command_handlers::handle_delete_wishlist(&command, &*state.wishlists).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /{token}/product
#[instrument(skip(state, request), fields(product_id = %request.product_id))]
async fn add_product(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(request): Json<AddProductRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::AddProduct {
        correlation_id: Uuid::new_v4(),
        token: WishlistToken::parse(token)?,
        product_id: request.product_id,
    };

    info!(correlation_id = %command.correlation_id, "handling add_product command");

    let result = command_handlers::handle_add_product(
        &command,
        state.clock.as_ref(),
        state.catalog.as_ref(),
        &*state.wishlists,
    )
    .await?;

    Ok(Json(CommandResponse::from(result)))
}

/// PATCH /{token}/variant
#[instrument(
    skip(state, request),
    fields(product_id = %request.product_id, variant_id = %request.variant_id)
)]
async fn add_variant(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(request): Json<AddVariantRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::AddVariant {
        correlation_id: Uuid::new_v4(),
        token: WishlistToken::parse(token)?,
        product_id: request.product_id,
        variant_id: request.variant_id,
    };

    info!(correlation_id = %command.correlation_id, "handling add_variant command");

    let result = command_handlers::handle_add_variant(
        &command,
        state.clock.as_ref(),
        state.catalog.as_ref(),
        &*state.wishlists,
    )
    .await?;

    Ok(Json(CommandResponse::from(result)))
}

/// DELETE /{token}/products/{product_id}
#[instrument(skip(state))]
async fn remove_product(
    State(state): State<AppState>,
    Path((token, product_id)): Path<(String, Uuid)>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::RemoveProduct {
        correlation_id: Uuid::new_v4(),
        token: WishlistToken::parse(token)?,
        product_id,
    };

    info!(correlation_id = %command.correlation_id, "handling remove_product command");

    let result = command_handlers::handle_remove_product(
        &command,
        state.clock.as_ref(),
        state.catalog.as_ref(),
        &*state.wishlists,
    )
    .await?;

    Ok(Json(CommandResponse::from(result)))
}

/// DELETE /{token}/variants/{variant_id}
#[instrument(skip(state))]
async fn remove_variant(
    State(state): State<AppState>,
    Path((token, variant_id)): Path<(String, Uuid)>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::RemoveVariant {
        correlation_id: Uuid::new_v4(),
        token: WishlistToken::parse(token)?,
        variant_id,
    };

    info!(correlation_id = %command.correlation_id, "handling remove_variant command");

    let result = command_handlers::handle_remove_variant(
        &command,
        state.clock.as_ref(),
        state.catalog.as_ref(),
        &*state.wishlists,
    )
    .await?;

    Ok(Json(CommandResponse::from(result)))
}

/// POST /merge
#[instrument(skip(state, request), fields(customer_id = %request.customer_id))]
async fn merge_on_login(
    State(state): State<AppState>,
    Json(request): Json<MergeOnLoginRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::MergeOnLogin {
        correlation_id: Uuid::new_v4(),
        customer_id: request.customer_id,
        anonymous_token: WishlistToken::parse(request.token)?,
    };

    info!(correlation_id = %command.correlation_id, "handling merge_on_login command");

    let result =
        ownership::handle_merge_on_login(&command, state.clock.as_ref(), &*state.wishlists)
            .await?;

    Ok(Json(CommandResponse::from(result)))
}

/// Returns the router for the wishlist context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(resolve_wishlist))
        .route("/merge", post(merge_on_login))
        .route("/by-id/{wishlist_id}", get(get_wishlist_by_id))
        .route("/{token}", get(get_wishlist).delete(delete_wishlist))
        .route("/{token}/product", patch(add_product))
        .route("/{token}/variant", patch(add_variant))
        .route(
            "/{token}/products/{product_id}",
            axum::routing::delete(remove_product),
        )
        .route(
            "/{token}/variants/{variant_id}",
            axum::routing::delete(remove_variant),
        )
}

//! Keepsake API: HTTP binding of the wishlist operations.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Builds the full application router.
pub fn app(state: AppState) -> Router {
    // TODO: Replace CorsLayer::permissive() with the storefront origin once it is configurable.
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/wishlists", routes::wishlists::router())
        .nest("/api/v1/customers", routes::customers::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

//! Keepsake API server entry point.

use std::sync::Arc;

use keepsake_api::config::ApiConfig;
use keepsake_api::error::AppError;
use keepsake_api::state::AppState;
use keepsake_core::clock::SystemClock;
use keepsake_core::token::RandomTokenGenerator;
use keepsake_store::MIGRATOR;
use keepsake_store::pg_product_catalog::PgProductCatalog;
use keepsake_store::pg_wishlist_repository::PgWishlistRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Keepsake API server");

    let config = ApiConfig::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;
    MIGRATOR.run(&pool).await?;

    let app_state = AppState::new(
        Arc::new(SystemClock),
        Arc::new(RandomTokenGenerator),
        Arc::new(PgWishlistRepository::new(pool.clone())),
        Arc::new(PgProductCatalog::new(pool)),
    );
    let app = keepsake_api::app(app_state);

    let addr = config.socket_addr();
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}

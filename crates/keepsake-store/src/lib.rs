//! Keepsake Store: `PostgreSQL` adapters for the wishlist service.

pub mod pg_product_catalog;
pub mod pg_wishlist_repository;

/// Embedded schema migrations.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

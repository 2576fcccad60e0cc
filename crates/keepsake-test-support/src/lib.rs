//! Shared test doubles and utilities for the Keepsake wishlist service.

mod catalog;
mod clock;
mod repository;
mod token;

pub use catalog::{FailingCatalog, StaticCatalog};
pub use clock::FixedClock;
pub use repository::{
    ConflictingWishlistRepository, FailingWishlistRepository, InMemoryWishlistRepository,
};
pub use token::SequenceTokenGenerator;

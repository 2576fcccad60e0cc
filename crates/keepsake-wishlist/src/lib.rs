//! Keepsake wishlist bounded context.
//!
//! Responsible for the wishlist aggregate, its membership operations,
//! ownership resolution and merge-on-login.

pub mod application;
pub mod domain;

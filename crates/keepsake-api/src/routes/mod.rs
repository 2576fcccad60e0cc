//! Route modules.

pub mod customers;
pub mod health;
pub mod wishlists;

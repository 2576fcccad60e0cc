//! Keepsake Core: shared domain abstractions.
//!
//! This crate defines the fundamental traits and types that the wishlist
//! context and its adapters depend on. It contains no infrastructure code.

pub mod aggregate;
pub mod catalog;
pub mod clock;
pub mod command;
pub mod error;
pub mod repository;
pub mod token;

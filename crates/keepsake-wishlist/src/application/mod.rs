//! Application layer: command handlers, ownership resolution, queries.

pub mod command_handlers;
pub mod ownership;
pub mod query_handlers;

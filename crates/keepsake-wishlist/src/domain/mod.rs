//! Domain layer: aggregate and commands.

pub mod aggregates;
pub mod commands;

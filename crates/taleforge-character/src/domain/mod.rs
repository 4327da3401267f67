//! Domain layer for the Character context.

pub mod aggregates;
pub mod commands;
pub mod events;
pub mod sheet;
pub mod turn;

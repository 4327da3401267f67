//! Application layer for the Turn context.

pub mod command_handlers;

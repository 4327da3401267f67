//! Domain layer for the Turn context.

pub mod commands;
pub mod mechanics;
pub mod presence;
pub mod response;

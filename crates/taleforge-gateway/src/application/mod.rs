//! Application layer for the Narration Gateway.

pub mod chain;
pub mod setup;

//! Domain layer for the Narration Gateway.

pub mod error;
pub mod provider;
pub mod retry;

//! Domain layer for the Narrative context.

pub mod context;
pub mod directive;
pub mod hints;
pub mod interpreter;
pub mod prompt;
pub mod text;

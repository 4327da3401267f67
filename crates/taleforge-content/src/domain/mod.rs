//! Domain layer for the Content context.

pub mod catalog;
pub mod model;

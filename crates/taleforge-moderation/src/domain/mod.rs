//! Domain layer for the Moderation context.

pub mod guard;
pub mod policy;
pub mod terms;

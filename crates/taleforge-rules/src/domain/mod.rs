//! Domain layer for the Rules context.

pub mod action;
pub mod combat;
pub mod dice;
pub mod encounter;
pub mod mortality;
pub mod progression;
pub mod survival;

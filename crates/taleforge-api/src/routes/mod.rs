//! Route modules organized by bounded context.

pub mod character;
pub mod combat;
pub mod health;
pub mod turn;

//! Taleforge — Character bounded context.
//!
//! Owns the character sheet (stats, health, survival needs, combat state),
//! the immutable turn records, and the per-character event stream that
//! serializes turns for the same character.

pub mod application;
pub mod domain;

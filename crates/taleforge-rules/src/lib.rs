//! Taleforge — Rules & Resolution bounded context.
//!
//! Pure, synchronous game mechanics. Every random draw goes through a
//! `DeterministicRng`, so a scripted RNG reproduces any round exactly.

pub mod domain;

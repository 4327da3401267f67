//! Taleforge — Narrative bounded context.
//!
//! Everything between the resolved mechanics of a turn and the text the
//! player reads: the token-bounded context snapshot, the ground-truth
//! directive, prompt assembly, lenient interpretation of provider replies,
//! and post-processing hints.

pub mod domain;

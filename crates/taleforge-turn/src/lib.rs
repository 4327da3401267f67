//! Taleforge — Turn Orchestration bounded context.
//!
//! One player action in, one resolved turn out: moderation, deterministic
//! mechanics, narration through the provider chain, interpretation and
//! sanitisation, then a single append to the character's event stream.

pub mod application;
pub mod domain;

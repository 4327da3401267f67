//! Taleforge — Moderation bounded context.
//!
//! Player actions are checked against categorised term lists before a turn
//! touches any state; narration coming back from a provider is redacted,
//! never rejected.

pub mod domain;

pub use domain::guard::{ContentGuard, InputVerdict, SanitizedOutput};
pub use domain::policy::{FilterLevel, UnknownFilterLevel, ViolationCategory};

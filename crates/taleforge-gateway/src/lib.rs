//! Taleforge — Narration Gateway.
//!
//! Narration text comes from interchangeable providers tried in a fixed
//! priority order. Each provider returns a typed `Result`; the chain retries
//! rate-limited calls where its policy allows, logs every failover, and ends
//! with a deterministic stub that never fails.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::chain::{Narration, NarrationGateway};
pub use application::setup::{GatewaySettings, build_gateway};
pub use domain::error::{GatewayError, ProviderError};
pub use domain::provider::{NarrationProvider, NarrationRequest, ProviderKind, UnknownProviderKind};
pub use domain::retry::RetryPolicy;
pub use infrastructure::stub::StubProvider;

//! Event stream storage for Taleforge.
//!
//! Both repositories enforce the same optimistic-concurrency contract: an
//! append succeeds only when `expected_version` equals the highest sequence
//! number already stored for the stream.

pub mod in_memory;
pub mod pg_event_repository;
pub mod schema;

pub use in_memory::InMemoryEventRepository;
pub use pg_event_repository::PgEventRepository;

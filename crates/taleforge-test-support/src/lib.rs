//! Shared test doubles for the Taleforge turn engine.

mod clock;
mod provider;
mod repository;
mod rng;

pub use clock::{FixedClock, fixed_clock};
pub use provider::ScriptedProvider;
pub use repository::{
    ConflictingEventRepository, EmptyEventRepository, FailingEventRepository,
    RecordingEventRepository,
};
pub use rng::{MockRng, SequenceRng};

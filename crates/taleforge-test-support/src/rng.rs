//! Deterministic `DeterministicRng` implementations for tests.

use std::collections::VecDeque;

use taleforge_core::rng::DeterministicRng;

/// Always returns `min` for `next_u32_range` and `0.0` for `next_f64`.
///
/// With this RNG every d20 is a natural 1 and every Bernoulli draw succeeds,
/// which makes it handy for "everything triggers, nothing hits" scenarios.
#[derive(Debug)]
pub struct MockRng;

impl DeterministicRng for MockRng {
    fn next_u32_range(&mut self, min: u32, _max: u32) -> u32 {
        min
    }

    fn next_f64(&mut self) -> f64 {
        0.0
    }
}

/// Returns scripted integers and floats in order.
///
/// Integers are returned verbatim regardless of the requested range, so a
/// script of `[20, 5]` reads as "natural 20, then a 5 on the damage die".
/// Floats default to `0.99` once the float script is exhausted, so
/// unscripted encounter and flee draws fail.
#[derive(Debug, Default)]
pub struct SequenceRng {
    values: VecDeque<u32>,
    floats: VecDeque<f64>,
}

impl SequenceRng {
    /// Create a new `SequenceRng` with the given integer values.
    #[must_use]
    pub fn new(values: Vec<u32>) -> Self {
        Self {
            values: values.into(),
            floats: VecDeque::new(),
        }
    }

    /// Adds a script for `next_f64`.
    #[must_use]
    pub fn with_floats(mut self, floats: Vec<f64>) -> Self {
        self.floats = floats.into();
        self
    }

    /// Number of scripted integers not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

impl DeterministicRng for SequenceRng {
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32 {
        self.values
            .pop_front()
            .unwrap_or_else(|| panic!("SequenceRng exhausted (asked for {min}..={max})"))
    }

    fn next_f64(&mut self) -> f64 {
        self.floats.pop_front().unwrap_or(0.99)
    }
}

//! Dice and stat primitives.

use taleforge_core::rng::DeterministicRng;

/// Base armour class before defense.
pub const BASE_ARMOR_CLASS: i32 = 10;

/// Rolls `count` dice with `sides` faces and returns the sum.
pub fn roll(rng: &mut dyn DeterministicRng, count: u32, sides: u32) -> i32 {
    (0..count)
        .map(|_| i32::try_from(rng.next_u32_range(1, sides)).unwrap_or(i32::MAX))
        .fold(0, i32::saturating_add)
}

/// Rolls a single d20 and returns the natural result.
pub fn d20(rng: &mut dyn DeterministicRng) -> i32 {
    roll(rng, 1, 20)
}

/// Ability modifier: `floor((value - 10) / 2)`.
#[must_use]
pub fn modifier(value: i32) -> i32 {
    (value - 10).div_euclid(2)
}

/// Armour class for a defense score: `10 + floor(defense / 2)`.
#[must_use]
pub fn armor_class(defense: i32) -> i32 {
    BASE_ARMOR_CLASS + defense.div_euclid(2)
}

//! Color allocation.
//!
//! One fixed palette serves two jobs: telling players apart (each seated
//! player gets a color nobody else holds) and painting the gradient
//! behind a prompt (two colors far enough apart in the palette to read as
//! distinct poles).

use attune_protocol::{Color, PromptColors};
use rand::Rng;

use crate::settings::MIN_COLOR_INDEX_DIFFERENCE;

/// The fixed palette.
///
/// The resample loop in [`distinct_pair`] relies on any first pick
/// leaving plenty of entries that satisfy the gradient index-distance
/// constraint.
pub const PALETTE: [&str; 35] = [
    "#ff6b6b", "#4ecdc4", "#45b7d1", "#f7b731",
    "#5f27cd", "#00d2d3", "#ff9ff3", "#54a0ff",
    "#48dbfb", "#1dd1a1", "#feca57", "#ff6348",
    "#ff7a18", "#ffb347", "#32ff7e", "#18dcff",
    "#7d5fff", "#c56cf0", "#ff4757", "#ffa502",
    "#70a1ff", "#5352ed", "#2ed573", "#7bed9f",
    "#ff6f91", "#ff9671", "#1e90ff", "#00a8ff",
    "#f368e0", "#ee5253", "#10ac84", "#01a3a4",
    "#ff9f43", "#341f97", "#0abde3",
];

/// A uniformly random palette color.
pub fn random_color(rng: &mut impl Rng) -> Color {
    Color::from(PALETTE[rng.random_range(0..PALETTE.len())])
}

/// A palette color not present in `used`.
///
/// Falls back to any random palette color when every entry is taken.
/// With four players against a 35-color palette that branch never runs.
pub fn available_color(rng: &mut impl Rng, used: &[Color]) -> Color {
    let available: Vec<&str> = PALETTE
        .iter()
        .copied()
        .filter(|hex| !used.iter().any(|color| color.as_str() == *hex))
        .collect();

    if available.is_empty() {
        return random_color(rng);
    }
    Color::from(available[rng.random_range(0..available.len())])
}

/// Two gradient endpoint colors at least [`MIN_COLOR_INDEX_DIFFERENCE`]
/// palette positions apart, resampling the second until the constraint
/// holds.
pub fn distinct_pair(rng: &mut impl Rng) -> PromptColors {
    let first = rng.random_range(0..PALETTE.len());
    let mut second = rng.random_range(0..PALETTE.len());
    while first.abs_diff(second) < MIN_COLOR_INDEX_DIFFERENCE {
        second = rng.random_range(0..PALETTE.len());
    }

    PromptColors {
        color1: Color::from(PALETTE[first]),
        color2: Color::from(PALETTE[second]),
    }
}

// =========================================================================
// Tests
// =========================================================================

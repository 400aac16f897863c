//! Proximity scoring.

/// One scoring tier: a guess within `threshold` degrees of the target
/// earns `points`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBand {
    pub threshold: f64,
    pub points: u32,
}

/// Tiers checked tightest-first; the first band the distance fits wins.
pub const SCORE_BANDS: [ScoreBand; 3] = [
    ScoreBand { threshold: 2.0, points: 4 },
    ScoreBand { threshold: 6.0, points: 3 },
    ScoreBand { threshold: 10.0, points: 2 },
];

/// Points for a guess outside every band.
pub const MISS_POINTS: u32 = 0;

/// Points earned for a guess at `guess_angle` against a target at
/// `target_angle`: 4 within 2°, 3 within 6°, 2 within 10°, otherwise 0.
pub fn score(guess_angle: f64, target_angle: f64) -> u32 {
    let difference = (guess_angle - target_angle).abs();
    for band in &SCORE_BANDS {
        if difference <= band.threshold {
            return band.points;
        }
    }
    MISS_POINTS
}

// =========================================================================
// Tests
// =========================================================================

//! Count-derived accessibility scores and area classification.
//!
//! Every function here is total: negative counts clamp to the zero score and
//! the `rural` label.

use crate::domain::model::{Amenity, AreaType, ScoreResult};

/// Walking-radius count at which the walking score saturates.
pub const WALKING_SCORE_MAX_COUNT: i64 = 40;
/// Driving-radius count at which the driving score saturates.
pub const DRIVING_SCORE_MAX_COUNT: i64 = 150;

pub const URBAN_WALKING_THRESHOLD: i64 = 15;
pub const SUBURBAN_WALKING_THRESHOLD: i64 = 5;

fn capped_score(count: i64, max_count: i64) -> u8 {
    if count <= 0 {
        return 0;
    }
    let raw = count as f64 / max_count as f64 * 100.0;
    // f64::round is half-away-from-zero, i.e. half-up for positive values
    raw.min(100.0).round() as u8
}

/// Walking score (0-100): `min(100, count / 40 * 100)`, rounded.
pub fn walking_score(count: i64) -> u8 {
    capped_score(count, WALKING_SCORE_MAX_COUNT)
}

/// Driving score (0-100): same curve with a cap of 150 amenities.
pub fn driving_score(count: i64) -> u8 {
    capped_score(count, DRIVING_SCORE_MAX_COUNT)
}

/// Density label. Only the walking count matters.
pub fn area_type(walking_count: i64, _driving_count: i64) -> AreaType {
    if walking_count >= URBAN_WALKING_THRESHOLD {
        AreaType::Urban
    } else if walking_count >= SUBURBAN_WALKING_THRESHOLD {
        AreaType::Suburban
    } else {
        AreaType::Rural
    }
}

pub fn compute_scores(walking: &[Amenity], driving: &[Amenity]) -> ScoreResult {
    let walking_count = walking.len() as i64;
    let driving_count = driving.len() as i64;
    ScoreResult {
        walking_score: walking_score(walking_count),
        driving_score: driving_score(driving_count),
        area_type: area_type(walking_count, driving_count),
    }
}

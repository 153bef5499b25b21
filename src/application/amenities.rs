use crate::domain::error::InsightsError;
use crate::domain::model::{AmenitiesResponse, Coordinate};
use crate::state::AppState;

pub const DEFAULT_RADIUS_M: u32 = 500;
pub const MIN_RADIUS_M: i64 = 100;
pub const MAX_RADIUS_M: u32 = 10_000;

/// Radius actually queried: missing or below the minimum falls back to the
/// default, anything above the maximum is clamped down.
pub fn effective_radius(requested: Option<i64>) -> u32 {
    match requested {
        None => DEFAULT_RADIUS_M,
        Some(r) if r < MIN_RADIUS_M => DEFAULT_RADIUS_M,
        Some(r) => r.min(MAX_RADIUS_M as i64) as u32,
    }
}

pub async fn query_amenities(
    state: &AppState,
    lat: f64,
    lon: f64,
    radius: Option<i64>,
) -> Result<AmenitiesResponse, InsightsError> {
    let center = Coordinate::new(lat, lon)?;
    let radius = effective_radius(radius);

    let amenities = state.amenities.fetch_nearby(center, radius as f64).await?;
    Ok(AmenitiesResponse { amenities, radius })
}

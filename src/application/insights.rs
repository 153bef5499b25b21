use crate::domain::error::InsightsError;
use crate::domain::model::{AmenitySet, InsightResult};
use crate::domain::scoring::compute_scores;
use crate::domain::traits::{AmenitySource, Geocoder};
use tracing::warn;

/// Radius of the walking-distance amenity query, in meters.
pub const WALKING_RADIUS_M: f64 = 500.0;
/// Radius of the driving-distance amenity query, in meters.
pub const DRIVING_RADIUS_M: f64 = 5000.0;

/// Geocode `address`, fetch amenities at both radii concurrently and score them.
///
/// Geocoding failures are fatal. Amenity failures are not: the failed side is
/// replaced by an empty set and the first error message is carried in
/// `amenities_error`. The cache is not consulted here.
pub async fn get_insights(
    geocoder: &dyn Geocoder,
    amenities: &dyn AmenitySource,
    address: &str,
) -> Result<InsightResult, InsightsError> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return Err(InsightsError::InvalidInput(
            "Missing or invalid 'address' query parameter".to_string(),
        ));
    }

    let geocode = match geocoder.geocode(trimmed).await {
        Ok(Some(geocode)) => geocode,
        Ok(None) => return Err(InsightsError::NotFound("Address not found".to_string())),
        Err(e @ (InsightsError::Misconfigured(_) | InsightsError::GeocodeUnavailable(_))) => {
            return Err(e)
        }
        Err(e) => return Err(InsightsError::GeocodeUnavailable(e.to_string())),
    };

    let center = geocode.coordinate();
    let (walking, driving) = tokio::join!(
        amenities.fetch_nearby(center, WALKING_RADIUS_M),
        amenities.fetch_nearby(center, DRIVING_RADIUS_M),
    );
    let (walking_amenities, driving_amenities, amenities_error) = settle(walking, driving);

    if let Some(error) = &amenities_error {
        warn!("Amenities unavailable for {:?}: {}", trimmed, error);
    }

    let scores = compute_scores(&walking_amenities, &driving_amenities);

    Ok(InsightResult {
        address: trimmed.to_string(),
        geocode,
        walking_score: scores.walking_score,
        driving_score: scores.driving_score,
        area_type: scores.area_type,
        walking_amenities,
        driving_amenities,
        amenities_error,
    })
}

/// Join the two fetch outcomes. The walking-side error wins when both fail.
fn settle(
    walking: Result<AmenitySet, InsightsError>,
    driving: Result<AmenitySet, InsightsError>,
) -> (AmenitySet, AmenitySet, Option<String>) {
    let mut error: Option<String> = None;

    let walking = walking.unwrap_or_else(|e| {
        error.get_or_insert_with(|| e.to_string());
        Vec::new()
    });
    let driving = driving.unwrap_or_else(|e| {
        error.get_or_insert_with(|| e.to_string());
        Vec::new()
    });

    (walking, driving, error)
}

//! 地址查询流程测试

mod common;

use common::{
    state_with, FakeAmenities, FakeGeocoder, FetchOutcome, GeocodeBehavior, SlowAmenities,
};
use livability::application::amenities::query_amenities;
use livability::application::insights::{get_insights, DRIVING_RADIUS_M, WALKING_RADIUS_M};
use livability::application::query::{query_insights, validate_address};
use livability::application::suggest::suggest;
use livability::domain::error::InsightsError;
use livability::domain::model::{AreaType, ResultSource};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

fn healthy() -> (Arc<FakeGeocoder>, Arc<FakeAmenities>) {
    (
        Arc::new(FakeGeocoder::new(GeocodeBehavior::Found)),
        Arc::new(FakeAmenities::new(
            FetchOutcome::Count(10),
            FetchOutcome::Count(75),
        )),
    )
}

#[tokio::test]
async fn test_full_result() {
    let (geocoder, amenities) = healthy();
    let result = get_insights(geocoder.as_ref(), amenities.as_ref(), "  1 Market St ")
        .await
        .unwrap();

    assert_eq!(result.address, "1 Market St");
    assert_eq!(result.geocode.lat, 37.7749);
    assert_eq!(result.walking_score, 25);
    assert_eq!(result.driving_score, 50);
    assert_eq!(result.area_type, AreaType::Suburban);
    assert_eq!(result.walking_amenities.len(), 10);
    assert_eq!(result.driving_amenities.len(), 75);
    assert!(result.amenities_error.is_none());

    let mut radii = amenities.radii.lock().unwrap().clone();
    radii.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(radii, vec![WALKING_RADIUS_M, DRIVING_RADIUS_M]);
}

#[tokio::test]
async fn test_both_fetches_fail_degrades() {
    let geocoder = FakeGeocoder::new(GeocodeBehavior::Found);
    let amenities = FakeAmenities::new(
        FetchOutcome::Fail("walking timed out"),
        FetchOutcome::Fail("driving timed out"),
    );
    let result = get_insights(&geocoder, &amenities, "1 Market St").await.unwrap();

    assert!(result.is_degraded());
    assert_eq!(result.amenities_error.as_deref(), Some("walking timed out"));
    assert!(result.walking_amenities.is_empty());
    assert!(result.driving_amenities.is_empty());
    assert_eq!(result.walking_score, 0);
    assert_eq!(result.driving_score, 0);
    assert_eq!(result.area_type, AreaType::Rural);
}

#[tokio::test]
async fn test_one_fetch_fails_keeps_the_other() {
    let geocoder = FakeGeocoder::new(GeocodeBehavior::Found);
    let amenities = FakeAmenities::new(
        FetchOutcome::Count(20),
        FetchOutcome::Fail("Overpass API failed: 504 (timeout or overloaded)"),
    );
    let result = get_insights(&geocoder, &amenities, "1 Market St").await.unwrap();

    assert_eq!(
        result.amenities_error.as_deref(),
        Some("Overpass API failed: 504 (timeout or overloaded)")
    );
    assert_eq!(result.walking_amenities.len(), 20);
    assert!(result.driving_amenities.is_empty());
    assert_eq!(result.walking_score, 50);
    assert_eq!(result.driving_score, 0);
    assert_eq!(result.area_type, AreaType::Urban);
}

#[tokio::test(start_paused = true)]
async fn test_walking_and_driving_fetched_concurrently() {
    let geocoder = FakeGeocoder::new(GeocodeBehavior::Found);
    let amenities = SlowAmenities::new(Duration::from_millis(300), 6);

    let start = Instant::now();
    let result = get_insights(&geocoder, &amenities, "1 Market St").await.unwrap();
    let elapsed = start.elapsed();

    assert_eq!(result.walking_amenities.len(), 6);
    assert_eq!(result.driving_amenities.len(), 6);
    // One fetch's worth of waiting, not two
    assert!(elapsed >= Duration::from_millis(300), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(600), "{elapsed:?}");
}

#[tokio::test]
async fn test_geocode_no_match_is_not_found() {
    let geocoder = FakeGeocoder::new(GeocodeBehavior::NoMatch);
    let amenities = FakeAmenities::new(FetchOutcome::Count(1), FetchOutcome::Count(1));
    let err = get_insights(&geocoder, &amenities, "nowhere at all").await.unwrap_err();

    assert!(matches!(err, InsightsError::NotFound(_)));
    assert_eq!(err.status_code(), 404);
    assert!(amenities.radii.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_geocode_errors_map_to_taxonomy() {
    let amenities = FakeAmenities::new(FetchOutcome::Count(1), FetchOutcome::Count(1));

    let err = get_insights(&FakeGeocoder::new(GeocodeBehavior::Unconfigured), &amenities, "x")
        .await
        .unwrap_err();
    assert!(matches!(err, InsightsError::Misconfigured(_)));
    assert_eq!(err.status_code(), 500);

    let err = get_insights(&FakeGeocoder::new(GeocodeBehavior::Unavailable), &amenities, "x")
        .await
        .unwrap_err();
    assert!(matches!(err, InsightsError::GeocodeUnavailable(_)));
    assert_eq!(err.status_code(), 502);

    let err = get_insights(&FakeGeocoder::new(GeocodeBehavior::Broken), &amenities, "x")
        .await
        .unwrap_err();
    assert!(matches!(err, InsightsError::GeocodeUnavailable(_)));
    assert_eq!(err.status_code(), 502);
}

#[tokio::test]
async fn test_blank_address_rejected_before_geocoding() {
    let (geocoder, amenities) = healthy();
    let err = get_insights(geocoder.as_ref(), amenities.as_ref(), "   ")
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 400);
    assert_eq!(geocoder.geocode_calls(), 0);
}

#[test]
fn test_validate_address() {
    assert_eq!(validate_address("  1 Market St ").unwrap(), "1 Market St");
    assert_eq!(validate_address("").unwrap_err().status_code(), 400);
    assert_eq!(validate_address(&"a".repeat(500)).unwrap().len(), 500);

    let err = validate_address(&"a".repeat(501)).unwrap_err();
    assert_eq!(err.to_string(), "Address too long");
}

#[tokio::test]
async fn test_query_uses_cache_on_second_lookup() {
    let (geocoder, amenities) = healthy();
    let (state, _) = state_with(geocoder.clone(), amenities);

    let (first, source) = query_insights(&state, "1 Market St", false).await.unwrap();
    assert_eq!(source, ResultSource::Online);

    let (second, source) = query_insights(&state, " 1 MARKET ST", false).await.unwrap();
    assert_eq!(source, ResultSource::Cache);
    assert_eq!(first, second);
    assert_eq!(geocoder.geocode_calls(), 1);

    let history = state.history.entries().await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].address, "1 MARKET ST");
}

#[tokio::test]
async fn test_query_nocache_skips_cache() {
    let (geocoder, amenities) = healthy();
    let (state, _) = state_with(geocoder.clone(), amenities);

    query_insights(&state, "1 Market St", true).await.unwrap();
    let (_, source) = query_insights(&state, "1 Market St", true).await.unwrap();

    assert_eq!(source, ResultSource::Online);
    assert_eq!(geocoder.geocode_calls(), 2);
    assert!(state.cache.is_empty().await);
}

#[tokio::test]
async fn test_degraded_result_not_cached() {
    let geocoder = Arc::new(FakeGeocoder::new(GeocodeBehavior::Found));
    let amenities = Arc::new(FakeAmenities::new(
        FetchOutcome::Fail("down"),
        FetchOutcome::Count(3),
    ));
    let (state, _) = state_with(geocoder, amenities);

    let (result, _) = query_insights(&state, "1 Market St", false).await.unwrap();
    assert!(result.is_degraded());
    assert!(state.cache.get("1 Market St").await.is_none());
    assert_eq!(state.history.entries().await.len(), 1);
}

#[tokio::test]
async fn test_failed_query_not_recorded() {
    let geocoder = Arc::new(FakeGeocoder::new(GeocodeBehavior::NoMatch));
    let amenities = Arc::new(FakeAmenities::new(
        FetchOutcome::Count(1),
        FetchOutcome::Count(1),
    ));
    let (state, store) = state_with(geocoder, amenities);

    let err = query_insights(&state, "nowhere", false).await.unwrap_err();
    assert_eq!(err.status_code(), 404);
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_amenities_query() {
    let (geocoder, amenities) = healthy();
    let (state, _) = state_with(geocoder, amenities.clone());

    let response = query_amenities(&state, 37.7749, -122.4194, None).await.unwrap();
    assert_eq!(response.radius, 500);
    assert_eq!(response.amenities.len(), 10);

    let response = query_amenities(&state, 37.7749, -122.4194, Some(20_000))
        .await
        .unwrap();
    assert_eq!(response.radius, 10_000);
    assert_eq!(response.amenities.len(), 75);

    assert_eq!(*amenities.radii.lock().unwrap(), vec![500.0, 10_000.0]);
}

#[tokio::test]
async fn test_amenities_query_rejects_bad_coordinates() {
    let (geocoder, amenities) = healthy();
    let (state, _) = state_with(geocoder, amenities.clone());

    for (lat, lon) in [(91.0, 0.0), (0.0, -180.5), (f64::NAN, 0.0), (0.0, f64::INFINITY)] {
        let err = query_amenities(&state, lat, lon, None).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
    }
    assert!(amenities.radii.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_amenities_query_upstream_failure() {
    let geocoder = Arc::new(FakeGeocoder::new(GeocodeBehavior::Found));
    let amenities = Arc::new(FakeAmenities::new(
        FetchOutcome::Fail("Overpass API failed: 503 (timeout or overloaded)"),
        FetchOutcome::Count(1),
    ));
    let (state, _) = state_with(geocoder, amenities);

    let err = query_amenities(&state, 0.0, 0.0, Some(500)).await.unwrap_err();
    assert_eq!(err.status_code(), 502);
}

#[tokio::test]
async fn test_suggest() {
    let (geocoder, amenities) = healthy();
    let (state, _) = state_with(geocoder.clone(), amenities);

    assert!(suggest(&state, " a ").await.unwrap().is_empty());
    assert_eq!(geocoder.suggest_calls(), 0);

    let list = suggest(&state, "Market").await.unwrap();
    assert_eq!(list.len(), 5);
    assert_eq!(list[0].place_name, "Market 0");

    let err = suggest(&state, &"x".repeat(201)).await.unwrap_err();
    assert_eq!(err.status_code(), 400);
    assert_eq!(geocoder.suggest_calls(), 1);
}

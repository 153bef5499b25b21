//! 测试用的假实现
#![allow(dead_code)]

use async_trait::async_trait;
use livability::domain::error::InsightsError;
use livability::domain::model::{
    Amenity, AmenitySet, AreaType, Coordinate, GeocodeResult, InsightResult, Suggestion,
};
use livability::domain::traits::{
    AmenitySource, Geocoder, HttpReply, KeyValueStore, OverpassTransport,
};
use livability::infrastructure::config::{Config, OverpassConfig};
use livability::infrastructure::storage::memory::MemoryStore;
use livability::state::AppState;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

pub fn amenity(i: usize) -> Amenity {
    Amenity {
        id: format!("node/{}", i),
        name: format!("Place {}", i),
        category: "cafe".to_string(),
        location: Coordinate {
            lat: 37.7749,
            lon: -122.4194,
        },
        distance_meters: (i as u64) * 10,
    }
}

pub fn amenities(n: usize) -> AmenitySet {
    (0..n).map(amenity).collect()
}

pub fn geocode() -> GeocodeResult {
    GeocodeResult {
        lat: 37.7749,
        lon: -122.4194,
        display_name: "1 Market St, San Francisco, California, United States".to_string(),
        address: Some("1 Market St, San Francisco, California, United States".to_string()),
    }
}

pub fn insight(address: &str) -> InsightResult {
    InsightResult {
        address: address.to_string(),
        geocode: geocode(),
        walking_score: 25,
        driving_score: 50,
        area_type: AreaType::Suburban,
        walking_amenities: amenities(3),
        driving_amenities: amenities(5),
        amenities_error: None,
    }
}

// ---- Geocoder ----

pub enum GeocodeBehavior {
    Found,
    NoMatch,
    Unavailable,
    Unconfigured,
    Broken,
}

pub struct FakeGeocoder {
    behavior: GeocodeBehavior,
    pub geocode_calls: AtomicUsize,
    pub suggest_calls: AtomicUsize,
}

impl FakeGeocoder {
    pub fn new(behavior: GeocodeBehavior) -> Self {
        Self {
            behavior,
            geocode_calls: AtomicUsize::new(0),
            suggest_calls: AtomicUsize::new(0),
        }
    }

    pub fn geocode_calls(&self) -> usize {
        self.geocode_calls.load(Ordering::SeqCst)
    }

    pub fn suggest_calls(&self) -> usize {
        self.suggest_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn geocode(&self, _address: &str) -> Result<Option<GeocodeResult>, InsightsError> {
        self.geocode_calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            GeocodeBehavior::Found => Ok(Some(geocode())),
            GeocodeBehavior::NoMatch => Ok(None),
            GeocodeBehavior::Unavailable => Err(InsightsError::GeocodeUnavailable(
                "Mapbox geocoding failed: 503".to_string(),
            )),
            GeocodeBehavior::Unconfigured => Err(InsightsError::Misconfigured(
                "Mapbox token not configured".to_string(),
            )),
            GeocodeBehavior::Broken => Err(InsightsError::Io(std::io::Error::other(
                "connection reset",
            ))),
        }
    }

    async fn suggest(&self, query: &str, limit: usize) -> Result<Vec<Suggestion>, InsightsError> {
        self.suggest_calls.fetch_add(1, Ordering::SeqCst);
        Ok((0..limit)
            .map(|i| Suggestion {
                place_name: format!("{} {}", query, i),
            })
            .collect())
    }
}

// ---- Amenities ----

#[derive(Clone)]
pub enum FetchOutcome {
    Count(usize),
    Fail(&'static str),
}

/// Answers by radius: 500 m is the walking side, anything else the driving side.
pub struct FakeAmenities {
    walking: FetchOutcome,
    driving: FetchOutcome,
    pub radii: Mutex<Vec<f64>>,
}

impl FakeAmenities {
    pub fn new(walking: FetchOutcome, driving: FetchOutcome) -> Self {
        Self {
            walking,
            driving,
            radii: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl AmenitySource for FakeAmenities {
    async fn fetch_nearby(
        &self,
        _center: Coordinate,
        radius_meters: f64,
    ) -> Result<AmenitySet, InsightsError> {
        self.radii.lock().unwrap().push(radius_meters);
        let outcome = if radius_meters == 500.0 {
            self.walking.clone()
        } else {
            self.driving.clone()
        };
        match outcome {
            FetchOutcome::Count(n) => Ok(amenities(n)),
            FetchOutcome::Fail(message) => Err(InsightsError::fetch_failed(Some(504), message)),
        }
    }
}

/// Every fetch takes `delay` before answering with `count` amenities.
pub struct SlowAmenities {
    delay: Duration,
    count: usize,
}

impl SlowAmenities {
    pub fn new(delay: Duration, count: usize) -> Self {
        Self { delay, count }
    }
}

#[async_trait]
impl AmenitySource for SlowAmenities {
    async fn fetch_nearby(
        &self,
        _center: Coordinate,
        _radius_meters: f64,
    ) -> Result<AmenitySet, InsightsError> {
        tokio::time::sleep(self.delay).await;
        Ok(amenities(self.count))
    }
}

// ---- Overpass transport ----

pub enum Step {
    Reply(u16, &'static str),
    Drop,
}

/// Plays back a fixed script of replies and records which endpoint each call hit.
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Step>>,
    pub calls: Mutex<Vec<String>>,
    pub queries: Mutex<Vec<String>>,
    pub call_times: Mutex<Vec<Instant>>,
}

impl ScriptedTransport {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            script: Mutex::new(steps.into()),
            calls: Mutex::new(Vec::new()),
            queries: Mutex::new(Vec::new()),
            call_times: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl OverpassTransport for ScriptedTransport {
    async fn post(&self, endpoint: &str, query: &str) -> Result<HttpReply, InsightsError> {
        self.calls.lock().unwrap().push(endpoint.to_string());
        self.call_times.lock().unwrap().push(Instant::now());
        self.queries.lock().unwrap().push(query.to_string());
        let step = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .expect("transport called more often than scripted");
        match step {
            Step::Reply(status, body) => Ok(HttpReply {
                status,
                body: body.to_string(),
            }),
            Step::Drop => Err(InsightsError::Io(std::io::Error::other(
                "connection reset by peer",
            ))),
        }
    }
}

pub const PRIMARY: &str = "https://primary.example/api/interpreter";
pub const FALLBACK: &str = "https://fallback.example/api/interpreter";

pub fn overpass_config() -> OverpassConfig {
    OverpassConfig {
        endpoints: vec![PRIMARY.to_string(), FALLBACK.to_string()],
        retry_delay_ms: 0,
        ..OverpassConfig::default()
    }
}

// ---- Storage ----

/// Store whose every operation fails.
pub struct FailingStore;

#[async_trait]
impl KeyValueStore for FailingStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, InsightsError> {
        Err(InsightsError::Io(std::io::Error::other("disk gone")))
    }

    async fn put(&self, _key: &str, _value: &str) -> Result<(), InsightsError> {
        Err(InsightsError::Io(std::io::Error::other("quota exceeded")))
    }

    async fn delete(&self, _key: &str) -> Result<(), InsightsError> {
        Err(InsightsError::Io(std::io::Error::other("disk gone")))
    }

    async fn list_keys(&self, _prefix: &str) -> Result<Vec<String>, InsightsError> {
        Err(InsightsError::Io(std::io::Error::other("disk gone")))
    }
}

pub fn state_with(
    geocoder: Arc<FakeGeocoder>,
    amenities: Arc<FakeAmenities>,
) -> (AppState, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::with_services(store.clone(), Config::default(), geocoder, amenities);
    (state, store)
}

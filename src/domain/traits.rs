use crate::domain::error::InsightsError;
use crate::domain::model::{AmenitySet, Coordinate, GeocodeResult, Suggestion};
use async_trait::async_trait;

/// Forward geocoding and autocomplete provider.
///
/// `geocode` returns `Ok(None)` when the provider has no match, so callers can
/// tell "not found" apart from a transport or credential failure.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<Option<GeocodeResult>, InsightsError>;

    async fn suggest(&self, query: &str, limit: usize) -> Result<Vec<Suggestion>, InsightsError>;
}

/// Source of nearby points of interest.
#[async_trait]
pub trait AmenitySource: Send + Sync {
    async fn fetch_nearby(
        &self,
        center: Coordinate,
        radius_meters: f64,
    ) -> Result<AmenitySet, InsightsError>;
}

/// Raw reply from an Overpass endpoint.
#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

/// Wire transport used by the Overpass fetcher.
///
/// An `Err` means the request never produced an HTTP status (connect error,
/// timeout, broken body).
#[async_trait]
pub trait OverpassTransport: Send + Sync {
    async fn post(&self, endpoint: &str, query: &str) -> Result<HttpReply, InsightsError>;
}

/// Flat string key-value storage backing the cache and search history.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, InsightsError>;

    async fn put(&self, key: &str, value: &str) -> Result<(), InsightsError>;

    async fn delete(&self, key: &str) -> Result<(), InsightsError>;

    /// All keys starting with `prefix`, in no particular order.
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, InsightsError>;
}

use crate::domain::error::InsightsError;
use crate::domain::traits::{AmenitySource, Geocoder, KeyValueStore};
use crate::infrastructure::config::Config;
use crate::infrastructure::network::http::create_client;
use crate::infrastructure::network::mapbox::MapboxGeocoder;
use crate::infrastructure::network::overpass::OverpassFetcher;
use crate::infrastructure::storage::cache::InsightsCache;
use crate::infrastructure::storage::history::SearchHistory;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn KeyValueStore>,
    pub cache: Arc<InsightsCache>,
    pub history: Arc<SearchHistory>,
    pub geocoder: Arc<dyn Geocoder>,
    pub amenities: Arc<dyn AmenitySource>,
    pub config: Arc<RwLock<Config>>,
}

impl AppState {
    /// Production wiring: Mapbox geocoder and Overpass fetcher over one HTTP client.
    pub fn new(store: Arc<dyn KeyValueStore>, config: Config) -> Result<Self, InsightsError> {
        let http_client = create_client(config.overpass.timeout_secs)?;
        let geocoder = Arc::new(MapboxGeocoder::new(
            http_client.clone(),
            config.mapbox.resolve_token(),
        ));
        let amenities = Arc::new(OverpassFetcher::from_client(http_client, &config.overpass));

        Ok(Self::with_services(store, config, geocoder, amenities))
    }

    pub fn with_services(
        store: Arc<dyn KeyValueStore>,
        config: Config,
        geocoder: Arc<dyn Geocoder>,
        amenities: Arc<dyn AmenitySource>,
    ) -> Self {
        let cache = InsightsCache::new(store.clone(), config.cache.max_entries);
        let history = SearchHistory::new(store.clone(), config.cache.max_history);

        Self {
            store,
            cache: Arc::new(cache),
            history: Arc::new(history),
            geocoder,
            amenities,
            config: Arc::new(RwLock::new(config)),
        }
    }
}

use crate::domain::error::InsightsError;
use crate::domain::geo::distance_meters;
use crate::domain::model::{Amenity, AmenitySet, Coordinate};
use crate::domain::traits::{AmenitySource, HttpReply, OverpassTransport};
use crate::infrastructure::config::OverpassConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Statuses that mean "busy, try again": 503 and 504, plus 429 Too Many Requests,
/// which public Overpass mirrors return under load and which is retried the same way.
pub const TRANSIENT_STATUSES: [u16; 3] = [429, 503, 504];

/// Category used when a feature carries neither an `amenity` nor a `shop` tag.
pub const UNKNOWN_CATEGORY: &str = "unknown";

/// Raw Overpass API response
#[derive(Debug, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<Element>,
}

/// A single point feature from Overpass
#[derive(Debug, Deserialize)]
pub struct Element {
    #[serde(rename = "type", default = "default_element_type")]
    pub type_: String,
    pub id: u64,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub tags: Option<ElementTags>,
}

/// The subset of OSM tags that feed an [`Amenity`]. Other tags are ignored.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ElementTags {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub amenity: Option<String>,
    #[serde(default)]
    pub shop: Option<String>,
}

fn default_element_type() -> String {
    "node".to_string()
}

impl ElementTags {
    /// `amenity`, then `shop`, then [`UNKNOWN_CATEGORY`].
    pub fn category(&self) -> &str {
        self.amenity
            .as_deref()
            .or(self.shop.as_deref())
            .unwrap_or(UNKNOWN_CATEGORY)
    }

    /// `name`, falling back to the category.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or_else(|| self.category())
    }
}

/// Overpass QL for every `amenity` or `shop` node within `radius_m` of `center`.
pub fn build_query(center: Coordinate, radius_m: u32, server_timeout_secs: u64) -> String {
    format!(
        r#"[out:json][timeout:{timeout}];
(
  node(around:{radius},{lat},{lon})["amenity"];
  node(around:{radius},{lat},{lon})["shop"];
);
out body;"#,
        timeout = server_timeout_secs,
        radius = radius_m,
        lat = center.lat,
        lon = center.lon,
    )
}

/// Turn raw elements into amenities, keeping upstream order.
///
/// Elements without a position (never expected for `out body` nodes) are skipped.
pub fn normalize_elements(center: Coordinate, elements: Vec<Element>) -> AmenitySet {
    elements
        .into_iter()
        .filter_map(|el| {
            let (Some(lat), Some(lon)) = (el.lat, el.lon) else {
                debug!("Skipping {}/{} without coordinates", el.type_, el.id);
                return None;
            };
            let location = Coordinate { lat, lon };
            let tags = el.tags.unwrap_or_default();
            Some(Amenity {
                id: format!("{}/{}", el.type_, el.id),
                name: tags.display_name().to_string(),
                category: tags.category().to_string(),
                location,
                distance_meters: distance_meters(center, location).round() as u64,
            })
        })
        .collect()
}

/// reqwest-backed transport. Posts the query as form field `data`.
pub struct ReqwestTransport {
    client: Client,
    timeout: Duration,
}

impl ReqwestTransport {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl OverpassTransport for ReqwestTransport {
    async fn post(&self, endpoint: &str, query: &str) -> Result<HttpReply, InsightsError> {
        // Overpass expects form-encoded POST data: data=<query>
        let response = self
            .client
            .post(endpoint)
            .timeout(self.timeout)
            .form(&[("data", query)])
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpReply { status, body })
    }
}

/// Amenity fetcher with ordered endpoint failover and per-endpoint retries.
pub struct OverpassFetcher<T: OverpassTransport> {
    transport: T,
    endpoints: Vec<String>,
    max_retries: u32,
    retry_delay: Duration,
    query_timeout_secs: u64,
}

impl OverpassFetcher<ReqwestTransport> {
    pub fn from_client(client: Client, config: &OverpassConfig) -> Self {
        let transport = ReqwestTransport::new(client, Duration::from_secs(config.timeout_secs));
        Self::new(transport, config)
    }
}

impl<T: OverpassTransport> OverpassFetcher<T> {
    pub fn new(transport: T, config: &OverpassConfig) -> Self {
        Self {
            transport,
            endpoints: config.endpoints.clone(),
            max_retries: config.max_retries,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            query_timeout_secs: config.query_timeout_secs,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn fetch_impl(
        &self,
        center: Coordinate,
        radius_meters: f64,
    ) -> Result<AmenitySet, InsightsError> {
        let radius = radius_meters.round() as u32;
        let query = build_query(center, radius, self.query_timeout_secs);

        let mut last_error: Option<InsightsError> = None;

        for endpoint in &self.endpoints {
            for attempt in 0..=self.max_retries {
                match self.transport.post(endpoint, &query).await {
                    Ok(reply) if (200..300).contains(&reply.status) => {
                        match serde_json::from_str::<OverpassResponse>(&reply.body) {
                            Ok(parsed) => return Ok(normalize_elements(center, parsed.elements)),
                            Err(e) => {
                                // Truncated bodies are treated like a dropped connection
                                last_error = Some(InsightsError::fetch_failed(
                                    Some(reply.status),
                                    format!("Overpass API returned an unreadable body: {}", e),
                                ));
                            }
                        }
                    }
                    Ok(reply) if TRANSIENT_STATUSES.contains(&reply.status) => {
                        last_error = Some(InsightsError::fetch_failed(
                            Some(reply.status),
                            format!(
                                "Overpass API failed: {} (timeout or overloaded)",
                                reply.status
                            ),
                        ));
                    }
                    Ok(reply) => {
                        warn!(
                            "Overpass endpoint {} rejected the query with status {}",
                            endpoint, reply.status
                        );
                        last_error = Some(InsightsError::fetch_failed(
                            Some(reply.status),
                            format!("Overpass API failed: {}", reply.status),
                        ));
                        break;
                    }
                    Err(e) => {
                        last_error = Some(InsightsError::fetch_failed(
                            None,
                            format!("Overpass API request failed: {}", e),
                        ));
                    }
                }

                if attempt < self.max_retries {
                    debug!(
                        "Overpass attempt {}/{} on {} failed, retrying in {:?}",
                        attempt + 1,
                        self.max_retries + 1,
                        endpoint,
                        self.retry_delay
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
            }
            info!("Overpass endpoint {} exhausted, trying next endpoint", endpoint);
        }

        Err(last_error.unwrap_or_else(|| {
            InsightsError::fetch_failed(None, "Overpass API failed: no endpoints configured")
        }))
    }
}

#[async_trait]
impl<T: OverpassTransport> AmenitySource for OverpassFetcher<T> {
    async fn fetch_nearby(
        &self,
        center: Coordinate,
        radius_meters: f64,
    ) -> Result<AmenitySet, InsightsError> {
        self.fetch_impl(center, radius_meters).await
    }
}

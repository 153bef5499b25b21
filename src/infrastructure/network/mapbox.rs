use crate::domain::error::InsightsError;
use crate::domain::model::{GeocodeResult, Suggestion};
use crate::domain::traits::Geocoder;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

const MAPBOX_GEOCODE_URL: &str = "https://api.mapbox.com/geocoding/v5/mapbox.places";
const FEATURE_TYPES: &str = "address,place,poi";

// Mapbox API Response structures
#[derive(Deserialize, Debug, Default)]
struct MapboxResponse {
    #[serde(default)]
    features: Vec<MapboxFeature>,
}

#[derive(Deserialize, Debug)]
struct MapboxFeature {
    /// `[lon, lat]`
    center: Option<[f64; 2]>,
    place_name: Option<String>,
}

/// Mapbox forward geocoder.
pub struct MapboxGeocoder {
    client: Client,
    access_token: Option<String>,
}

impl MapboxGeocoder {
    pub fn new(client: Client, access_token: Option<String>) -> Self {
        Self {
            client,
            access_token,
        }
    }

    fn token(&self) -> Result<&str, InsightsError> {
        self.access_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| InsightsError::Misconfigured("Mapbox token not configured".to_string()))
    }

    async fn search(
        &self,
        text: &str,
        limit: usize,
        autocomplete: bool,
    ) -> Result<MapboxResponse, InsightsError> {
        let token = self.token()?;
        let url = search_url(text)?;
        let limit = limit.to_string();

        let mut params = vec![
            ("access_token", token),
            ("limit", limit.as_str()),
            ("types", FEATURE_TYPES),
        ];
        if autocomplete {
            params.push(("autocomplete", "true"));
        }

        let response = self
            .client
            .get(url)
            .query(&params)
            .send()
            .await
            .map_err(|e| InsightsError::GeocodeUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(InsightsError::GeocodeUnavailable(format!(
                "Mapbox geocoding failed: {}",
                response.status().as_u16()
            )));
        }

        response
            .json::<MapboxResponse>()
            .await
            .map_err(|e| InsightsError::GeocodeUnavailable(e.to_string()))
    }
}

/// `{base}/{percent-encoded text}.json`
fn search_url(text: &str) -> Result<Url, InsightsError> {
    let mut url = Url::parse(MAPBOX_GEOCODE_URL)
        .map_err(|e| InsightsError::Misconfigured(format!("Invalid Mapbox URL: {}", e)))?;
    url.path_segments_mut()
        .map_err(|_| InsightsError::Misconfigured("Invalid Mapbox URL".to_string()))?
        .push(&format!("{}.json", text));
    Ok(url)
}

fn first_match(response: MapboxResponse) -> Option<GeocodeResult> {
    let feature = response.features.into_iter().next()?;
    let [lon, lat] = feature.center?;
    let display_name = feature
        .place_name
        .clone()
        .unwrap_or_else(|| format!("{}, {}", lat, lon));

    Some(GeocodeResult {
        lat,
        lon,
        display_name,
        address: feature.place_name,
    })
}

fn suggestions(response: MapboxResponse, limit: usize) -> Vec<Suggestion> {
    response
        .features
        .into_iter()
        .filter_map(|f| f.place_name)
        .take(limit)
        .map(|place_name| Suggestion { place_name })
        .collect()
}

#[async_trait]
impl Geocoder for MapboxGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<GeocodeResult>, InsightsError> {
        let trimmed = address.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        let response = self.search(trimmed, 1, false).await?;
        Ok(first_match(response))
    }

    async fn suggest(&self, query: &str, limit: usize) -> Result<Vec<Suggestion>, InsightsError> {
        let trimmed = query.trim();
        if trimmed.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }
        let response = self.search(trimmed, limit, true).await?;
        Ok(suggestions(response, limit))
    }
}

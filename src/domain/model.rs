use crate::domain::error::InsightsError;
use serde::{Deserialize, Serialize};
use std::fmt;

// WGS84 坐标
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    /// Build a coordinate, rejecting NaN and out-of-range values.
    pub fn new(lat: f64, lon: f64) -> Result<Self, InsightsError> {
        let in_range = (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon);
        if !in_range {
            return Err(InsightsError::InvalidInput(
                "Valid 'lat' and 'lon' query parameters required".to_string(),
            ));
        }
        Ok(Self { lat, lon })
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}, {:.5}", self.lat, self.lon)
    }
}

// 附近的兴趣点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Amenity {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub category: String,
    #[serde(flatten)]
    pub location: Coordinate,
    #[serde(rename = "distance")]
    pub distance_meters: u64,
}

/// Amenities exactly as one fetch call returned them (upstream order).
pub type AmenitySet = Vec<Amenity>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeResult {
    pub lat: f64,
    pub lon: f64,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl GeocodeResult {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            lat: self.lat,
            lon: self.lon,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AreaType {
    Urban,
    Suburban,
    Rural,
}

impl fmt::Display for AreaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AreaType::Urban => "urban",
            AreaType::Suburban => "suburban",
            AreaType::Rural => "rural",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    pub walking_score: u8,
    pub driving_score: u8,
    pub area_type: AreaType,
}

// 一次地址查询的完整结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightResult {
    pub address: String,
    pub geocode: GeocodeResult,
    pub walking_score: u8,
    pub driving_score: u8,
    #[serde(rename = "urbanSuburbanIndex")]
    pub area_type: AreaType,
    pub walking_amenities: AmenitySet,
    pub driving_amenities: AmenitySet,
    pub amenities_error: Option<String>,
}

impl InsightResult {
    /// True when the geocode succeeded but at least one amenity fetch did not.
    pub fn is_degraded(&self) -> bool {
        self.amenities_error.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmenitiesResponse {
    pub amenities: AmenitySet,
    pub radius: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub place_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub address: String,
    pub timestamp: i64, // epoch millis
}

// 结果来源
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ResultSource {
    Cache,
    Online,
}

use crate::domain::error::InsightsError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable consulted when `[mapbox] access_token` is unset.
pub const MAPBOX_TOKEN_ENV: &str = "MAPBOX_TOKEN";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_enable_emoji")]
    pub enable_emoji: bool,
    #[serde(default = "default_max_amenities_shown")]
    pub max_amenities_shown: usize,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub mapbox: MapboxConfig,
    #[serde(default)]
    pub overpass: OverpassConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Logging {
    #[serde(default = "default_enable")]
    pub enable: bool,
    pub path: Option<String>,
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MapboxConfig {
    pub access_token: Option<String>,
    #[serde(default = "default_suggest_limit")]
    pub suggest_limit: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OverpassConfig {
    /// Tried in order; the first entry is the primary.
    #[serde(default = "default_endpoints")]
    pub endpoints: Vec<String>,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_query_timeout_secs")]
    pub query_timeout_secs: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_enable")]
    pub enable: bool,
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
    #[serde(default = "default_max_history")]
    pub max_history: usize,
    pub path: Option<String>,
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            enable: true,
            path: None,
            level: default_log_level(),
        }
    }
}

impl Default for MapboxConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            suggest_limit: default_suggest_limit(),
        }
    }
}

impl Default for OverpassConfig {
    fn default() -> Self {
        Self {
            endpoints: default_endpoints(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            timeout_secs: default_timeout_secs(),
            query_timeout_secs: default_query_timeout_secs(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enable: true,
            max_entries: default_max_entries(),
            max_history: default_max_history(),
            path: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enable_emoji: true,
            max_amenities_shown: default_max_amenities_shown(),
            logging: Logging::default(),
            mapbox: MapboxConfig::default(),
            overpass: OverpassConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl MapboxConfig {
    /// Configured token, falling back to `MAPBOX_TOKEN`. Blank values count as missing.
    pub fn resolve_token(&self) -> Option<String> {
        self.access_token
            .clone()
            .or_else(|| std::env::var(MAPBOX_TOKEN_ENV).ok())
            .filter(|t| !t.trim().is_empty())
    }
}

// Defaults
fn default_enable_emoji() -> bool {
    true
}
fn default_max_amenities_shown() -> usize {
    10
}
fn default_enable() -> bool {
    true
}
fn default_log_level() -> String {
    "WARN".to_string()
}
fn default_suggest_limit() -> usize {
    5
}
fn default_endpoints() -> Vec<String> {
    vec![
        "https://overpass-api.de/api/interpreter".to_string(),
        "https://overpass.kumi.systems/api/interpreter".to_string(),
    ]
}
fn default_max_retries() -> u32 {
    2
}
fn default_retry_delay_ms() -> u64 {
    2000
}
fn default_timeout_secs() -> u64 {
    25
}
fn default_query_timeout_secs() -> u64 {
    15
}
fn default_max_entries() -> usize {
    20
}
fn default_max_history() -> usize {
    10
}

pub fn get_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("livability").join("config.toml"))
}

/// Database path: `[cache] path` if set, else `~/.config/livability/livability.db` (Linux)
pub fn get_database_path(config: &Config) -> PathBuf {
    if let Some(path) = config.cache.path.as_deref().filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("livability")
        .join("livability.db")
}

pub fn load_config() -> Result<Config, InsightsError> {
    match get_config_path() {
        Some(path) => load_config_from(&path),
        None => Ok(Config::default()),
    }
}

/// Load a config file, falling back to defaults when it is missing or malformed.
pub fn load_config_from(path: &Path) -> Result<Config, InsightsError> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path)?;
    match toml::from_str::<Config>(&content) {
        Ok(config) => Ok(config),
        Err(e) => {
            eprintln!(
                "Warning: Failed to parse config file: {}. Using defaults.",
                e
            );
            Ok(Config::default())
        }
    }
}

pub fn generate_config_sample() -> Result<(), InsightsError> {
    let Some(path) = get_config_path() else {
        return Err(InsightsError::Misconfigured(
            "Cannot determine config directory".to_string(),
        ));
    };

    if path.exists() {
        eprintln!("Config file already exists at: {}", path.display());
        return Ok(());
    }

    write_config_sample(&path)?;
    println!("Generated config file at: {}", path.display());
    Ok(())
}

pub fn write_config_sample(path: &Path) -> Result<(), InsightsError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let sample = Config::default();
    let toml_content = toml::to_string_pretty(&sample)
        .map_err(|e| InsightsError::Misconfigured(format!("Failed to serialize config: {}", e)))?;
    fs::write(path, toml_content)?;
    Ok(())
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum InsightsError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Misconfigured(String),

    #[error("Geocoding failed: {0}")]
    GeocodeUnavailable(String),

    #[error("{message}")]
    FetchFailed {
        status: Option<u16>,
        message: String,
    },

    #[error("Database error: {0}")]
    Database(#[from] tokio_rusqlite::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl InsightsError {
    /// Status class exposed at the query boundary.
    pub fn status_code(&self) -> u16 {
        match self {
            InsightsError::InvalidInput(_) => 400,
            InsightsError::NotFound(_) => 404,
            InsightsError::GeocodeUnavailable(_) | InsightsError::FetchFailed { .. } => 502,
            _ => 500,
        }
    }

    pub fn fetch_failed(status: Option<u16>, message: impl Into<String>) -> Self {
        InsightsError::FetchFailed {
            status,
            message: message.into(),
        }
    }
}

// HTTP client utilities
use crate::domain::error::InsightsError;
use reqwest::Client;
use std::time::Duration;

pub const USER_AGENT: &str = concat!("livability/", env!("CARGO_PKG_VERSION"));

/// Shared client for the geocoder and the Overpass transport.
///
/// Per-request timeouts are set by the callers, the value here is an upper bound.
pub fn create_client(timeout_secs: u64) -> Result<Client, InsightsError> {
    Ok(Client::builder()
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(30))
        .timeout(Duration::from_secs(timeout_secs.max(1) + 5))
        .user_agent(USER_AGENT)
        .build()?)
}

use crate::application::insights::get_insights;
use crate::domain::error::InsightsError;
use crate::domain::model::{InsightResult, ResultSource};
use crate::state::AppState;
use tracing::debug;

pub const MAX_ADDRESS_LENGTH: usize = 500;

/// Trim and bound-check an address before anything touches the network.
pub fn validate_address(address: &str) -> Result<&str, InsightsError> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return Err(InsightsError::InvalidInput(
            "Missing or invalid 'address' query parameter".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_ADDRESS_LENGTH {
        return Err(InsightsError::InvalidInput("Address too long".to_string()));
    }
    Ok(trimmed)
}

pub async fn query_insights(
    state: &AppState,
    address: &str,
    no_cache: bool,
) -> Result<(InsightResult, ResultSource), InsightsError> {
    let trimmed = validate_address(address)?;
    let use_cache = !no_cache && state.config.read().await.cache.enable;

    // 1. Cache
    if use_cache {
        if let Some(cached) = state.cache.get(trimmed).await {
            debug!("Cache hit for {:?}", trimmed);
            state.history.add(trimmed).await;
            return Ok((cached, ResultSource::Cache));
        }
    }

    // 2. Online lookup
    let result = get_insights(state.geocoder.as_ref(), state.amenities.as_ref(), trimmed).await?;

    // 3. Write back, degraded results are not worth pinning
    if use_cache && !result.is_degraded() {
        state.cache.put(trimmed, &result).await;
    }

    state.history.add(trimmed).await;
    Ok((result, ResultSource::Online))
}

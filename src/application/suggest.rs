use crate::domain::error::InsightsError;
use crate::domain::model::Suggestion;
use crate::state::AppState;

pub const MIN_QUERY_LENGTH: usize = 2;
pub const MAX_QUERY_LENGTH: usize = 200;

/// Autocomplete candidates. Queries shorter than two characters yield nothing.
pub async fn suggest(state: &AppState, query: &str) -> Result<Vec<Suggestion>, InsightsError> {
    let trimmed = query.trim();
    let length = trimmed.chars().count();
    if length < MIN_QUERY_LENGTH {
        return Ok(Vec::new());
    }
    if length > MAX_QUERY_LENGTH {
        return Err(InsightsError::InvalidInput("Query too long".to_string()));
    }

    let limit = state.config.read().await.mapbox.suggest_limit;
    state.geocoder.suggest(trimmed, limit).await
}

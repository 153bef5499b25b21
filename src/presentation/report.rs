use crate::domain::error::InsightsError;
use crate::domain::model::{
    Amenity, AmenitiesResponse, AreaType, HistoryEntry, InsightResult, ResultSource, Suggestion,
};
use colored::Colorize;
use std::fmt::Write;

/// Rendering switches taken from the config.
#[derive(Debug, Clone, Copy)]
pub struct ReportStyle {
    pub enable_emoji: bool,
    pub max_amenities: usize,
}

fn score_bar(score: u8) -> String {
    let score = score.min(100);
    let filled = (score as usize + 5) / 10;
    let bar = format!("{}{}", "█".repeat(filled), "░".repeat(10 - filled));
    match score {
        70..=100 => bar.green().to_string(),
        40..=69 => bar.yellow().to_string(),
        _ => bar.red().to_string(),
    }
}

fn area_label(area: AreaType) -> String {
    let label = area.to_string();
    match area {
        AreaType::Urban => label.blue().bold().to_string(),
        AreaType::Suburban => label.yellow().bold().to_string(),
        AreaType::Rural => label.green().bold().to_string(),
    }
}

/// Nearest first. The stored set keeps upstream order, only the view is sorted.
fn nearest(amenities: &[Amenity], limit: usize) -> Vec<&Amenity> {
    let mut sorted: Vec<&Amenity> = amenities.iter().collect();
    sorted.sort_by_key(|a| a.distance_meters);
    sorted.truncate(limit);
    sorted
}

fn write_amenity_list(output: &mut String, title: &str, amenities: &[Amenity], limit: usize) {
    writeln!(
        output,
        "  {} {}",
        title.cyan(),
        format!("({})", amenities.len()).bright_black()
    )
    .ok();
    if amenities.is_empty() {
        writeln!(output, "    {}", "none found".bright_black()).ok();
        return;
    }
    for amenity in nearest(amenities, limit) {
        writeln!(
            output,
            "    {:>6} m  {}  {}",
            amenity.distance_meters,
            amenity.name,
            format!("[{}]", amenity.category).bright_black()
        )
        .ok();
    }
    if amenities.len() > limit {
        writeln!(
            output,
            "    {}",
            format!("… and {} more", amenities.len() - limit).bright_black()
        )
        .ok();
    }
}

pub fn format_insights(result: &InsightResult, source: ResultSource, style: ReportStyle) -> String {
    let mut output = String::new();

    let source_indicator = match (source, style.enable_emoji) {
        (ResultSource::Cache, true) => "💾 [cached]",
        (ResultSource::Cache, false) => "[cached]",
        (ResultSource::Online, true) => "🌐 [online]",
        (ResultSource::Online, false) => "[online]",
    };

    // Degraded results still get the full scorecard, just behind a banner
    if let Some(error) = &result.amenities_error {
        let prefix = if style.enable_emoji { "⚠️ " } else { "!" };
        writeln!(
            output,
            "{} {}",
            prefix.yellow(),
            format!(
                "{} Some nearby amenities could not be loaded. Try again later.",
                error
            )
            .yellow()
        )
        .ok();
        writeln!(output).ok();
    }

    writeln!(
        output,
        "{} {}",
        result.geocode.display_name.bold().underline(),
        source_indicator.cyan()
    )
    .ok();
    writeln!(
        output,
        "  {}",
        result.geocode.coordinate().to_string().bright_black()
    )
    .ok();
    writeln!(output).ok();

    writeln!(
        output,
        "  {:<9} {} {:>3}",
        "Walking",
        score_bar(result.walking_score),
        result.walking_score
    )
    .ok();
    writeln!(
        output,
        "  {:<9} {} {:>3}",
        "Driving",
        score_bar(result.driving_score),
        result.driving_score
    )
    .ok();
    writeln!(output, "  {:<9} {}", "Area", area_label(result.area_type)).ok();
    writeln!(output).ok();

    write_amenity_list(
        &mut output,
        "Within walking distance",
        &result.walking_amenities,
        style.max_amenities,
    );
    writeln!(output).ok();
    write_amenity_list(
        &mut output,
        "Within driving distance",
        &result.driving_amenities,
        style.max_amenities,
    );

    output
}

pub fn format_amenities(response: &AmenitiesResponse, style: ReportStyle) -> String {
    let mut output = String::new();
    let title = format!("Amenities within {} m", response.radius);
    write_amenity_list(&mut output, &title, &response.amenities, style.max_amenities);
    output
}

pub fn format_suggestions(suggestions: &[Suggestion]) -> String {
    let mut output = String::new();
    if suggestions.is_empty() {
        writeln!(output, "{}", "No suggestions".bright_black()).ok();
    }
    for (i, suggestion) in suggestions.iter().enumerate() {
        writeln!(
            output,
            "  {}. {}",
            (i + 1).to_string().bright_white(),
            suggestion.place_name
        )
        .ok();
    }
    output
}

pub fn format_history(entries: &[HistoryEntry]) -> String {
    let mut output = String::new();
    if entries.is_empty() {
        writeln!(output, "{}", "No recent searches".bright_black()).ok();
    }
    for entry in entries {
        let when = chrono::DateTime::from_timestamp_millis(entry.timestamp)
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        writeln!(output, "  {}  {}", when.bright_black(), entry.address).ok();
    }
    output
}

/// One-line error state for hard failures.
pub fn format_error(error: &InsightsError) -> String {
    let class = match error {
        InsightsError::InvalidInput(_) => "invalid input",
        InsightsError::NotFound(_) => "not found",
        InsightsError::Misconfigured(_) => "misconfigured",
        InsightsError::GeocodeUnavailable(_) | InsightsError::FetchFailed { .. } => {
            "upstream unavailable"
        }
        _ => "internal error",
    };
    format!("✘ {} ({}): {}", class, error.status_code(), error)
        .red()
        .to_string()
}

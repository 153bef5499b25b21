// Main entry point
use clap::Parser;
use colored::Colorize;
use livability::application;
use livability::domain::error::InsightsError;
use livability::domain::traits::KeyValueStore;
use livability::infrastructure::config::{self, load_config};
use livability::infrastructure::storage::db::{init_database, SqliteStore};
use livability::interfaces::cli::Cli;
use livability::presentation::report::{self, ReportStyle};
use livability::state::AppState;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Setup graceful shutdown handler
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    // Spawn signal handler task
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("Failed to listen for shutdown signal: {}", e);
        } else {
            eprintln!("\nInterrupted, shutting down...");
            let _ = shutdown_tx.send(());
        }
    });

    let cli = Cli::parse();
    let config = load_config()?;

    // Initialize logging
    if config.logging.enable {
        init_logging(&config.logging)?;
    }

    if cli.generate_config {
        config::generate_config_sample()?;
        return Ok(());
    }

    // Setup database path (from config or default)
    let db_path = config::get_database_path(&config);
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let db_conn = init_database(&db_path).await?;
    let store: Arc<dyn KeyValueStore> = Arc::new(SqliteStore::new(db_conn));
    let style = ReportStyle {
        enable_emoji: config.enable_emoji,
        max_amenities: config.max_amenities_shown,
    };
    let state = AppState::new(store, config)?;

    if cli.status {
        print_status(&state).await;
        return Ok(());
    }
    if cli.clear_cache {
        let removed = state.cache.clear().await?;
        println!("Removed {} cached results", removed);
        return Ok(());
    }
    if cli.clear_history {
        state.history.clear().await?;
        println!("Search history cleared");
        return Ok(());
    }
    if cli.history {
        let entries = state.history.entries().await;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&entries)?);
        } else {
            print!("{}", report::format_history(&entries));
        }
        return Ok(());
    }

    // Network-bound commands can be interrupted
    tokio::select! {
        outcome = run_lookup(&state, &cli, style) => {
            if let Err(e) = outcome {
                eprintln!("{}", report::format_error(&e));
                std::process::exit(1);
            }
        }
        _ = shutdown_rx => {
            eprintln!("Lookup interrupted");
        }
    }

    Ok(())
}

async fn run_lookup(state: &AppState, cli: &Cli, style: ReportStyle) -> Result<(), InsightsError> {
    if cli.amenities {
        let (Some(lat), Some(lon)) = (cli.lat, cli.lon) else {
            return Err(InsightsError::InvalidInput(
                "Valid 'lat' and 'lon' query parameters required".to_string(),
            ));
        };
        let response = application::amenities::query_amenities(state, lat, lon, cli.radius).await?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&response)?);
        } else {
            print!("{}", report::format_amenities(&response, style));
        }
        return Ok(());
    }

    let query = cli.address.join(" ");

    if cli.suggest {
        let suggestions = application::suggest::suggest(state, &query).await?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&suggestions)?);
        } else {
            print!("{}", report::format_suggestions(&suggestions));
        }
        return Ok(());
    }

    let (result, source) = application::query::query_insights(state, &query, cli.nocache).await?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", report::format_insights(&result, source, style));
    }
    Ok(())
}

/// Initialize logging with path and level configuration
fn init_logging(logging: &config::Logging) -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;

    let level = match logging.level.as_str() {
        "DEBUG" => "debug",
        "INFO" => "info",
        "WARN" => "warn",
        "ERROR" => "error",
        _ => "warn",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if let Some(path) = logging.path.as_deref().filter(|p| !p.is_empty()) {
        // Log to file
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(file)
            .with_ansi(false)
            .init();
        return Ok(());
    }

    // Log to stderr (default)
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

async fn print_status(state: &AppState) {
    println!("{}", "livability status".green().bold());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let config = state.config.read().await;
    println!(
        "Database: {}",
        config::get_database_path(&config).display()
    );
    println!(
        "Cache: {} / {} entries{}",
        state.cache.len().await,
        config.cache.max_entries,
        if config.cache.enable { "" } else { " (disabled)" }
    );
    println!("History: {} entries", state.history.entries().await.len());
    println!(
        "Config: {}",
        config::get_config_path()
            .filter(|p| p.exists())
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "Not found (using defaults)".to_string())
    );

    if config.mapbox.resolve_token().is_some() {
        println!("Mapbox token: Configured");
    } else {
        println!("Mapbox token: {}", "Not configured".yellow());
    }
    println!("Overpass endpoints: {}", config.overpass.endpoints.join(", "));
}

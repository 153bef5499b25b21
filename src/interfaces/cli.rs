use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "livability")]
#[command(about = "Walking and driving scores, area type and nearby amenities for an address.")]
#[command(version)]
pub struct Cli {
    /// Don't use cached result
    #[arg(short = 'n', long)]
    pub nocache: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Print address suggestions for the query instead of insights
    #[arg(short = 's', long)]
    pub suggest: bool,

    /// List amenities around --lat/--lon instead of looking up an address
    #[arg(short = 'a', long, requires_all = ["lat", "lon"])]
    pub amenities: bool,

    /// Latitude for --amenities
    #[arg(long, allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude for --amenities
    #[arg(long, allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// Search radius in meters for --amenities (100-10000, default 500)
    #[arg(short = 'r', long, allow_negative_numbers = true)]
    pub radius: Option<i64>,

    /// Show recent searches
    #[arg(long)]
    pub history: bool,

    /// Forget recent searches
    #[arg(long)]
    pub clear_history: bool,

    /// Drop all cached results
    #[arg(long)]
    pub clear_cache: bool,

    /// Generate config sample
    #[arg(long)]
    pub generate_config: bool,

    /// Show status
    #[arg(long)]
    pub status: bool,

    /// Address to look up
    #[arg(num_args = 1..)]
    pub address: Vec<String>,
}

//! Job-Trawl main entry point
//!
//! This is the command-line interface for the Job-Trawl job board crawler.

use clap::Parser;
use job_trawl::config::{load_config_with_hash, Config, ConfigOverrides, RendererKind};
use job_trawl::crawler::{run_crawl, StopHandle};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Job-Trawl: a focused crawler for JavaScript-rendered job boards
///
/// Job-Trawl walks the search results for one keyword and region, extracts a
/// record from every job detail page it reaches, stores new records in
/// SQLite, and exports the records saved during the run to CSV.
#[derive(Parser, Debug)]
#[command(name = "job-trawl")]
#[command(version = "1.0.0")]
#[command(about = "A focused job board crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,

    /// Search keyword (overrides the config file)
    #[arg(long)]
    query: Option<String>,

    /// Region code (overrides the config file)
    #[arg(long)]
    city: Option<String>,

    /// Maximum number of pages to fetch (overrides the config file)
    #[arg(long)]
    max_pages: Option<u32>,

    /// First URL to crawl (overrides the config file)
    #[arg(long)]
    start_url: Option<String>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            start_url: self.start_url.clone(),
            query: self.query.clone(),
            city_code: self.city.clone(),
            max_pages: self.max_pages,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let overrides = cli.overrides();
    if !overrides.is_empty() {
        tracing::debug!("Command-line overrides: {:?}", overrides);
    }
    let (config, config_hash) = match load_config_with_hash(&cli.config, &overrides) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_crawl(&config, &config_hash).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("job_trawl=info,warn"),
            1 => EnvFilter::new("job_trawl=debug,info"),
            2 => EnvFilter::new("job_trawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the resolved configuration
fn handle_dry_run(config: &Config) {
    println!("=== Job-Trawl Dry Run ===\n");

    println!("Crawl:");
    println!("  Start URL: {}", config.crawl.start_url);
    println!("  Query: {}", config.crawl.query);
    println!("  City code: {}", config.crawl.city_code);
    println!("  Max pages: {}", config.crawl.max_pages);
    println!("  Listing template: {}", config.crawl.listing_url_template);
    println!("  Detail marker: {}", config.crawl.detail_marker);
    println!("  Politeness delay: {}ms", config.crawl.politeness_delay_ms);

    println!("\nRenderer:");
    match config.renderer.kind {
        RendererKind::Browser => {
            println!("  Kind: browser (headless: {})", config.renderer.headless)
        }
        RendererKind::Http => println!("  Kind: http"),
    }
    println!(
        "  Window: {}x{}",
        config.renderer.window_width, config.renderer.window_height
    );
    println!(
        "  Settle delays: {}ms / {}ms after scroll",
        config.renderer.settle_delay_ms, config.renderer.scroll_settle_delay_ms
    );
    println!("  User agent: {}", config.renderer.user_agent);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!("  Export: {}", config.output.export_path);

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    use job_trawl::output::{load_statistics, print_statistics};
    use job_trawl::storage::open_storage;
    use std::path::Path;

    println!("Database: {}\n", config.output.database_path);

    let storage = open_storage(Path::new(&config.output.database_path))?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, config_hash: &str) -> Result<(), Box<dyn std::error::Error>> {
    let stop = StopHandle::new();
    {
        let stop = stop.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received, stopping after the current page");
                stop.stop();
            }
        });
    }

    match run_crawl(config, config_hash, stop).await {
        Ok(report) => {
            tracing::info!(
                "Crawl completed: {} pages fetched, {} jobs saved",
                report.pages_fetched,
                report.records_saved
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}

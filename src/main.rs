//! Site Cloner main entry point
//!
//! This is the command-line interface for cloning a website to a local copy.

use anyhow::{bail, Context};
use clap::Parser;
use site_cloner::config::{load_config_with_hash, validate, Config};
use site_cloner::url::{derive_subdomain_now, parse_http_url};
use site_cloner::{JobStatus, SiteCloner};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Site Cloner: renders a website into a portable local copy
///
/// The home page and up to a fixed number of same-site subpages are rendered,
/// their stylesheets, scripts and images downloaded, and every document
/// rewritten to reference the local copies.
#[derive(Parser, Debug)]
#[command(name = "site-cloner")]
#[command(version)]
#[command(about = "Clone a website into a local static copy", long_about = None)]
struct Cli {
    /// Absolute http(s) URL of the page to clone
    #[arg(value_name = "URL")]
    url: String,

    /// Path to TOML configuration file (defaults are used otherwise)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Fetch pages over plain HTTP instead of a headless browser
    #[arg(long)]
    no_browser: bool,

    /// Rewrite the clone to relative paths once it completes
    #[arg(long)]
    finalize: bool,

    /// Validate config and URL and show what would be cloned
    #[arg(long, conflicts_with = "finalize")]
    dry_run: bool,

    /// Status polling interval in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 500)]
    poll_ms: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = load(cli.config.as_ref())?;
    if cli.no_browser {
        config.browser.enabled = false;
    }

    if cli.dry_run {
        return handle_dry_run(&config, &cli.url);
    }

    handle_clone(config, &cli).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_cloner=info,warn"),
            1 => EnvFilter::new("site_cloner=debug,info"),
            _ => EnvFilter::new("site_cloner=trace,debug"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn load(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        tracing::debug!("No configuration file given, using defaults");
        return Ok(Config::default());
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);
    Ok(config)
}

/// Handles the --dry-run mode: validates input and shows what would be cloned
fn handle_dry_run(config: &Config, raw_url: &str) -> anyhow::Result<()> {
    validate(config).context("Invalid configuration")?;
    let url = parse_http_url(raw_url).with_context(|| format!("Invalid URL '{}'", raw_url))?;

    println!("=== Site Cloner Dry Run ===\n");

    println!("Target:");
    println!("  URL: {}", url);
    println!("  Subdomain: {}", derive_subdomain_now(raw_url));

    println!("\nLimits:");
    println!("  Max subpages: {}", config.limits.max_subpages);
    println!("  Max stylesheets: {}", config.limits.max_stylesheets);
    println!("  Max scripts: {}", config.limits.max_scripts);
    println!("  Max images: {}", config.limits.max_images);

    println!("\nOutput:");
    println!("  Root: {}", config.output.root.display());
    println!("  Public prefix: {}", config.output.public_prefix);

    println!("\nRendering:");
    println!("  Browser: {}", if config.browser.enabled { "headless" } else { "plain HTTP" });

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the main clone operation
async fn handle_clone(config: Config, cli: &Cli) -> anyhow::Result<()> {
    let cloner = SiteCloner::new(config).context("Failed to initialize cloner")?;

    let accepted = cloner.start_clone(&cli.url).await?;
    tracing::info!(
        "Job {} started, output namespace {} (estimated {})",
        accepted.job_id,
        accepted.subdomain,
        accepted.estimated_time
    );

    let poll = Duration::from_millis(cli.poll_ms.max(1));
    let mut report = cloner.wait_for_settled(&accepted.job_id, poll).await?;

    if report.status == JobStatus::Completed && cli.finalize {
        let finalized = cloner.finalize(&accepted.job_id).await?;
        tracing::info!("{}", finalized.message);
        report = cloner.job_status(&accepted.job_id)?;
    }

    println!("{}", serde_json::to_string_pretty(&report)?);

    if report.status == JobStatus::Failed {
        bail!(
            "Clone failed: {}",
            report.error.as_deref().unwrap_or("unknown error")
        );
    }

    Ok(())
}

//! Linkcrawl main entry point
//!
//! This is the command-line interface for the Linkcrawl link crawler.

use anyhow::Context;
use clap::Parser;
use linkcrawl::config::{load_config, validate, Config};
use linkcrawl::crawler::run_crawl;
use linkcrawl::output::print_statistics;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Linkcrawl: a concurrent link crawler
///
/// Fetches START_URL, follows its links up to the given depth, and prints
/// every unique link it discovers to standard output, one per line.
#[derive(Parser, Debug)]
#[command(name = "linkcrawl")]
#[command(version)]
#[command(about = "A concurrent, depth-bounded link crawler", long_about = None)]
struct Cli {
    /// URL to start crawling from
    #[arg(value_name = "START_URL")]
    start_url: String,

    /// Recursion depth to go to [default: 0]
    #[arg(short = 'd', value_name = "DEPTH")]
    depth: Option<i32>,

    /// Number of concurrent workers [default: 10]
    #[arg(short = 't', value_name = "WORKERS")]
    threads: Option<usize>,

    /// Recursively follow URLs on other domains that are encountered
    #[arg(long)]
    external_domains: bool,

    /// Maximum simultaneous HTTP requests [default: worker count]
    #[arg(long, value_name = "N")]
    max_requests: Option<usize>,

    /// Path to a TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print crawl statistics to stderr when done
    #[arg(long)]
    summary: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output on stderr
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Applies command-line overrides on top of file settings
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(depth) = self.depth {
            config.crawler.max_depth = depth;
        }
        if let Some(threads) = self.threads {
            config.crawler.workers = threads;
        }
        if self.external_domains {
            config.crawler.external_domains = true;
        }
        if let Some(max_requests) = self.max_requests {
            config.crawler.max_concurrent_requests = Some(max_requests);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = resolve_config(&cli)?;

    let stats = run_crawl(&cli.start_url, &config)
        .await
        .with_context(|| format!("crawl of {} failed", cli.start_url))?;

    if cli.summary {
        print_statistics(&stats);
    }

    Ok(())
}

/// Loads the config file if given, applies flags, then validates the result
fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path).with_context(|| format!("failed to load {}", path.display()))?
        }
        None => Config::default(),
    };
    cli.apply_overrides(&mut config);
    validate(&config).context("invalid crawl settings")?;
    Ok(config)
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr; stdout carries only discovered links.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("linkcrawl=warn,warn"),
            1 => EnvFilter::new("linkcrawl=info,warn"),
            2 => EnvFilter::new("linkcrawl=debug,info"),
            _ => EnvFilter::new("trace"),
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

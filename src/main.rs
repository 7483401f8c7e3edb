//! Searx-Harvest main entry point
//!
//! This is the command-line interface for the Searx-Harvest search service.

use anyhow::Context;
use clap::{Parser, Subcommand};
use searx_harvest::config::{load_config_with_hash, validate, Config};
use searx_harvest::{list_mirrors, run_search, server, EnrichedResult, QueryParams};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Searx-Harvest: federated search with full-page context
///
/// Searx-Harvest queries public search portal mirrors until one answers,
/// then renders every result page to attach its extracted text.
#[derive(Parser, Debug)]
#[command(name = "searx-harvest")]
#[command(version)]
#[command(about = "Federated search with full-page context", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP search endpoint
    Serve {
        /// Address to listen on (overrides the config file)
        #[arg(long, value_name = "ADDR")]
        bind: Option<SocketAddr>,
    },

    /// Run a single query and print the results
    Search {
        /// The search terms
        query: String,

        /// Number of results to enrich (1-5)
        #[arg(long)]
        max_results: Option<usize>,

        /// Maximum characters of context per result (100-5000)
        #[arg(long)]
        max_content: Option<usize>,

        /// Navigation timeout in milliseconds
        #[arg(long, value_name = "MS")]
        timeout_ms: Option<u64>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the mirrors a search would try, in order
    Mirrors,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load(cli.config.as_ref())?;

    match cli.command {
        Command::Serve { bind } => handle_serve(config, bind).await,
        Command::Search {
            query,
            max_results,
            max_content,
            timeout_ms,
            json,
        } => {
            let params = QueryParams::new(
                query,
                max_results.unwrap_or(config.search.default_max_results),
                max_content.unwrap_or(config.search.default_max_content),
            )
            .with_timeout(Duration::from_millis(
                timeout_ms.unwrap_or(config.search.timeout_ms),
            ));
            handle_search(&config, &params, json).await
        }
        Command::Mirrors => handle_mirrors(&config).await,
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("searx_harvest=info,warn"),
            1 => EnvFilter::new("searx_harvest=debug,info"),
            2 => EnvFilter::new("searx_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the configuration file, or validated defaults when none is given
fn load(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        tracing::info!("No configuration file given, using defaults");
        let config = Config::default();
        validate(&config)?;
        return Ok(config);
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    Ok(config)
}

/// Handles `serve`: runs the HTTP endpoint until interrupted
async fn handle_serve(config: Config, bind: Option<SocketAddr>) -> anyhow::Result<()> {
    let addr = match bind {
        Some(addr) => addr,
        None => config
            .server
            .bind
            .parse()
            .with_context(|| format!("Invalid bind address: {}", config.server.bind))?,
    };

    server::serve(config, addr)
        .await
        .with_context(|| format!("Server on {} failed", addr))
}

/// Handles `search`: runs one query and prints the enriched results
async fn handle_search(config: &Config, params: &QueryParams, json: bool) -> anyhow::Result<()> {
    params.validate()?;

    let results = run_search(params, config).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else if results.is_empty() {
        println!("No results found.");
    } else {
        print_results(&results);
    }

    Ok(())
}

fn print_results(results: &[EnrichedResult]) {
    println!("Search Results:\n");
    for result in results {
        let source = if result.source.is_empty() {
            "-"
        } else {
            result.source.as_str()
        };
        println!("{}: {}", source, result.link);
        println!("  Context: {}\n", result.context);
    }
}

/// Handles `mirrors`: prints the mirror directory
async fn handle_mirrors(config: &Config) -> anyhow::Result<()> {
    let directory = list_mirrors(config).await?;

    if directory.is_empty() {
        println!("No mirrors available.");
        return Ok(());
    }

    println!("Mirrors ({}):", directory.len());
    for mirror in directory.iter() {
        println!("  {}", mirror);
    }

    Ok(())
}

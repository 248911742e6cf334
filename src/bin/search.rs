//! Command-line host for hybrid job search.
//!
//! Results go to stdout as JSON; all diagnostics go to stderr.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use jobtracker::config::AppConfig;
use jobtracker::store::read_import_file;

/// Search and import job listings.
#[derive(Parser, Debug)]
#[command(name = "jobtracker-search")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Hybrid keyword and semantic job search")]
struct Args {
    /// Config file (defaults to the platform config directory)
    #[arg(short, long, env = "JOBTRACKER_CONFIG")]
    config: Option<PathBuf>,

    /// Override the database path from the config file
    #[arg(long)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search jobs; an empty query lists every job
    Search {
        /// Query words, joined with spaces
        query: Vec<String>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Import jobs from a JSON array, skipping duplicate URLs
    Import {
        /// Path to the JSON file
        file: PathBuf,
    },
}

fn load_config(args: &Args) -> anyhow::Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => {
            let path = AppConfig::default_config_path();
            if path.exists() {
                AppConfig::from_file(&path)
                    .with_context(|| format!("loading config {}", path.display()))?
            } else {
                AppConfig::default()
            }
        }
    };
    if let Some(database) = &args.database {
        config.database_path = database.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;
    jobtracker::init_tracing(&config.log_filter);

    let store = jobtracker::open_store(&config)
        .with_context(|| format!("opening {}", config.database_path.display()))?;

    match args.command {
        Command::Search { query, pretty } => {
            let search = jobtracker::build_search(store, &config)?;
            let outcome = search.search_detailed(&query.join(" ")).await?;
            tracing::info!(
                results = outcome.records.len(),
                ranking = ?outcome.ranking,
                "search finished"
            );
            let json = if pretty {
                serde_json::to_string_pretty(&outcome.records)?
            } else {
                serde_json::to_string(&outcome.records)?
            };
            println!("{json}");
        }
        Command::Import { file } => {
            let jobs = read_import_file(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let report = tokio::task::spawn_blocking(move || store.import(&jobs)).await??;
            println!("{}", serde_json::to_string(&report)?);
        }
    }
    Ok(())
}

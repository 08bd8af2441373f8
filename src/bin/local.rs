use std::path::PathBuf;
use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use arxivscraper::{
    config::{ApiConfig, HarvestConfig},
    harvest::Harvester,
    parser::ArxivParser
};

/// Fetch arxiv metadata for a category or a list of ids and save it as a gzipped csv table.
#[derive(Parser, Debug)]
#[command(name = "arxivscraper", version, long_about = None)]
struct Cli {
    /// Category filter, e.g. `cat:hep-th`. Takes precedence over --id.
    #[arg(long, env = "ARXIV_CATEGORY")]
    category: Option<String>,

    /// Explicit arxiv ids (repeatable or comma separated).
    #[arg(long = "id", value_delimiter = ',', env = "ARXIV_ID_LIST")]
    id_list: Vec<String>,

    /// Index of the first result.
    #[arg(long, default_value_t = 0, env = "ARXIV_START")]
    start: u32,

    /// Results wanted in total. Category runs page through this many.
    #[arg(long, default_value_t = 100, env = "ARXIV_TOTAL_RESULTS")]
    total_results: u32,

    /// Results per request.
    #[arg(long, default_value_t = 100, env = "ARXIV_PAGE_SIZE")]
    page_size: u32,

    /// Seconds to idle between pages.
    #[arg(long, default_value_t = 5, env = "ARXIV_WAIT_TIME")]
    wait_time: u64,

    /// Directory the table is written to.
    #[arg(long, default_value = ".", env = "ARXIV_OUTPUT_DIR")]
    output_dir: PathBuf,

    /// Base name of the output file; `.csv.gz` is appended.
    #[arg(long, default_value = "example_file_2019", env = "ARXIV_FILE_NAME")]
    file_name: String,

    /// Request timeout in seconds (0 disables it). Overrides ARXIV_TIMEOUT_SECS.
    #[arg(long)]
    timeout: Option<u64>,

    /// More logging (-v, -vv).
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors.
    #[arg(long, short)]
    quiet: bool
}

#[tokio::main]
async fn main() -> Result<()> {
    // variables from the env file must be visible before clap reads them.
    dotenvy::from_filename("arxivscraper.env").ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let mut api = ApiConfig::from_env().context("failed to load api configuration")?;
    if let Some(timeout) = cli.timeout {
        api.timeout_secs = timeout;
    }

    let harvest = HarvestConfig {
        category: cli.category,
        id_list: Some(cli.id_list).filter(|ids| !ids.is_empty()),
        start: cli.start,
        total_results: cli.total_results,
        page_size: cli.page_size,
        wait_time: cli.wait_time,
        output_dir: cli.output_dir,
        file_name: cli.file_name
    };

    let parser = ArxivParser::new(api).context("failed to build http client")?;
    let report = Harvester::new(parser, harvest)
        .run()
        .await
        .context("harvest failed")?;

    for query in &report.queries {
        println!("Executing query: \n {}", query);
    }
    println!("Query ran and returned {} results", report.rows);
    println!("Saved file to {}", report.path.display());
    Ok(())
}

fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug",
        _ => "trace"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("arxivscraper={}", level))
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

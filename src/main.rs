//! holderscope - Solana token holder concentration analyzer
//!
//! Queries the configured RPC endpoints in order, falling back across
//! parameter variants and endpoints, then prints the top holders and
//! concentration statistics. Optional CSV / JSON export.

use clap::Parser;
use eyre::Result;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use holderscope::models::{AnalyzerConfig, Endpoint};
use holderscope::providers::HttpExecutor;
use holderscope::utils::{
    export_csv, export_json, render_report, APP_VERSION, ROACORE_SYMBOL, ROACORE_TOKEN_MINT,
};
use holderscope::{HolderAnalyzer, RetryPolicy};

#[derive(Debug, Parser)]
#[command(name = "holderscope", version, about = "Solana token holder analysis")]
struct Cli {
    /// Token mint address
    #[arg(long, default_value = ROACORE_TOKEN_MINT)]
    mint: String,

    /// Symbol used in the report
    #[arg(long, default_value = ROACORE_SYMBOL)]
    symbol: String,

    /// Number of top holders to analyze
    #[arg(long)]
    top: Option<usize>,

    /// Export holders to CSV
    #[arg(long)]
    csv: bool,

    /// Export the full report to JSON
    #[arg(long)]
    json: bool,

    /// Reduce log output
    #[arg(long)]
    quiet: bool,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// RPC endpoint URL, repeatable; replaces the default list
    #[arg(long = "endpoint", value_name = "URL")]
    endpoints: Vec<String>,

    /// Overall time budget for the run in seconds
    #[arg(long, value_name = "SECS")]
    deadline: Option<u64>,

    /// Directory for exported files
    #[arg(long, value_name = "PATH")]
    output_dir: Option<PathBuf>,

    /// Pause policy between retries of the same call
    #[arg(long, value_parser = ["fixed", "exponential"])]
    backoff: Option<String>,
}

impl Cli {
    fn to_config(&self) -> AnalyzerConfig {
        let mut config = AnalyzerConfig::default();

        if !self.endpoints.is_empty() {
            let endpoints = self
                .endpoints
                .iter()
                .enumerate()
                .map(|(i, url)| Endpoint::premium(url.clone(), format!("Custom RPC {}", i + 1)))
                .collect();
            config = config.with_endpoints(endpoints);
        }
        if let Some(top) = self.top {
            config = config.with_top_n(top);
        }
        if let Some(secs) = self.timeout {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = self.deadline {
            config = config.with_deadline(Some(Duration::from_secs(secs)));
        }
        if let Some(dir) = &self.output_dir {
            config = config.with_output_dir(dir.clone());
        }
        if let Some(policy) = self
            .backoff
            .as_deref()
            .and_then(|name| RetryPolicy::from_name(name, config.retry_policy.base_delay()))
        {
            config = config.with_retry_policy(policy);
        }
        config
    }
}

fn init_logging(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.quiet);

    let config = cli.to_config();
    config.validate()?;
    let (mint, symbol) = (cli.mint.as_str(), cli.symbol.as_str());

    println!("{} Token Holder Analysis (holderscope v{})", symbol, APP_VERSION);
    println!("Token address: {}", mint);
    println!("Analysis start time: {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
    println!("Analyzing top {} holders", config.top_n);
    if cli.csv {
        println!("✓ CSV export enabled");
    }
    if cli.json {
        println!("✓ JSON export enabled");
    }

    let analyzer = HolderAnalyzer::new(HttpExecutor::new()?, config);
    let report = analyzer.run(mint).await;
    let output_dir = &analyzer.config().output_dir;

    let mut exported = Vec::new();
    if cli.csv {
        if let (Some(metadata), Some(statistics)) = (&report.metadata, &report.statistics) {
            match export_csv(output_dir, &report.holders, metadata, statistics) {
                Ok(path) => exported.push(path),
                Err(e) => error!("❌ CSV export failed: {}", e),
            }
        }
    }
    if cli.json {
        match export_json(output_dir, &report) {
            Ok(path) => exported.push(path),
            Err(e) => error!("❌ JSON export failed: {}", e),
        }
    }

    println!("{}", render_report(&report, symbol, &exported));
    info!("🏁 Run {} finished", report.run_id);

    if !report.success {
        std::process::exit(1);
    }
    Ok(())
}

//! Endpoint capability check
//!
//! Runs the capability probe against each configured endpoint and prints a
//! per-method table. No holder analysis is performed.
//!
//! Usage:
//!   cargo run --bin endpoint_check -- --endpoint https://api.mainnet-beta.solana.com
//!
//! Environment:
//!   SOLANA_RPC_URL - Extra endpoint tried first
//!   RUST_LOG       - Log level (default: warn)

use clap::Parser;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use holderscope::core::{gate, probe_endpoint, RetryController};
use holderscope::models::{AnalyzerConfig, Endpoint};
use holderscope::providers::{HttpExecutor, REQUIRED_METHODS};
use holderscope::utils::{render_capability_table, ROACORE_TOKEN_MINT};

#[derive(Debug, Parser)]
#[command(name = "endpoint_check", version, about = "Probe Solana RPC endpoint capabilities")]
struct Cli {
    /// Mint used for the token method probes
    #[arg(long, default_value = ROACORE_TOKEN_MINT)]
    mint: String,

    /// RPC endpoint URL, repeatable; replaces the default list
    #[arg(long = "endpoint", value_name = "URL")]
    endpoints: Vec<String>,

    /// Per-call timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Pause between endpoints in seconds
    #[arg(long, default_value_t = 1)]
    pause: u64,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();
    let defaults = AnalyzerConfig::default();
    let endpoints: Vec<Endpoint> = if cli.endpoints.is_empty() {
        defaults.endpoints.clone()
    } else {
        cli.endpoints
            .iter()
            .enumerate()
            .map(|(i, url)| Endpoint::premium(url.clone(), format!("Custom RPC {}", i + 1)))
            .collect()
    };
    let timeout = cli
        .timeout
        .map(Duration::from_secs)
        .unwrap_or(defaults.probe_timeout);

    let executor = HttpExecutor::new()?;
    let retry = RetryController::new(defaults.probe_max_attempts, defaults.retry_policy.clone());

    println!("Solana RPC Endpoint Capability Test");
    println!("{}", "=".repeat(80));

    let mut usable = 0;
    for (i, endpoint) in endpoints.iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(Duration::from_secs(cli.pause)).await;
        }

        println!("\n🔍 {} [{}]", endpoint.label(), endpoint.masked_url());
        let report = probe_endpoint(&executor, &retry, endpoint, &cli.mint, timeout).await;
        println!("{}", render_capability_table(&report));

        match gate(&report) {
            Ok(()) => {
                usable += 1;
                println!("✅ Ready for holder analysis");
            }
            Err(e) => println!("❌ Not usable: {}", e.message),
        }
    }

    println!("\n{}", "=".repeat(80));
    println!(
        "{}/{} endpoint(s) support {}",
        usable,
        endpoints.len(),
        REQUIRED_METHODS.join(" + ")
    );
    Ok(())
}

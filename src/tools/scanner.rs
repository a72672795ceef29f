//! Scan random secp256k1 keys for funded P2PKH addresses.
//!
//! Every derived address is looked up against a balance service. Empty ones go to
//! `empty_wallets.txt` and `empty_wallets_with_pkey.txt`, funded ones to `found_wallets.txt`.
//! Runs until every worker has found a funded address, or until killed.

use anyhow::Context;
use btc_scanner::balance::HttpBalanceService;
use btc_scanner::config::{ScanConfig, DEFAULT_ENDPOINT, DEFAULT_USER_AGENT, DEFAULT_WORKERS};
use btc_scanner::counters::ProgressCounters;
use btc_scanner::keys::Secp256k1Source;
use btc_scanner::worker::{ScanContext, WorkerPool};
use btc_scanner::{set_up_logging, TokioSleeper};
use clap::Parser;
use log::{info, LevelFilter};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(about)]
struct Args {
    /// Number of concurrent workers
    #[arg(short, long, default_value_t = DEFAULT_WORKERS)]
    workers: usize,
    /// Timeout of one balance request
    #[arg(long, default_value = "5s", value_parser = humantime::parse_duration)]
    timeout: Duration,
    /// Retries after an HTTP 429
    #[arg(long, default_value_t = 3)]
    max_retries: u32,
    /// Wait before retrying a rate-limited request
    #[arg(long, default_value = "60s", value_parser = humantime::parse_duration)]
    cooldown: Duration,
    /// Pause between two addresses of a worker
    #[arg(long, default_value = "100ms", value_parser = humantime::parse_duration)]
    sleep: Duration,
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    endpoint: String,
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    user_agent: String,
    /// Directory of the result files
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,
    /// Progress log interval; 0 disables it
    #[arg(long, default_value = "30s", value_parser = humantime::parse_duration)]
    report_interval: Duration,
    #[arg(long)]
    log_file: Option<PathBuf>,
    #[arg(short, long)]
    verbose: bool,
}

impl From<Args> for ScanConfig {
    fn from(args: Args) -> Self {
        Self {
            workers: args.workers,
            query_timeout: args.timeout,
            max_retries: args.max_retries,
            rate_limit_cooldown: args.cooldown,
            inter_cycle_sleep: args.sleep,
            endpoint: args.endpoint,
            user_agent: args.user_agent,
            output_dir: args.output_dir,
            report_interval: args.report_interval,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    set_up_logging(level, args.log_file.as_deref())?;

    let config = ScanConfig::from(args);
    config.validate()?;
    tokio::fs::create_dir_all(&config.output_dir)
        .await
        .with_context(|| format!("creating {}", config.output_dir.display()))?;

    info!("Workers: {}", config.workers);
    info!("Endpoint: {}", config.endpoint);
    info!("Output directory: {}", config.output_dir.display());

    let service = HttpBalanceService::from_config(&config)?;
    let context = Arc::new(ScanContext::new(
        &config,
        Arc::new(Secp256k1Source::new()),
        Arc::new(service),
        Arc::new(TokioSleeper),
        Arc::new(ProgressCounters::new()),
    ));
    let found = WorkerPool::new(&config, context).run().await;
    for wallet in found {
        info!(
            "Funded: {} (worker #{}, {} sat)",
            wallet.address, wallet.worker, wallet.balance_units
        );
    }
    Ok(())
}

//! Scan workers and the pool running them.
//!
//! Each worker loops generate -> derive -> query -> record -> sleep on its own. It stops only
//! after finding a funded address; siblings are not told about it and keep scanning, so the
//! pool finishes once every worker has found one (in practice, never).

use crate::address::derive_address;
use crate::balance::{format_btc, BalanceQuery, BalanceService};
use crate::config::ScanConfig;
use crate::counters::ProgressCounters;
use crate::keys::KeypairSource;
use crate::recorder::{ResultRecorder, ScanOutcome};
use crate::{short_address, Sleeper};
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;

/// Everything the workers share.
pub struct ScanContext {
    keys: Arc<dyn KeypairSource>,
    query: BalanceQuery,
    recorder: ResultRecorder,
    counters: Arc<ProgressCounters>,
    sleeper: Arc<dyn Sleeper>,
    inter_cycle_sleep: Duration,
}

impl ScanContext {
    pub fn new(
        config: &ScanConfig,
        keys: Arc<dyn KeypairSource>,
        service: Arc<dyn BalanceService>,
        sleeper: Arc<dyn Sleeper>,
        counters: Arc<ProgressCounters>,
    ) -> Self {
        Self {
            keys,
            query: BalanceQuery::new(
                service,
                sleeper.clone(),
                counters.clone(),
                config.max_retries,
                config.rate_limit_cooldown,
            ),
            recorder: ResultRecorder::new(&config.output_dir),
            counters,
            sleeper,
            inter_cycle_sleep: config.inter_cycle_sleep,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundedWallet {
    pub worker: usize,
    pub address: String,
    pub private_key_hex: String,
    pub balance_units: u64,
}

pub struct ScanWorker {
    id: usize,
    context: Arc<ScanContext>,
}

impl ScanWorker {
    pub fn new(id: usize, context: Arc<ScanContext>) -> Self {
        Self { id, context }
    }

    /// Returns only with a funded wallet.
    pub async fn run(self) -> FundedWallet {
        debug!("Worker #{} started", self.id);
        loop {
            if let Some(found) = self.cycle().await {
                return found;
            }
        }
    }

    /// One generate-derive-query-record round. Every failure is counted and swallowed.
    async fn cycle(&self) -> Option<FundedWallet> {
        let context = &*self.context;

        let keypair = match context.keys.generate() {
            Ok(k) => k,
            Err(e) => {
                warn!("Worker #{}: {e}", self.id);
                context.counters.increment_errors();
                tokio::task::yield_now().await;
                return None;
            }
        };
        let address = match derive_address(&keypair.public) {
            Ok(a) => a,
            Err(e) => {
                warn!("Worker #{}: {e}", self.id);
                context.counters.increment_errors();
                tokio::task::yield_now().await;
                return None;
            }
        };
        let private_key_hex = keypair.secret_hex();
        drop(keypair);
        // counts the attempt, not a completed lookup
        context.counters.increment_checked();

        let result = context.query.query(&address).await;
        let outcome = ScanOutcome::from_result(address, private_key_hex, &result);

        if let Err(e) = context.recorder.record(&outcome).await {
            error!("Worker #{}: {e}", self.id);
            if let Some(line) = outcome.found_line() {
                error!("Unrecorded funded wallet: {line}");
            }
            context.counters.increment_errors();
            tokio::task::yield_now().await;
            return None;
        }

        match outcome {
            ScanOutcome::Funded {
                address,
                private_key_hex,
                balance_units,
            } => {
                info!(
                    "Found wallet: ...{} | {} BTC",
                    short_address(&address),
                    format_btc(balance_units)
                );
                Some(FundedWallet {
                    worker: self.id,
                    address,
                    private_key_hex,
                    balance_units,
                })
            }
            ScanOutcome::Empty { address, .. } => {
                debug!("Checked: ...{}", short_address(&address));
                context.sleeper.sleep(context.inter_cycle_sleep).await;
                None
            }
            ScanOutcome::Failed(_) => {
                tokio::task::yield_now().await;
                None
            }
        }
    }
}

pub struct WorkerPool {
    workers: usize,
    report_interval: Duration,
    context: Arc<ScanContext>,
}

impl WorkerPool {
    pub fn new(config: &ScanConfig, context: Arc<ScanContext>) -> Self {
        Self {
            workers: config.workers,
            report_interval: config.report_interval,
            context,
        }
    }

    /// Completes when every worker is terminal. A worker task that panics counts as terminal
    /// and is only logged. Dropping the future aborts the workers and the reporter.
    pub async fn run(&self) -> Vec<FundedWallet> {
        info!("Starting {} workers", self.workers);
        let mut set = JoinSet::new();
        for id in 0..self.workers {
            set.spawn(ScanWorker::new(id, self.context.clone()).run());
        }

        let mut reporter = JoinSet::new();
        if !self.report_interval.is_zero() {
            reporter.spawn(report_progress(
                self.context.counters.clone(),
                self.report_interval,
            ));
        }

        let mut found = Vec::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(wallet) => {
                    info!(
                        "Worker #{} stopped after finding ...{}",
                        wallet.worker,
                        short_address(&wallet.address)
                    );
                    found.push(wallet);
                }
                Err(e) => error!("Worker task failed: {e}"),
            }
        }

        reporter.abort_all();
        let snapshot = self.context.counters.snapshot();
        info!(
            "All workers finished. Checked: {}, errors: {}",
            snapshot.checked, snapshot.errors
        );
        found
    }
}

async fn report_progress(counters: Arc<ProgressCounters>, every: Duration) {
    let started = Instant::now();
    let mut interval = tokio::time::interval(every);
    // the first tick fires immediately
    interval.tick().await;
    loop {
        interval.tick().await;
        let snapshot = counters.snapshot();
        let rate = snapshot.checked as f64 / started.elapsed().as_secs_f64();
        info!(
            "Checked: {} | Errors: {} | {:.2} addresses/s",
            snapshot.checked, snapshot.errors, rate
        );
    }
}

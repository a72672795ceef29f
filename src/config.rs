use crate::{Result, ScanError};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_WORKERS: usize = 12;
pub const DEFAULT_ENDPOINT: &str = "https://api.blockchain.info/haskoin-store/btc";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/67.0.3396.99 Safari/537.36";

#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub workers: usize,
    /// Per attempt, not per lookup.
    pub query_timeout: Duration,
    /// Retries after the first attempt when the service answers 429.
    pub max_retries: u32,
    pub rate_limit_cooldown: Duration,
    /// Pause after an empty address, before the next key.
    pub inter_cycle_sleep: Duration,
    /// Balance service base URL; `/address/<address>/balance` gets appended.
    pub endpoint: String,
    pub user_agent: String,
    /// Directory holding the three result logs.
    pub output_dir: PathBuf,
    /// Zero disables the periodic progress line.
    pub report_interval: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            query_timeout: Duration::from_secs(5),
            max_retries: 3,
            rate_limit_cooldown: Duration::from_secs(60),
            inter_cycle_sleep: Duration::from_millis(100),
            endpoint: DEFAULT_ENDPOINT.into(),
            user_agent: DEFAULT_USER_AGENT.into(),
            output_dir: PathBuf::from("."),
            report_interval: Duration::from_secs(30),
        }
    }
}

impl ScanConfig {
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(ScanError::InvalidConfig("at least one worker is needed".into()));
        }
        if self.query_timeout.is_zero() {
            return Err(ScanError::InvalidConfig("query timeout must be non-zero".into()));
        }
        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(ScanError::InvalidConfig(format!(
                "endpoint is not an HTTP(S) URL: {}",
                self.endpoint
            )));
        }
        Ok(())
    }
}

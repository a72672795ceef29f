//! Append-only result logs.
//!
//! | File                          | Line                                       |
//! |-------------------------------|--------------------------------------------|
//! | `found_wallets.txt`           | `<time> \| <address> \| <key hex> \| <balance> BTC` |
//! | `empty_wallets.txt`           | `<address>`                                |
//! | `empty_wallets_with_pkey.txt` | `<address> \| <key hex>`                   |

use crate::balance::{format_btc, BalanceResult};
use crate::{Result, ScanError};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

pub const FOUND_LOG: &str = "found_wallets.txt";
pub const EMPTY_LOG: &str = "empty_wallets.txt";
pub const EMPTY_WITH_KEY_LOG: &str = "empty_wallets_with_pkey.txt";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Funded {
        address: String,
        private_key_hex: String,
        balance_units: u64,
    },
    Empty {
        address: String,
        private_key_hex: String,
    },
    Failed(String),
}

impl ScanOutcome {
    pub fn from_result(address: String, private_key_hex: String, result: &BalanceResult) -> Self {
        if !result.success {
            ScanOutcome::Failed(format!("balance lookup failed for {address}"))
        } else if result.is_funded() {
            ScanOutcome::Funded {
                address,
                private_key_hex,
                balance_units: result.balance_units,
            }
        } else {
            ScanOutcome::Empty {
                address,
                private_key_hex,
            }
        }
    }

    /// The `found_wallets.txt` line of a funded outcome.
    pub fn found_line(&self) -> Option<String> {
        let ScanOutcome::Funded {
            address,
            private_key_hex,
            balance_units,
        } = self
        else {
            return None;
        };
        let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT);
        Some(format!(
            "{timestamp} | {address} | {private_key_hex} | {} BTC",
            format_btc(*balance_units)
        ))
    }
}

/// One log file; appends to it are serialized so lines never interleave.
struct LogFile {
    path: PathBuf,
    lock: Mutex<()>,
}

impl LogFile {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    /// Appends `line` and a newline, creating the file if absent. With `sync` the data is
    /// on disk before this returns.
    async fn append_line(&self, line: &str, sync: bool) -> Result<()> {
        let mut buf = String::with_capacity(line.len() + 1);
        buf.push_str(line);
        buf.push('\n');

        let _guard = self.lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| self.error(e))?;
        file.write_all(buf.as_bytes())
            .await
            .map_err(|e| self.error(e))?;
        file.flush().await.map_err(|e| self.error(e))?;
        if sync {
            file.sync_all().await.map_err(|e| self.error(e))?;
        }
        Ok(())
    }

    fn error(&self, source: io::Error) -> ScanError {
        ScanError::Persistence {
            path: self.path.clone(),
            source,
        }
    }
}

pub struct ResultRecorder {
    found: LogFile,
    empty: LogFile,
    empty_with_key: LogFile,
}

impl ResultRecorder {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            found: LogFile::new(dir.join(FOUND_LOG)),
            empty: LogFile::new(dir.join(EMPTY_LOG)),
            empty_with_key: LogFile::new(dir.join(EMPTY_WITH_KEY_LOG)),
        }
    }

    pub fn found_path(&self) -> &Path {
        &self.found.path
    }

    pub async fn record(&self, outcome: &ScanOutcome) -> Result<()> {
        match outcome {
            ScanOutcome::Funded { .. } => {
                if let Some(line) = outcome.found_line() {
                    self.found.append_line(&line, true).await?;
                }
            }
            ScanOutcome::Empty {
                address,
                private_key_hex,
            } => {
                self.empty.append_line(address, false).await?;
                self.empty_with_key
                    .append_line(&format!("{address} | {private_key_hex}"), false)
                    .await?;
            }
            // counted by the balance lookup, nothing to persist
            ScanOutcome::Failed(_) => {}
        }
        Ok(())
    }
}

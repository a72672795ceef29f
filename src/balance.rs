//! Address balance lookups against a haskoin-store style HTTP API.
//!
//! `GET <endpoint>/address/<address>/balance` answers with a JSON object whose `confirmed`
//! field is the balance in satoshis. HTTP 429 is retried after a cooldown; every other
//! failure gives up on the address at once.

use crate::config::ScanConfig;
use crate::counters::ProgressCounters;
use crate::{short_address, Result, ScanError, Sleeper};
use async_trait::async_trait;
use bitcoin::amount::Denomination;
use bitcoin::Amount;
use log::{debug, info, warn};
use reqwest::StatusCode;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceReply {
    pub status: u16,
    pub body: String,
}

/// One HTTP round trip. Retrying is left to [`BalanceQuery`].
#[async_trait]
pub trait BalanceService: Send + Sync {
    async fn fetch(&self, address: &str) -> Result<ServiceReply>;
}

pub struct HttpBalanceService {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpBalanceService {
    pub fn new(endpoint: &str, user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').into(),
        })
    }

    pub fn from_config(config: &ScanConfig) -> Result<Self> {
        Self::new(&config.endpoint, &config.user_agent, config.query_timeout)
    }

    pub fn balance_url(&self, address: &str) -> String {
        format!("{}/address/{}/balance", self.endpoint, address)
    }
}

#[async_trait]
impl BalanceService for HttpBalanceService {
    async fn fetch(&self, address: &str) -> Result<ServiceReply> {
        let response = self.client.get(self.balance_url(address)).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(ServiceReply { status, body })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceResult {
    pub success: bool,
    /// Satoshis.
    pub balance_units: u64,
}

impl BalanceResult {
    pub fn confirmed(balance_units: u64) -> Self {
        Self {
            success: true,
            balance_units,
        }
    }

    pub fn failed() -> Self {
        Self {
            success: false,
            balance_units: 0,
        }
    }

    pub fn is_funded(&self) -> bool {
        self.success && self.balance_units > 0
    }
}

/// Satoshis as a BTC amount without trailing zeros (`150000000` -> `1.5`).
pub fn format_btc(balance_units: u64) -> String {
    Amount::from_sat(balance_units)
        .display_in(Denomination::Bitcoin)
        .to_string()
}

#[derive(Deserialize)]
struct BalanceReply {
    confirmed: u64,
}

pub fn parse_confirmed(body: &str) -> Result<u64> {
    Ok(serde_json::from_str::<BalanceReply>(body)?.confirmed)
}

pub struct BalanceQuery {
    service: Arc<dyn BalanceService>,
    sleeper: Arc<dyn Sleeper>,
    counters: Arc<ProgressCounters>,
    max_retries: u32,
    cooldown: Duration,
}

impl BalanceQuery {
    pub fn new(
        service: Arc<dyn BalanceService>,
        sleeper: Arc<dyn Sleeper>,
        counters: Arc<ProgressCounters>,
        max_retries: u32,
        cooldown: Duration,
    ) -> Self {
        Self {
            service,
            sleeper,
            counters,
            max_retries,
            cooldown,
        }
    }

    /// Looks up `address`; a failure bumps the error counter and yields an unsuccessful
    /// result instead of an error.
    pub async fn query(&self, address: &str) -> BalanceResult {
        match self.fetch_balance(address).await {
            Ok(balance_units) => BalanceResult::confirmed(balance_units),
            Err(e) => {
                warn!("Balance lookup failed for ...{}: {e}", short_address(address));
                self.counters.increment_errors();
                BalanceResult::failed()
            }
        }
    }

    /// At most `1 + max_retries` requests, with one cooldown before each retry.
    pub async fn fetch_balance(&self, address: &str) -> Result<u64> {
        let mut retries = 0_u32;
        loop {
            let reply = self.service.fetch(address).await?;
            match StatusCode::from_u16(reply.status) {
                Ok(StatusCode::OK) => return parse_confirmed(&reply.body),
                Ok(StatusCode::TOO_MANY_REQUESTS) if retries < self.max_retries => {
                    retries += 1;
                    info!(
                        "Rate limit hit, cooling down for {}... (attempt {}/{})",
                        humantime::format_duration(self.cooldown),
                        retries,
                        self.max_retries
                    );
                    self.sleeper.sleep(self.cooldown).await;
                    debug!("Retrying address: ...{}", short_address(address));
                }
                Ok(StatusCode::TOO_MANY_REQUESTS) => {
                    return Err(ScanError::RateLimited {
                        attempts: retries + 1,
                    })
                }
                _ => return Err(ScanError::HttpStatus(reply.status)),
            }
        }
    }
}

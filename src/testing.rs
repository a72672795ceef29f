//! Stand-ins for the network, the clock and the curve.

use crate::address::UNCOMPRESSED_PUBKEY_LEN;
use crate::balance::{BalanceService, ServiceReply};
use crate::keys::{Keypair, KeypairSource, SECRET_KEY_LEN};
use crate::{sha256, Result, ScanError, Sleeper};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub enum Scripted {
    /// HTTP 200 with this body.
    Ok(&'static str),
    Status(u16),
    Transport,
}

impl Scripted {
    fn reply(self) -> Result<ServiceReply> {
        match self {
            Scripted::Ok(body) => Ok(ServiceReply {
                status: 200,
                body: body.into(),
            }),
            Scripted::Status(status) => Ok(ServiceReply {
                status,
                body: String::new(),
            }),
            Scripted::Transport => Err(ScanError::Transport("connection reset by peer".into())),
        }
    }
}

/// Plays back `script` in order, then answers with `fallback` forever.
pub struct ScriptedService {
    script: Mutex<VecDeque<Scripted>>,
    fallback: Scripted,
    calls: AtomicUsize,
    requested: Mutex<Vec<String>>,
}

impl ScriptedService {
    pub fn new(script: impl IntoIterator<Item = Scripted>, fallback: Scripted) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            fallback,
            calls: AtomicUsize::new(0),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn always(reply: Scripted) -> Self {
        Self::new([], reply)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl BalanceService for ScriptedService {
    async fn fetch(&self, address: &str) -> Result<ServiceReply> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().unwrap().push(address.into());
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or(self.fallback).reply()
    }
}

/// Returns at once and remembers what it was asked to wait for.
#[derive(Default)]
pub struct RecordingSleeper {
    durations: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn recorded(&self) -> Vec<Duration> {
        self.durations.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.durations.lock().unwrap().push(duration);
        tokio::task::yield_now().await;
    }
}

/// Fake curve: `0x04 || sha256(secret) || sha256(sha256(secret))`.
///
/// Hands out a fixed secret, after failing `failures` times.
pub struct StubKeypairSource {
    secret: [u8; SECRET_KEY_LEN],
    failures: AtomicUsize,
}

impl StubKeypairSource {
    pub fn new(secret: [u8; SECRET_KEY_LEN]) -> Self {
        Self::failing(secret, 0)
    }

    pub fn failing(secret: [u8; SECRET_KEY_LEN], failures: usize) -> Self {
        Self {
            secret,
            failures: AtomicUsize::new(failures),
        }
    }

    pub fn public_key_of(secret: &[u8; SECRET_KEY_LEN]) -> [u8; UNCOMPRESSED_PUBKEY_LEN] {
        let x = sha256(secret);
        let y = sha256(&x);
        let mut public = [0_u8; UNCOMPRESSED_PUBKEY_LEN];
        public[0] = 0x04;
        public[1..33].copy_from_slice(&x);
        public[33..].copy_from_slice(&y);
        public
    }
}

impl KeypairSource for StubKeypairSource {
    fn generate(&self) -> Result<Keypair> {
        let failed = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(ScanError::KeyGeneration("entropy source exhausted".into()));
        }
        Ok(Keypair {
            secret: self.secret,
            public: Self::public_key_of(&self.secret),
        })
    }
}

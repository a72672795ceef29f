use async_trait::async_trait;
use digest::{Digest, Output};
use log::LevelFilter;
use sha2::Sha256;
use std::io;
use std::path::Path;
use std::time::Duration;

pub mod address;
pub mod balance;
pub mod base58;
pub mod config;
pub mod counters;
pub mod error;
pub mod keys;
pub mod recorder;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{Result, ScanError};

#[inline]
pub fn sha256(data: &[u8]) -> [u8; 32] {
    hash_iter::<Sha256>(data, 1).into()
}

#[inline]
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    hash_iter::<Sha256>(data, 2).into()
}

/// Hashes `data` once, then re-hashes the digest `iter_num - 1` more times.
pub fn hash_iter<H: Digest>(data: &[u8], iter_num: u64) -> Output<H> {
    let mut hash = H::digest(data);
    for _ in 1..iter_num {
        hash = H::digest(&hash);
    }
    hash
}

#[macro_export]
macro_rules! hash {
    ($t:ty, $data:expr, $iter:expr) => {
        $crate::hash_iter::<$t>($data, $iter)
    };
    ($t:ty, $data:expr) => {
        hash!($t, $data, 1)
    };
}

/// RIPEMD-160 of SHA-256.
pub fn hash160(data: &[u8]) -> [u8; 20] {
    hash!(ripemd::Ripemd160, &sha256(data), 1).into()
}

pub trait EncodeHex {
    fn hex(&self) -> String;
}

impl<A> EncodeHex for A
where
    A: AsRef<[u8]>,
{
    fn hex(&self) -> String {
        hex::encode(self)
    }
}

/// Last four characters of an address, the only part that goes to the console.
pub fn short_address(address: &str) -> &str {
    let start = address
        .char_indices()
        .rev()
        .nth(3)
        .map_or(0, |(i, _)| i);
    &address[start..]
}

/// Suspension used for the rate-limit cooldown and the inter-cycle throttle.
///
/// Tests swap in an implementation that only records the requested durations.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

pub fn set_up_logging(level: LevelFilter, file: Option<&Path>) -> anyhow::Result<()> {
    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                humantime::format_rfc3339(std::time::SystemTime::now()),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        // the HTTP stack is noisy below `info`
        .level_for("hyper", LevelFilter::Info)
        .level_for("hyper_util", LevelFilter::Info)
        .level_for("reqwest", LevelFilter::Info)
        .level_for("rustls", LevelFilter::Info)
        .chain(io::stdout());
    if let Some(file) = file {
        dispatch = dispatch.chain(fern::log_file(file)?);
    }
    dispatch.apply()?;
    Ok(())
}

#[cfg(test)]
mod test {
    use crate::{hash160, sha256, sha256d, short_address, EncodeHex};
    use hex_literal::hex;

    #[test]
    fn hashes() {
        assert_eq!(
            sha256(&[0_u8; 32]),
            hex!("66687aadf862bd776c8fc18b8e9f8e20089714856ee233b3902a591d0d5f2925")
        );
        assert_eq!(sha256d(b"hello"), sha256(&sha256(b"hello")));
        // generator point of secp256k1, uncompressed
        let g = hex!(
            "0479be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
            "483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8"
        );
        assert_eq!(
            hash160(&g).hex(),
            "91b24bf9f5288532960ac687abb035127b1d28a5"
        );
    }

    #[test]
    fn address_suffix() {
        assert_eq!(short_address("1EHNa6Q4Jz2uvNExL497mE43ikXhwF6kZm"), "6kZm");
        assert_eq!(short_address("abc"), "abc");
        assert_eq!(short_address(""), "");
    }
}

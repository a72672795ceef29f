use crate::address::UNCOMPRESSED_PUBKEY_LEN;
use crate::{EncodeHex, Result, ScanError};
use bitcoin::secp256k1::{All, PublicKey, Secp256k1, SecretKey};
use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;
use std::fmt::{Debug, Formatter};

pub const SECRET_KEY_LEN: usize = 32;

/// Key material of one scan cycle. Never shared between workers.
#[derive(Clone)]
pub struct Keypair {
    pub secret: [u8; SECRET_KEY_LEN],
    pub public: [u8; UNCOMPRESSED_PUBKEY_LEN],
}

impl Keypair {
    pub fn secret_hex(&self) -> String {
        self.secret.hex()
    }
}

impl Debug for Keypair {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("secret", &"<redacted>")
            .field("public", &self.public.hex())
            .finish()
    }
}

pub trait KeypairSource: Send + Sync {
    fn generate(&self) -> Result<Keypair>;
}

pub struct Secp256k1Source {
    secp: Secp256k1<All>,
}

impl Secp256k1Source {
    pub fn new() -> Self {
        Self {
            secp: Secp256k1::new(),
        }
    }

    pub fn keypair_from_secret(&self, secret: &[u8; SECRET_KEY_LEN]) -> Result<Keypair> {
        // zero or >= the curve order
        let secret_key = SecretKey::from_slice(secret)
            .map_err(|e| ScanError::KeyGeneration(e.to_string()))?;
        let public = PublicKey::from_secret_key(&self.secp, &secret_key);
        Ok(Keypair {
            secret: *secret,
            public: public.serialize_uncompressed(),
        })
    }
}

impl Default for Secp256k1Source {
    fn default() -> Self {
        Self::new()
    }
}

impl KeypairSource for Secp256k1Source {
    fn generate(&self) -> Result<Keypair> {
        let mut ec = [0_u8; SECRET_KEY_LEN];
        OsRng
            .try_fill_bytes(&mut ec)
            .map_err(|e| ScanError::KeyGeneration(e.to_string()))?;
        self.keypair_from_secret(&ec)
    }
}

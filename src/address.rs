//! Legacy pay-to-pubkey-hash addresses.
//!
//! `base58(0x00 || hash160(pubkey) || sha256d(0x00 || hash160(pubkey))[..4])`

use crate::error::Base58DecodeError;
use crate::{base58, hash160, sha256d, Result, ScanError};
use std::fmt;
use std::fmt::{Display, Formatter};

/// Version byte of a mainnet P2PKH address.
pub const VERSION_BYTE: u8 = 0x00;
pub const PUBKEY_HASH_LEN: usize = 20;
pub const CHECKSUM_LEN: usize = 4;
pub const PAYLOAD_LEN: usize = 1 + PUBKEY_HASH_LEN + CHECKSUM_LEN;
/// `0x04 || x || y`
pub const UNCOMPRESSED_PUBKEY_LEN: usize = 65;

/// Version byte, public key hash and checksum, ready for base58.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VersionedPayload([u8; PAYLOAD_LEN]);

impl VersionedPayload {
    pub fn derive(public_key: &[u8]) -> Self {
        let mut payload = [0_u8; PAYLOAD_LEN];
        payload[0] = VERSION_BYTE;
        payload[1..(1 + PUBKEY_HASH_LEN)].copy_from_slice(&hash160(public_key));
        let checksum = checksum(&payload[..(1 + PUBKEY_HASH_LEN)]);
        payload[(1 + PUBKEY_HASH_LEN)..].copy_from_slice(&checksum);
        Self(payload)
    }

    /// Decodes an address and verifies its length and checksum.
    pub fn from_address(address: &str) -> std::result::Result<Self, Base58DecodeError> {
        let bytes = base58::decode(address)?;
        let payload: [u8; PAYLOAD_LEN] =
            bytes
                .as_slice()
                .try_into()
                .map_err(|_| Base58DecodeError::InvalidLength {
                    expected: PAYLOAD_LEN,
                    actual: bytes.len(),
                })?;
        let (versioned, sum) = payload.split_at(1 + PUBKEY_HASH_LEN);
        if checksum(versioned) != sum {
            return Err(Base58DecodeError::ChecksumMismatch);
        }
        Ok(Self(payload))
    }

    pub fn as_bytes(&self) -> &[u8; PAYLOAD_LEN] {
        &self.0
    }

    pub fn version(&self) -> u8 {
        self.0[0]
    }

    pub fn pubkey_hash(&self) -> &[u8] {
        &self.0[1..(1 + PUBKEY_HASH_LEN)]
    }

    pub fn checksum(&self) -> &[u8] {
        &self.0[(1 + PUBKEY_HASH_LEN)..]
    }

    pub fn to_address(&self) -> String {
        base58::encode(&self.0)
    }
}

impl Display for VersionedPayload {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_address())
    }
}

/// First four bytes of the double SHA-256.
pub fn checksum(data: &[u8]) -> [u8; CHECKSUM_LEN] {
    let hash = sha256d(data);
    let mut sum = [0_u8; CHECKSUM_LEN];
    sum.copy_from_slice(&hash[..CHECKSUM_LEN]);
    sum
}

/// Address of an uncompressed public key.
///
/// Anything that is not a 65-byte `0x04`-prefixed point is rejected as malformed key material.
pub fn derive_address(public_key: &[u8]) -> Result<String> {
    if public_key.len() != UNCOMPRESSED_PUBKEY_LEN {
        return Err(ScanError::Derivation(format!(
            "expected a {UNCOMPRESSED_PUBKEY_LEN}-byte uncompressed public key, got {} bytes",
            public_key.len()
        )));
    }
    if public_key[0] != 0x04 {
        return Err(ScanError::Derivation(format!(
            "unexpected public key prefix 0x{:02x}",
            public_key[0]
        )));
    }
    Ok(VersionedPayload::derive(public_key).to_address())
}

pub fn verify_checksum(address: &str) -> bool {
    VersionedPayload::from_address(address).is_ok()
}

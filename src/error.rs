use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    /// Timeouts, connection resets, TLS failures...
    #[error("transport error: {0}")]
    Transport(Box<dyn std::error::Error + Send + Sync>),

    #[error("HTTP error {0}")]
    HttpStatus(u16),

    #[error("rate limited, gave up after {attempts} attempts")]
    RateLimited { attempts: u32 },

    #[error("invalid balance response: {0}")]
    InvalidResponse(#[from] serde_json::Error),

    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    #[error("address derivation failed: {0}")]
    Derivation(String),

    #[error("cannot append to {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ScanError {
    /// Failures of a single balance lookup; they never stop a worker.
    pub fn is_transient_network(&self) -> bool {
        matches!(
            self,
            Self::Transport(_)
                | Self::HttpStatus(_)
                | Self::RateLimited { .. }
                | Self::InvalidResponse(_)
        )
    }
}

impl From<reqwest::Error> for ScanError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(Box::new(value))
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Base58DecodeError {
    #[error("invalid base58 character {character:?} at position {position}")]
    InvalidCharacter { character: char, position: usize },

    #[error("expected {expected} decoded bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("checksum mismatch")]
    ChecksumMismatch,
}

pub type Result<T> = std::result::Result<T, ScanError>;

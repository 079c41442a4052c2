//! Nonce generation for rendered views

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::RngCore;
use serde::Deserialize;

/// Random bytes drawn when no size is configured
pub const DEFAULT_NONCE_SIZE: usize = 16;

/// Largest nonce size accepted, in random bytes
pub const MAX_NONCE_SIZE: usize = 1024;

/// Configured nonce size above `MAX_NONCE_SIZE`
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("nonce size {0} exceeds the maximum of {MAX_NONCE_SIZE} bytes")]
pub struct NonceSizeError(pub f64);

/// Whether rendered views receive a `nonce` local, and how large it is
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawNoncePolicy")]
pub enum NoncePolicy {
    #[default]
    Disabled,
    /// Generator default size
    Default,
    /// Target size in random bytes
    Size(usize),
}

impl NoncePolicy {
    /// Fractional sizes are truncated; zero, negative and NaN are off
    pub fn from_number(size: f64) -> Result<Self, NonceSizeError> {
        let truncated = size.trunc();
        if truncated.is_nan() || truncated < 1.0 {
            return Ok(Self::Disabled);
        }
        #[allow(clippy::cast_precision_loss)]
        let max = MAX_NONCE_SIZE as f64;
        if truncated > max {
            return Err(NonceSizeError(size));
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let bytes = truncated as usize;
        Ok(Self::Size(bytes))
    }

    pub const fn is_enabled(self) -> bool {
        !matches!(self, Self::Disabled)
    }

    pub const fn size(self) -> Option<usize> {
        match self {
            Self::Size(size) => Some(size),
            Self::Disabled | Self::Default => None,
        }
    }
}

/// `nonce = true`, `nonce = false` or `nonce = 24`
#[derive(Deserialize)]
#[serde(untagged)]
enum RawNoncePolicy {
    Flag(bool),
    Size(f64),
}

impl TryFrom<RawNoncePolicy> for NoncePolicy {
    type Error = NonceSizeError;

    fn try_from(raw: RawNoncePolicy) -> Result<Self, Self::Error> {
        match raw {
            RawNoncePolicy::Flag(false) => Ok(Self::Disabled),
            RawNoncePolicy::Flag(true) => Ok(Self::Default),
            RawNoncePolicy::Size(size) => Self::from_number(size),
        }
    }
}

/// Source of nonce values
pub trait NonceSource: Send + Sync {
    fn generate(&self, size: Option<usize>) -> String;
}

/// Thread-local CSPRNG bytes, base64 encoded
///
/// Sizes above `MAX_NONCE_SIZE` are clamped to it.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomNonce;

impl NonceSource for RandomNonce {
    fn generate(&self, size: Option<usize>) -> String {
        let size = size.unwrap_or(DEFAULT_NONCE_SIZE).min(MAX_NONCE_SIZE);
        let mut bytes = vec![0_u8; size];
        rand::rng().fill_bytes(&mut bytes);
        STANDARD.encode(bytes)
    }
}

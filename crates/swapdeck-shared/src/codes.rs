//! Swap verification codes.
//!
//! Each offer carries two codes generated at creation: one the local user
//! shows the counterpart, one the counterpart is expected to present. The
//! codes gate different parties, so a collision between them is harmless.
//! Codes are fixed for the lifetime of the offer and compared, never
//! recomputed.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Number of decimal digits in a swap code.
pub const CODE_LEN: usize = 4;

/// A 4-digit verification code, e.g. `"0427"`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct SwapCode(String);

impl SwapCode {
    /// Generate a fresh random code.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(format!("{:04}", rng.gen_range(0..10_000)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Exact string equality over the 4 digits.
    pub fn matches(&self, entered: &str) -> bool {
        self.0 == entered
    }
}

impl std::str::FromStr for SwapCode {
    type Err = CodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != CODE_LEN {
            return Err(CodeError::BadLength(s.len()));
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CodeError::NonDigit);
        }
        Ok(Self(s.to_string()))
    }
}

impl std::fmt::Display for SwapCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CodeError {
    #[error("code must be exactly {CODE_LEN} digits, got {0} characters")]
    BadLength(usize),

    #[error("code may only contain decimal digits")]
    NonDigit,
}

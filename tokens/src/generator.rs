//! Token value generation.
//!
//! Token values are the only secret in this crate: anybody holding one can
//! act as its principal for that purpose. They are drawn from the operating
//! system's CSPRNG and encoded as unpadded base64url so they can travel in
//! links and headers without escaping.

use crate::error::{Result, TokenError};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use rand::rngs::OsRng;

/// Produces unguessable token values.
pub trait TokenGenerator: Send + Sync {
    /// Generate a token from `byte_length` random bytes.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::EntropySourceUnavailable`] if the random source
    /// cannot be read. This is not retried.
    fn generate(&self, byte_length: usize) -> Result<String>;
}

/// Generator backed by [`OsRng`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRngGenerator;

impl OsRngGenerator {
    /// Create a generator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl TokenGenerator for OsRngGenerator {
    fn generate(&self, byte_length: usize) -> Result<String> {
        let mut random_bytes = vec![0u8; byte_length];
        OsRng.try_fill_bytes(&mut random_bytes).map_err(|e| {
            tracing::error!(error = %e, "OS random source failed");
            TokenError::EntropySourceUnavailable(e.to_string())
        })?;
        Ok(URL_SAFE_NO_PAD.encode(random_bytes))
    }
}

/// Decode a token value back into its random bytes.
///
/// Returns `None` for values that are not unpadded base64url.
#[must_use]
pub fn decode_token(value: &str) -> Option<Vec<u8>> {
    URL_SAFE_NO_PAD.decode(value).ok()
}

/// Upper bound on the length of a presented token value.
pub const MAX_TOKEN_LEN: usize = 512;

/// Cheap syntactic check run before any store lookup.
///
/// Anything this rejects can never have been produced by a generator, so it
/// is safe to answer "invalid" without a round-trip.
#[must_use]
pub fn is_well_formed(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_TOKEN_LEN
        && value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

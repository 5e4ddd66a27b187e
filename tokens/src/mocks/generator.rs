//! Generator whose entropy source is gone.

use crate::error::{Result, TokenError};
use crate::generator::TokenGenerator;

/// Always fails with [`TokenError::EntropySourceUnavailable`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingGenerator;

impl TokenGenerator for FailingGenerator {
    fn generate(&self, _byte_length: usize) -> Result<String> {
        Err(TokenError::EntropySourceUnavailable(
            "mock entropy source closed".to_string(),
        ))
    }
}

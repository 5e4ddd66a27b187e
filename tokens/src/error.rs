//! Error types for credential token operations.

use thiserror::Error;

/// Result type alias for token operations.
pub type Result<T> = std::result::Result<T, TokenError>;

/// Error taxonomy for issuing, storing and validating credential tokens.
///
/// Callers should treat [`TokenError::InvalidOrExpiredToken`] as the only
/// expected, user-facing failure. Everything else is either a programmer
/// error or an infrastructure problem.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    // ═══════════════════════════════════════════════════════════
    // Validation Errors
    // ═══════════════════════════════════════════════════════════

    /// Token is unknown, expired, consumed or revoked.
    ///
    /// The reason is deliberately not exposed so that callers cannot
    /// learn anything about which token values exist.
    #[error("Token invalid or expired")]
    InvalidOrExpiredToken,

    // ═══════════════════════════════════════════════════════════
    // Programmer Errors
    // ═══════════════════════════════════════════════════════════

    /// Principal identifier is empty or blank.
    #[error("Invalid principal: {0}")]
    InvalidPrincipal(String),

    /// Token policy is unusable (zero length, non-positive TTL).
    #[error("Invalid token configuration: {0}")]
    InvalidConfig(String),

    // ═══════════════════════════════════════════════════════════
    // System Errors
    // ═══════════════════════════════════════════════════════════

    /// The secure random source could not be read.
    #[error("Entropy source unavailable: {0}")]
    EntropySourceUnavailable(String),

    /// The backing store failed or did not answer within its deadline.
    #[error("Token store unavailable: {0}")]
    StoreUnavailable(String),
}

impl TokenError {
    /// Returns `true` if the operation may succeed when retried later.
    ///
    /// # Examples
    ///
    /// ```
    /// # use composable_rust_tokens::TokenError;
    /// assert!(TokenError::StoreUnavailable("timeout".into()).is_transient());
    /// assert!(!TokenError::InvalidOrExpiredToken.is_transient());
    /// ```
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }

    /// Returns `true` if this error is caused by the presented token.
    ///
    /// # Examples
    ///
    /// ```
    /// # use composable_rust_tokens::TokenError;
    /// assert!(TokenError::InvalidOrExpiredToken.is_user_error());
    /// assert!(!TokenError::EntropySourceUnavailable("os".into()).is_user_error());
    /// ```
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(self, Self::InvalidOrExpiredToken)
    }
}

impl From<redis::RedisError> for TokenError {
    fn from(err: redis::RedisError) -> Self {
        Self::StoreUnavailable(err.to_string())
    }
}

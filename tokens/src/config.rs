//! Token policy configuration.
//!
//! Each [`TokenPurpose`] gets its own [`PurposePolicy`] (token length and
//! time-to-live). Values should be provided by the application; the defaults
//! match the lifetimes used for email links and long-lived refresh tokens.

use crate::error::{Result, TokenError};
use crate::purpose::TokenPurpose;
use chrono::Duration;

/// Length and lifetime of tokens for one purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurposePolicy {
    /// Number of random bytes behind each token value.
    pub byte_length: usize,

    /// Time-to-live, fixed at issuance.
    pub ttl: Duration,
}

impl PurposePolicy {
    /// Create a policy.
    #[must_use]
    pub const fn new(byte_length: usize, ttl: Duration) -> Self {
        Self { byte_length, ttl }
    }

    fn validate(&self, purpose: TokenPurpose) -> Result<()> {
        if self.byte_length == 0 {
            return Err(TokenError::InvalidConfig(format!(
                "{purpose}: byte length must be positive"
            )));
        }
        if self.ttl <= Duration::zero() {
            return Err(TokenError::InvalidConfig(format!(
                "{purpose}: ttl must be positive"
            )));
        }
        Ok(())
    }
}

/// Credential token configuration.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Email verification tokens.
    ///
    /// Default: 6 bytes, 5 minutes
    pub verification: PurposePolicy,

    /// Password reset tokens.
    ///
    /// Default: 6 bytes, 5 minutes
    pub reset: PurposePolicy,

    /// Session refresh tokens.
    ///
    /// Default: 32 bytes, 7 days
    pub refresh: PurposePolicy,

    /// Deadline applied to every store operation.
    ///
    /// A store call that exceeds it fails with
    /// [`TokenError::StoreUnavailable`]. `None` waits indefinitely.
    ///
    /// Default: 2 seconds
    pub store_timeout: Option<std::time::Duration>,
}

impl TokenConfig {
    /// Create configuration with default policies.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            verification: PurposePolicy::new(6, Duration::seconds(300)),
            reset: PurposePolicy::new(6, Duration::seconds(300)),
            refresh: PurposePolicy::new(32, Duration::days(7)),
            store_timeout: Some(std::time::Duration::from_secs(2)),
        }
    }

    /// Policy for a purpose.
    #[must_use]
    pub const fn policy(&self, purpose: TokenPurpose) -> PurposePolicy {
        match purpose {
            TokenPurpose::EmailVerification => self.verification,
            TokenPurpose::PasswordReset => self.reset,
            TokenPurpose::SessionRefresh => self.refresh,
        }
    }

    /// Replace the policy for a purpose.
    #[must_use]
    pub const fn with_policy(mut self, purpose: TokenPurpose, policy: PurposePolicy) -> Self {
        match purpose {
            TokenPurpose::EmailVerification => self.verification = policy,
            TokenPurpose::PasswordReset => self.reset = policy,
            TokenPurpose::SessionRefresh => self.refresh = policy,
        }
        self
    }

    /// Set verification token time-to-live.
    #[must_use]
    pub const fn with_verification_ttl(mut self, ttl: Duration) -> Self {
        self.verification.ttl = ttl;
        self
    }

    /// Set password reset token time-to-live.
    #[must_use]
    pub const fn with_reset_ttl(mut self, ttl: Duration) -> Self {
        self.reset.ttl = ttl;
        self
    }

    /// Set refresh token time-to-live.
    #[must_use]
    pub const fn with_refresh_ttl(mut self, ttl: Duration) -> Self {
        self.refresh.ttl = ttl;
        self
    }

    /// Set refresh token length in bytes.
    #[must_use]
    pub const fn with_refresh_length(mut self, byte_length: usize) -> Self {
        self.refresh.byte_length = byte_length;
        self
    }

    /// Set the per-operation store deadline.
    #[must_use]
    pub const fn with_store_timeout(mut self, timeout: Option<std::time::Duration>) -> Self {
        self.store_timeout = timeout;
        self
    }

    /// Check every policy.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidConfig`] if any purpose has a zero byte
    /// length or a non-positive TTL.
    pub fn validate(&self) -> Result<()> {
        for purpose in TokenPurpose::ALL {
            self.policy(purpose).validate(purpose)?;
        }
        Ok(())
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TokenConfig::default();

        assert_eq!(config.verification, PurposePolicy::new(6, Duration::seconds(300)));
        assert_eq!(config.reset, PurposePolicy::new(6, Duration::seconds(300)));
        assert_eq!(config.refresh.byte_length, 32);
        assert_eq!(config.refresh.ttl, Duration::days(7));
        assert_eq!(config.store_timeout, Some(std::time::Duration::from_secs(2)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = TokenConfig::new()
            .with_verification_ttl(Duration::minutes(15))
            .with_reset_ttl(Duration::minutes(10))
            .with_refresh_ttl(Duration::hours(12))
            .with_refresh_length(64)
            .with_store_timeout(None);

        assert_eq!(config.policy(TokenPurpose::EmailVerification).ttl, Duration::minutes(15));
        assert_eq!(config.policy(TokenPurpose::PasswordReset).ttl, Duration::minutes(10));
        assert_eq!(config.policy(TokenPurpose::SessionRefresh).ttl, Duration::hours(12));
        assert_eq!(config.policy(TokenPurpose::SessionRefresh).byte_length, 64);
        assert_eq!(config.store_timeout, None);
    }

    #[test]
    fn test_with_policy_only_touches_one_purpose() {
        let config = TokenConfig::new()
            .with_policy(TokenPurpose::PasswordReset, PurposePolicy::new(16, Duration::minutes(1)));

        assert_eq!(config.reset, PurposePolicy::new(16, Duration::minutes(1)));
        assert_eq!(config.verification, TokenConfig::new().verification);
    }

    #[test]
    fn test_validate_rejects_zero_length() {
        let config = TokenConfig::new().with_refresh_length(0);
        assert!(matches!(config.validate(), Err(TokenError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_non_positive_ttl() {
        let config = TokenConfig::new().with_reset_ttl(Duration::zero());
        assert!(matches!(config.validate(), Err(TokenError::InvalidConfig(_))));

        let config = TokenConfig::new().with_verification_ttl(Duration::seconds(-1));
        assert!(matches!(config.validate(), Err(TokenError::InvalidConfig(_))));
    }
}

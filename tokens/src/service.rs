//! Token service.
//!
//! The interface offered to account management: one method per lifecycle
//! point (signup verification, password reset, session refresh, logout).
//! Delivery of issued tokens (email, SMS) stays with the caller.
//!
//! # Example
//!
//! ```
//! use composable_rust_tokens::{Principal, TokenConfig, TokenError, TokenService};
//! use composable_rust_tokens::stores::InMemoryTokenStore;
//!
//! # async fn example() -> Result<(), TokenError> {
//! let service = TokenService::new(InMemoryTokenStore::new(), TokenConfig::default())?;
//! let user = Principal::new("u@example.com")?;
//!
//! let reset = service.issue_reset_token(&user).await?;
//! // ... email `reset.value` to the user ...
//!
//! assert_eq!(service.consume_reset_token(&reset.value).await?, user);
//! assert_eq!(
//!     service.consume_reset_token(&reset.value).await,
//!     Err(TokenError::InvalidOrExpiredToken)
//! );
//! # Ok(())
//! # }
//! ```

use crate::config::TokenConfig;
use crate::error::Result;
use crate::generator::{OsRngGenerator, TokenGenerator};
use crate::issuer::TokenIssuer;
use crate::providers::TokenStore;
use crate::purpose::TokenPurpose;
use crate::token::{CredentialToken, Principal};
use crate::validator::TokenValidator;

/// Issues, validates and revokes credential tokens over one shared store.
#[derive(Debug, Clone)]
pub struct TokenService<S, G = OsRngGenerator> {
    issuer: TokenIssuer<S, G>,
    validator: TokenValidator<S>,
}

impl<S: TokenStore + Clone> TokenService<S, OsRngGenerator> {
    /// Create a service using the OS random source.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidConfig`] if `config` does not validate.
    ///
    /// [`TokenError::InvalidConfig`]: crate::TokenError::InvalidConfig
    pub fn new(store: S, config: TokenConfig) -> Result<Self> {
        Self::with_generator(store, OsRngGenerator, config)
    }
}

impl<S: TokenStore + Clone, G: TokenGenerator> TokenService<S, G> {
    /// Create a service with a specific generator.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidConfig`] if `config` does not validate.
    ///
    /// [`TokenError::InvalidConfig`]: crate::TokenError::InvalidConfig
    pub fn with_generator(store: S, generator: G, config: TokenConfig) -> Result<Self> {
        config.validate()?;
        let validator = TokenValidator::new(store.clone(), config.store_timeout);
        let issuer = TokenIssuer::with_generator(store, generator, config);
        Ok(Self { issuer, validator })
    }

    /// Underlying issuer.
    #[must_use]
    pub const fn issuer(&self) -> &TokenIssuer<S, G> {
        &self.issuer
    }

    /// Underlying validator.
    #[must_use]
    pub const fn validator(&self) -> &TokenValidator<S> {
        &self.validator
    }

    // ═══════════════════════════════════════════════════════════════
    // Email verification
    // ═══════════════════════════════════════════════════════════════

    /// Issue an email verification token.
    ///
    /// # Errors
    ///
    /// Fails if no random value can be drawn or the store write fails.
    pub async fn issue_verification_token(&self, principal: &Principal) -> Result<CredentialToken> {
        self.issuer
            .issue(TokenPurpose::EmailVerification, principal)
            .await
    }

    /// Redeem an email verification token (single use).
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidOrExpiredToken`] for unknown, expired or
    /// already used tokens, or a store error.
    ///
    /// [`TokenError::InvalidOrExpiredToken`]: crate::TokenError::InvalidOrExpiredToken
    pub async fn consume_verification_token(&self, value: &str) -> Result<Principal> {
        self.validator
            .validate(TokenPurpose::EmailVerification, value)
            .await
            .map(|token| token.principal)
    }

    // ═══════════════════════════════════════════════════════════════
    // Password reset
    // ═══════════════════════════════════════════════════════════════

    /// Issue a password reset token.
    ///
    /// # Errors
    ///
    /// Fails if no random value can be drawn or the store write fails.
    pub async fn issue_reset_token(&self, principal: &Principal) -> Result<CredentialToken> {
        self.issuer
            .issue(TokenPurpose::PasswordReset, principal)
            .await
    }

    /// Redeem a password reset token (single use).
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidOrExpiredToken`] for unknown, expired or
    /// already used tokens, or a store error.
    ///
    /// [`TokenError::InvalidOrExpiredToken`]: crate::TokenError::InvalidOrExpiredToken
    pub async fn consume_reset_token(&self, value: &str) -> Result<Principal> {
        self.validator
            .validate(TokenPurpose::PasswordReset, value)
            .await
            .map(|token| token.principal)
    }

    // ═══════════════════════════════════════════════════════════════
    // Session refresh
    // ═══════════════════════════════════════════════════════════════

    /// Issue a refresh token.
    ///
    /// The returned token's `remaining_lifetime` is the full refresh TTL.
    ///
    /// # Errors
    ///
    /// Fails if no random value can be drawn or the store write fails.
    pub async fn issue_refresh_token(&self, principal: &Principal) -> Result<CredentialToken> {
        self.issuer
            .issue(TokenPurpose::SessionRefresh, principal)
            .await
    }

    /// Check a refresh token without consuming it.
    ///
    /// Returns a snapshot carrying the principal and the remaining TTL.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidOrExpiredToken`] for unknown, expired or
    /// revoked tokens, or a store error.
    ///
    /// [`TokenError::InvalidOrExpiredToken`]: crate::TokenError::InvalidOrExpiredToken
    pub async fn validate_refresh_token(&self, value: &str) -> Result<CredentialToken> {
        self.validator
            .validate(TokenPurpose::SessionRefresh, value)
            .await
    }

    /// Revoke a refresh token (logout, suspected compromise).
    ///
    /// Revoking an unknown token is a no-op.
    ///
    /// # Errors
    ///
    /// Returns a store error if the deletion could not be performed.
    pub async fn revoke_refresh_token(&self, value: &str) -> Result<()> {
        self.validator
            .revoke(TokenPurpose::SessionRefresh, value)
            .await
    }

    /// Exchange a refresh token for a fresh one.
    ///
    /// The presented token is consumed atomically, then a new token with a
    /// full TTL is issued to the same principal. Refresh tokens are never
    /// extended in place.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidOrExpiredToken`] if the presented token is
    /// not live (including when a concurrent rotation won), or an issuance
    /// error. If issuance fails after consumption the old token stays
    /// consumed and the caller must log in again.
    ///
    /// [`TokenError::InvalidOrExpiredToken`]: crate::TokenError::InvalidOrExpiredToken
    pub async fn rotate_refresh_token(&self, value: &str) -> Result<CredentialToken> {
        let old = self
            .validator
            .consume(TokenPurpose::SessionRefresh, value)
            .await?;

        let fresh = self
            .issuer
            .issue(TokenPurpose::SessionRefresh, &old.principal)
            .await?;

        tracing::info!(purpose = %TokenPurpose::SessionRefresh, "Rotated refresh token");
        Ok(fresh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TokenError;
    use crate::mocks::ManualClock;
    use crate::stores::InMemoryTokenStore;
    use chrono::Duration;

    fn service() -> (TokenService<InMemoryTokenStore<ManualClock>>, ManualClock) {
        let clock = ManualClock::default();
        let store = InMemoryTokenStore::with_clock(clock.clone());
        let config = TokenConfig::default().with_refresh_ttl(Duration::hours(1));
        (TokenService::new(store, config).unwrap(), clock)
    }

    fn user() -> Principal {
        Principal::new("u@example.com").unwrap()
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = TokenConfig::default().with_refresh_length(0);
        assert!(matches!(
            TokenService::new(InMemoryTokenStore::new(), config),
            Err(TokenError::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn test_verification_round_trip() {
        let (service, _) = service();

        let token = service.issue_verification_token(&user()).await.unwrap();
        assert_eq!(service.consume_verification_token(&token.value).await.unwrap(), user());
        assert_eq!(
            service.consume_verification_token(&token.value).await,
            Err(TokenError::InvalidOrExpiredToken)
        );
    }

    #[tokio::test]
    async fn test_reset_token_is_not_a_verification_token() {
        let (service, _) = service();

        let token = service.issue_reset_token(&user()).await.unwrap();
        assert_eq!(
            service.consume_verification_token(&token.value).await,
            Err(TokenError::InvalidOrExpiredToken)
        );
        assert_eq!(service.consume_reset_token(&token.value).await.unwrap(), user());
    }

    #[tokio::test]
    async fn test_refresh_reports_expires_in() {
        let (service, clock) = service();

        let token = service.issue_refresh_token(&user()).await.unwrap();
        assert_eq!(token.expires_in_millis(), 3_600_000);

        clock.advance(Duration::minutes(15));
        let checked = service.validate_refresh_token(&token.value).await.unwrap();
        assert_eq!(checked.principal, user());
        assert_eq!(checked.remaining_lifetime, Duration::minutes(45));
    }

    #[tokio::test]
    async fn test_rotation_replaces_token() {
        let (service, clock) = service();

        let old = service.issue_refresh_token(&user()).await.unwrap();
        clock.advance(Duration::minutes(50));

        let fresh = service.rotate_refresh_token(&old.value).await.unwrap();
        assert_ne!(fresh.value, old.value);
        assert_eq!(fresh.principal, user());
        assert_eq!(fresh.remaining_lifetime, Duration::hours(1));

        assert_eq!(
            service.validate_refresh_token(&old.value).await,
            Err(TokenError::InvalidOrExpiredToken)
        );
        assert_eq!(
            service.rotate_refresh_token(&old.value).await,
            Err(TokenError::InvalidOrExpiredToken)
        );

        // The new token outlives the old one's original expiry
        clock.advance(Duration::minutes(30));
        assert!(service.validate_refresh_token(&fresh.value).await.is_ok());
    }
}

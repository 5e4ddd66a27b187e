//! Token validation and revocation.
//!
//! # Lifecycle
//!
//! ```text
//! Issued ──▶ Valid ──▶ Consumed     (verification, reset: first success)
//!              │ ▲
//!              └─┘                  (refresh: repeatable)
//!              │
//!              ├──▶ Revoked         (explicit revoke)
//!              └──▶ Expired         (TTL elapsed)
//! ```
//!
//! All terminal states answer [`TokenError::InvalidOrExpiredToken`]. They are
//! only told apart in logs.

use crate::deadline::within;
use crate::error::{Result, TokenError};
use crate::generator::is_well_formed;
use crate::providers::TokenStore;
use crate::purpose::{ConsumptionPolicy, TokenKey, TokenPurpose};
use crate::token::CredentialToken;
use chrono::Duration;

/// Resolves presented tokens to principals.
#[derive(Debug, Clone)]
pub struct TokenValidator<S> {
    store: S,
    store_timeout: Option<std::time::Duration>,
}

impl<S: TokenStore> TokenValidator<S> {
    /// Create a validator over `store`.
    #[must_use]
    pub const fn new(store: S, store_timeout: Option<std::time::Duration>) -> Self {
        Self {
            store,
            store_timeout,
        }
    }

    /// Validate a token under its purpose's consumption policy.
    ///
    /// Consuming purposes remove the entry atomically with the lookup and
    /// report zero remaining lifetime. Non-consuming purposes leave the
    /// entry in place and report the store's remaining TTL.
    ///
    /// # Errors
    ///
    /// - [`TokenError::InvalidOrExpiredToken`] if no live entry matches
    /// - [`TokenError::StoreUnavailable`] if the store failed or timed out
    pub async fn validate(&self, purpose: TokenPurpose, value: &str) -> Result<CredentialToken> {
        match purpose.consumption() {
            ConsumptionPolicy::Consuming => self.consume(purpose, value).await,
            ConsumptionPolicy::NonConsuming => self.inspect(purpose, value).await,
        }
    }

    /// Atomically look up and remove a token, whatever its purpose.
    ///
    /// Of several concurrent calls for the same token, at most one succeeds.
    ///
    /// # Errors
    ///
    /// - [`TokenError::InvalidOrExpiredToken`] if no live entry matches
    /// - [`TokenError::StoreUnavailable`] if the store failed or timed out
    pub async fn consume(&self, purpose: TokenPurpose, value: &str) -> Result<CredentialToken> {
        let key = Self::checked_key(purpose, value)?;

        let principal = within(self.store_timeout, "take", self.store.take(&key))
            .await?
            .ok_or_else(|| Self::miss(&key))?;

        tracing::info!(
            purpose = %purpose,
            token = %key.fingerprint(),
            "Token consumed"
        );

        Ok(CredentialToken::new(
            key.into_value(),
            purpose,
            principal,
            Duration::zero(),
        ))
    }

    /// Look up a token without consuming it.
    async fn inspect(&self, purpose: TokenPurpose, value: &str) -> Result<CredentialToken> {
        let key = Self::checked_key(purpose, value)?;

        let principal = within(self.store_timeout, "get", self.store.get(&key))
            .await?
            .ok_or_else(|| Self::miss(&key))?;

        // The entry can lapse between the two reads.
        let remaining = within(
            self.store_timeout,
            "remaining_ttl",
            self.store.remaining_ttl(&key),
        )
        .await?
        .ok_or_else(|| Self::miss(&key))?;

        tracing::debug!(
            purpose = %purpose,
            token = %key.fingerprint(),
            remaining_seconds = remaining.num_seconds(),
            "Token validated"
        );

        Ok(CredentialToken::new(
            key.into_value(),
            purpose,
            principal,
            remaining,
        ))
    }

    /// Revoke a token.
    ///
    /// Idempotent: revoking an unknown, expired or already revoked token
    /// succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::StoreUnavailable`] if the store failed or timed out.
    pub async fn revoke(&self, purpose: TokenPurpose, value: &str) -> Result<()> {
        if !is_well_formed(value) {
            return Ok(());
        }
        let key = TokenKey::new(purpose, value);

        let removed = within(self.store_timeout, "delete", self.store.delete(&key)).await?;

        if removed {
            tracing::info!(
                purpose = %purpose,
                token = %key.fingerprint(),
                "Token revoked"
            );
        } else {
            tracing::debug!(
                purpose = %purpose,
                token = %key.fingerprint(),
                "Token revoke: nothing to remove"
            );
        }
        Ok(())
    }

    fn checked_key(purpose: TokenPurpose, value: &str) -> Result<TokenKey> {
        if is_well_formed(value) {
            Ok(TokenKey::new(purpose, value))
        } else {
            tracing::debug!(purpose = %purpose, "Rejected malformed token value");
            Err(TokenError::InvalidOrExpiredToken)
        }
    }

    fn miss(key: &TokenKey) -> TokenError {
        tracing::debug!(
            purpose = %key.purpose(),
            token = %key.fingerprint(),
            "Token not found"
        );
        TokenError::InvalidOrExpiredToken
    }
}

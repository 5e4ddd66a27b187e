//! Token issuance.
//!
//! # Flow
//!
//! 1. Look up the purpose's policy (length, TTL)
//! 2. Generate a random token value
//! 3. Store `purpose:value → principal` with the policy TTL
//! 4. Return the token to the caller for out-of-band delivery
//!
//! The issuer never delivers tokens and never rolls a write back. If the
//! caller fails to deliver, the entry simply expires. Issuing again for the
//! same principal and purpose creates an additional, independent token.

use crate::config::TokenConfig;
use crate::deadline::within;
use crate::error::Result;
use crate::generator::{OsRngGenerator, TokenGenerator};
use crate::providers::TokenStore;
use crate::purpose::{TokenKey, TokenPurpose};
use crate::token::{CredentialToken, Principal};

/// Creates and persists credential tokens.
#[derive(Debug, Clone)]
pub struct TokenIssuer<S, G = OsRngGenerator> {
    store: S,
    generator: G,
    config: TokenConfig,
}

impl<S: TokenStore> TokenIssuer<S, OsRngGenerator> {
    /// Create an issuer using the OS random source.
    #[must_use]
    pub const fn new(store: S, config: TokenConfig) -> Self {
        Self::with_generator(store, OsRngGenerator, config)
    }
}

impl<S: TokenStore, G: TokenGenerator> TokenIssuer<S, G> {
    /// Create an issuer with a specific generator.
    #[must_use]
    pub const fn with_generator(store: S, generator: G, config: TokenConfig) -> Self {
        Self {
            store,
            generator,
            config,
        }
    }

    /// Issue a token for `principal`.
    ///
    /// # Errors
    ///
    /// - [`TokenError::EntropySourceUnavailable`] if no random value could be drawn
    /// - [`TokenError::StoreUnavailable`] if the write failed or timed out
    ///
    /// [`TokenError::EntropySourceUnavailable`]: crate::TokenError::EntropySourceUnavailable
    /// [`TokenError::StoreUnavailable`]: crate::TokenError::StoreUnavailable
    pub async fn issue(
        &self,
        purpose: TokenPurpose,
        principal: &Principal,
    ) -> Result<CredentialToken> {
        let policy = self.config.policy(purpose);
        let value = self.generator.generate(policy.byte_length)?;
        let key = TokenKey::new(purpose, value);

        within(
            self.config.store_timeout,
            "put",
            self.store.put(&key, principal, policy.ttl),
        )
        .await?;

        tracing::info!(
            purpose = %purpose,
            token = %key.fingerprint(),
            ttl_seconds = policy.ttl.num_seconds(),
            "Issued token"
        );

        Ok(CredentialToken::new(
            key.into_value(),
            purpose,
            principal.clone(),
            policy.ttl,
        ))
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &TokenConfig {
        &self.config
    }
}

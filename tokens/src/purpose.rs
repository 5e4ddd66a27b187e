//! Token purposes and store addressing.
//!
//! Every token belongs to exactly one [`TokenPurpose`]. The purpose decides
//! the storage namespace and whether a successful validation consumes the
//! token. Tokens are addressed in the store by a typed [`TokenKey`], which is
//! only rendered to a namespaced string at the store boundary.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fmt::Write as _;

/// What a token may be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenPurpose {
    /// Proves ownership of an email address after signup.
    EmailVerification,

    /// Authorizes a single password change ("forgot password").
    PasswordReset,

    /// Long-lived token exchanged for new sessions until expiry or logout.
    SessionRefresh,
}

/// What happens to a stored token after a successful validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumptionPolicy {
    /// Single use: the entry is removed atomically with the lookup.
    Consuming,

    /// Reusable: the entry stays until it expires or is revoked.
    NonConsuming,
}

impl TokenPurpose {
    /// All purposes, in declaration order.
    pub const ALL: [Self; 3] = [
        Self::EmailVerification,
        Self::PasswordReset,
        Self::SessionRefresh,
    ];

    /// Storage namespace for this purpose.
    ///
    /// Namespaces never contain `:` so a namespaced key always splits
    /// unambiguously at its first colon.
    #[must_use]
    pub const fn namespace(self) -> &'static str {
        match self {
            Self::EmailVerification => "verificationToken",
            Self::PasswordReset => "resetToken",
            Self::SessionRefresh => "RefreshToken",
        }
    }

    /// Consumption policy for this purpose.
    #[must_use]
    pub const fn consumption(self) -> ConsumptionPolicy {
        match self {
            Self::EmailVerification | Self::PasswordReset => ConsumptionPolicy::Consuming,
            Self::SessionRefresh => ConsumptionPolicy::NonConsuming,
        }
    }

    /// Returns `true` if a successful validation removes the token.
    #[must_use]
    pub const fn is_consuming(self) -> bool {
        matches!(self.consumption(), ConsumptionPolicy::Consuming)
    }
}

impl fmt::Display for TokenPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.namespace())
    }
}

/// Composite store key: a purpose plus the raw token value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenKey {
    purpose: TokenPurpose,
    value: String,
}

impl TokenKey {
    /// Create a key for a token value under a purpose.
    #[must_use]
    pub fn new(purpose: TokenPurpose, value: impl Into<String>) -> Self {
        Self {
            purpose,
            value: value.into(),
        }
    }

    /// Purpose half of the key.
    #[must_use]
    pub const fn purpose(&self) -> TokenPurpose {
        self.purpose
    }

    /// Raw token value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Take the raw token value back.
    #[must_use]
    pub fn into_value(self) -> String {
        self.value
    }

    /// Render the key as `{namespace}:{value}` for the backing store.
    #[must_use]
    pub fn namespaced(&self) -> String {
        format!("{}:{}", self.purpose.namespace(), self.value)
    }

    /// Log-safe identifier for this key.
    ///
    /// First 8 hex characters of the SHA-256 digest of the namespaced key.
    /// Stable across calls, so log lines for one token correlate, but it
    /// reveals nothing about the token value.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.namespaced().as_bytes());
        digest
            .iter()
            .take(4)
            .fold(String::with_capacity(8), |mut out, byte| {
                let _ = write!(out, "{byte:02x}");
                out
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_namespaces_are_distinct() {
        let namespaces: HashSet<_> = TokenPurpose::ALL.iter().map(|p| p.namespace()).collect();
        assert_eq!(namespaces.len(), TokenPurpose::ALL.len());
        assert!(namespaces.iter().all(|ns| !ns.contains(':')));
    }

    #[test]
    fn test_consumption_policies() {
        assert!(TokenPurpose::EmailVerification.is_consuming());
        assert!(TokenPurpose::PasswordReset.is_consuming());
        assert!(!TokenPurpose::SessionRefresh.is_consuming());
        assert_eq!(
            TokenPurpose::SessionRefresh.consumption(),
            ConsumptionPolicy::NonConsuming
        );
    }

    #[test]
    fn test_same_value_different_purpose_is_different_key() {
        let reset = TokenKey::new(TokenPurpose::PasswordReset, "abc");
        let verify = TokenKey::new(TokenPurpose::EmailVerification, "abc");

        assert_ne!(reset, verify);
        assert_ne!(reset.namespaced(), verify.namespaced());
        assert_eq!(reset.namespaced(), "resetToken:abc");
    }

    #[test]
    fn test_fingerprint_is_short_hex_digest() {
        let key = TokenKey::new(TokenPurpose::PasswordReset, "q8Yx3kLm");
        let fingerprint = key.fingerprint();

        assert_eq!(fingerprint.len(), 8);
        assert!(fingerprint.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(fingerprint, key.fingerprint(), "Fingerprint must be stable");
        assert_eq!(TokenKey::new(TokenPurpose::SessionRefresh, "").fingerprint().len(), 8);
    }

    #[test]
    fn test_fingerprint_does_not_reveal_token_value() {
        for value in ["q8Yx3kLm", "abcdefgh", "0123abcd", "deadbeefcafe"] {
            let key = TokenKey::new(TokenPurpose::PasswordReset, value);
            let fingerprint = key.fingerprint();

            assert!(!value.starts_with(&fingerprint));
            assert!(!value.contains(&fingerprint));
        }
    }

    #[test]
    fn test_fingerprint_differs_per_purpose() {
        let reset = TokenKey::new(TokenPurpose::PasswordReset, "q8Yx3kLm");
        let verify = TokenKey::new(TokenPurpose::EmailVerification, "q8Yx3kLm");
        assert_ne!(reset.fingerprint(), verify.fingerprint());
    }
}

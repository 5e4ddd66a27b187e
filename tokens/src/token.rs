//! Principal and credential token value types.

use crate::error::{Result, TokenError};
use crate::purpose::{TokenKey, TokenPurpose};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable external identifier of an account (email address, account id).
///
/// Opaque to this crate; the only rule is that it is not blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    /// Wrap an account identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidPrincipal`] if the identifier is empty
    /// or whitespace only.
    ///
    /// # Examples
    ///
    /// ```
    /// use composable_rust_tokens::Principal;
    ///
    /// assert!(Principal::new("u@example.com").is_ok());
    /// assert!(Principal::new("   ").is_err());
    /// ```
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(TokenError::InvalidPrincipal(
                "principal must not be blank".to_string(),
            ));
        }
        Ok(Self(id))
    }

    /// Borrow the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Take the identifier back.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for Principal {
    type Error = TokenError;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<String> for Principal {
    type Error = TokenError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

/// Snapshot of an issued or validated token.
///
/// The store is the source of truth; this value only describes the binding
/// at the moment it was produced. `remaining_lifetime` is zero for a token
/// that was consumed by the operation that returned it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialToken {
    /// Raw secret handed to the holder.
    pub value: String,

    /// What the token may be used for.
    pub purpose: TokenPurpose,

    /// Account the token is bound to.
    pub principal: Principal,

    /// Time left before the store forgets the token.
    #[serde(with = "duration_millis")]
    pub remaining_lifetime: Duration,
}

impl CredentialToken {
    /// Create a token snapshot.
    #[must_use]
    pub const fn new(
        value: String,
        purpose: TokenPurpose,
        principal: Principal,
        remaining_lifetime: Duration,
    ) -> Self {
        Self {
            value,
            purpose,
            principal,
            remaining_lifetime,
        }
    }

    /// Store key of this token.
    #[must_use]
    pub fn key(&self) -> TokenKey {
        TokenKey::new(self.purpose, self.value.clone())
    }

    /// Remaining lifetime in milliseconds, clamped at zero.
    #[must_use]
    pub fn expires_in_millis(&self) -> u64 {
        u64::try_from(self.remaining_lifetime.num_milliseconds()).unwrap_or(0)
    }
}

mod duration_millis {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(value.num_milliseconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        i64::deserialize(deserializer).map(Duration::milliseconds)
    }
}

//! Redis-based token store implementation.
//!
//! # Architecture
//!
//! Tokens are stored in Redis with:
//! - **Key**: `[{prefix}:]{namespace}:{value}` where the namespace comes from
//!   the token purpose (`verificationToken`, `resetToken`, `RefreshToken`)
//! - **Value**: the principal identifier as a plain string
//! - **TTL**: Redis-native expiry in milliseconds, set in the same command
//!   as the value
//!
//! # Commands
//!
//! | Operation       | Command        |
//! |-----------------|----------------|
//! | `put`           | `SET .. PX ..` |
//! | `get`           | `GET`          |
//! | `remaining_ttl` | `PTTL`         |
//! | `take`          | `GETDEL`       |
//! | `delete`        | `DEL`          |
//!
//! `GETDEL` fetches and deletes in one command, so concurrent consumers of
//! the same token cannot both succeed. Redis never returns a key past its
//! expiry, so reads need no extra expiry check.
//!
//! # Example
//!
//! ```no_run
//! use composable_rust_tokens::stores::RedisTokenStore;
//! use composable_rust_tokens::providers::TokenStore;
//! use composable_rust_tokens::{Principal, TokenKey, TokenPurpose};
//! use chrono::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = RedisTokenStore::new("redis://127.0.0.1:6379").await?;
//! let key = TokenKey::new(TokenPurpose::EmailVerification, "q8Yx3kLm");
//!
//! store.put(&key, &Principal::new("u@example.com")?, Duration::minutes(5)).await?;
//! if let Some(principal) = store.take(&key).await? {
//!     println!("verified {principal}");
//! }
//! # Ok(())
//! # }
//! ```

use crate::error::{Result, TokenError};
use crate::providers::TokenStore;
use crate::purpose::TokenKey;
use crate::token::Principal;
use chrono::Duration;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

/// `PTTL` reply for a key that does not exist.
const PTTL_MISSING: i64 = -2;

/// `PTTL` reply for a key without expiry.
const PTTL_PERSISTENT: i64 = -1;

/// `Redis`-based token store.
///
/// # Thread Safety
///
/// This type is `Clone` and can be safely shared across threads.
/// Each clone shares the same `ConnectionManager` (connection pool).
#[derive(Clone)]
pub struct RedisTokenStore {
    /// Connection manager for connection pooling.
    conn_manager: ConnectionManager,

    /// Optional prefix for every key, for shared `Redis` instances.
    key_prefix: Option<String>,
}

impl RedisTokenStore {
    /// Create a new `Redis` token store.
    ///
    /// # Arguments
    ///
    /// * `redis_url` - `Redis` connection URL (e.g., "<redis://127.0.0.1:6379>")
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::StoreUnavailable`] if the URL is malformed or
    /// the connection cannot be established.
    pub async fn new(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url).map_err(|e| {
            TokenError::StoreUnavailable(format!("Failed to create Redis client: {e}"))
        })?;

        let conn_manager = ConnectionManager::new(client).await.map_err(|e| {
            TokenError::StoreUnavailable(format!(
                "Failed to create Redis connection manager: {e}"
            ))
        })?;

        tracing::info!("RedisTokenStore initialized successfully");

        Ok(Self {
            conn_manager,
            key_prefix: None,
        })
    }

    /// Prefix every key with `{prefix}:`.
    #[must_use]
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    /// Get the `Redis` key for a token.
    fn redis_key(&self, key: &TokenKey) -> String {
        redis_key(self.key_prefix.as_deref(), key)
    }
}

fn redis_key(prefix: Option<&str>, key: &TokenKey) -> String {
    match prefix {
        Some(prefix) => format!("{prefix}:{}", key.namespaced()),
        None => key.namespaced(),
    }
}

fn millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.num_milliseconds()).unwrap_or(0).max(1)
}

fn stored_principal(raw: Option<String>) -> Result<Option<Principal>> {
    raw.map(|raw| {
        Principal::new(raw).map_err(|_| {
            TokenError::StoreUnavailable("Redis returned a blank principal".to_string())
        })
    })
    .transpose()
}

impl TokenStore for RedisTokenStore {
    async fn put(&self, key: &TokenKey, principal: &Principal, ttl: Duration) -> Result<()> {
        let mut conn = self.conn_manager.clone();
        let redis_key = self.redis_key(key);
        let ttl_millis = millis(ttl);

        // SET with PX: value and expiry in one command
        let _: () = conn
            .pset_ex(&redis_key, principal.as_str(), ttl_millis)
            .await
            .map_err(|e| TokenError::StoreUnavailable(format!("Failed to store token: {e}")))?;

        tracing::debug!(
            purpose = %key.purpose(),
            token = %key.fingerprint(),
            ttl_millis = ttl_millis,
            "Stored token in Redis"
        );

        Ok(())
    }

    async fn get(&self, key: &TokenKey) -> Result<Option<Principal>> {
        let mut conn = self.conn_manager.clone();

        let raw: Option<String> = conn
            .get(self.redis_key(key))
            .await
            .map_err(|e| TokenError::StoreUnavailable(format!("Failed to read token: {e}")))?;

        stored_principal(raw)
    }

    async fn remaining_ttl(&self, key: &TokenKey) -> Result<Option<Duration>> {
        let mut conn = self.conn_manager.clone();

        let pttl: i64 = conn.pttl(self.redis_key(key)).await.map_err(|e| {
            TokenError::StoreUnavailable(format!("Failed to read token TTL: {e}"))
        })?;

        match pttl {
            PTTL_MISSING => Ok(None),
            PTTL_PERSISTENT => {
                // Every token is written with PX, so this key was altered outside this store.
                tracing::warn!(
                    purpose = %key.purpose(),
                    token = %key.fingerprint(),
                    "Token key has no expiry, treating as invalid"
                );
                Ok(None)
            }
            millis => Ok(Some(Duration::milliseconds(millis))),
        }
    }

    async fn take(&self, key: &TokenKey) -> Result<Option<Principal>> {
        let mut conn = self.conn_manager.clone();

        // GETDEL is atomic: of several concurrent callers exactly one sees the value
        let raw: Option<String> = conn
            .get_del(self.redis_key(key))
            .await
            .map_err(|e| TokenError::StoreUnavailable(format!("Failed to consume token: {e}")))?;

        if raw.is_none() {
            tracing::debug!(
                purpose = %key.purpose(),
                token = %key.fingerprint(),
                "Token not found (consumed, expired, revoked or never issued)"
            );
        }

        stored_principal(raw)
    }

    async fn delete(&self, key: &TokenKey) -> Result<bool> {
        let mut conn = self.conn_manager.clone();

        let deleted: i64 = conn.del(self.redis_key(key)).await.map_err(|e| {
            TokenError::StoreUnavailable(format!("Failed to delete token from Redis: {e}"))
        })?;

        Ok(deleted > 0)
    }
}

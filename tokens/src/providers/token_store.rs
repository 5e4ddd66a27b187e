//! Token store trait.
//!
//! This module defines the trait for TTL-backed storage of credential tokens.
//! Every entry maps a [`TokenKey`] (purpose + value) to the [`Principal`] it
//! was issued for and disappears on its own once its TTL elapses.

use crate::error::Result;
use crate::purpose::TokenKey;
use crate::token::Principal;
use chrono::Duration;

/// Token store.
///
/// This trait abstracts over ephemeral token storage with atomic
/// single-use semantics.
///
/// # Implementation Notes
///
/// - Entries expire `ttl` after `put`; reads never extend the TTL
/// - Expiry is enforced at read time even if the backend has not yet
///   evicted the entry
/// - **CRITICAL**: `take()` MUST be atomic (`Redis` GETDEL, a single mutex
///   critical section, `DELETE ... RETURNING`)
/// - Implementations must be safe to share between tasks without any
///   locking by the caller
///
/// # Errors
///
/// Backend failures surface as [`TokenError::StoreUnavailable`] and must
/// never be reported as an absent entry.
///
/// [`TokenError::StoreUnavailable`]: crate::TokenError::StoreUnavailable
pub trait TokenStore: Send + Sync {
    /// Create or overwrite an entry that expires after `ttl`.
    ///
    /// # Errors
    ///
    /// Returns error if the storage operation fails.
    fn put(
        &self,
        key: &TokenKey,
        principal: &Principal,
        ttl: Duration,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Look up the principal bound to a live entry.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(principal))`: entry exists and has not expired
    /// - `Ok(None)`: entry absent or expired
    ///
    /// # Errors
    ///
    /// Returns error if the storage operation fails.
    fn get(
        &self,
        key: &TokenKey,
    ) -> impl std::future::Future<Output = Result<Option<Principal>>> + Send;

    /// Time left before a live entry expires.
    ///
    /// # Errors
    ///
    /// Returns error if the storage operation fails.
    fn remaining_ttl(
        &self,
        key: &TokenKey,
    ) -> impl std::future::Future<Output = Result<Option<Duration>>> + Send;

    /// Atomically read and delete a live entry.
    ///
    /// If several callers race on the same key, at most one receives
    /// `Some`. The others observe `None`.
    ///
    /// # Errors
    ///
    /// Returns error if the storage operation fails.
    fn take(
        &self,
        key: &TokenKey,
    ) -> impl std::future::Future<Output = Result<Option<Principal>>> + Send;

    /// Remove an entry.
    ///
    /// Idempotent: deleting an absent key is not an error.
    ///
    /// # Returns
    ///
    /// `true` if a live entry was removed.
    ///
    /// # Errors
    ///
    /// Returns error if the storage operation fails.
    fn delete(
        &self,
        key: &TokenKey,
    ) -> impl std::future::Future<Output = Result<bool>> + Send;
}

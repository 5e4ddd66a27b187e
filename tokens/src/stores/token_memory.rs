//! In-memory token store implementation.
//!
//! Entries live in a mutex-protected map shared by every clone of the store.
//! Expiry is checked against an injected [`Clock`] on every read, so an
//! expired entry is never returned even if no sweep has run yet. Sweeping
//! only reclaims memory.
//!
//! Entries that are never read again (an undelivered verification email, for
//! instance) are reclaimed in two ways. Every [`PUT_SWEEP_INTERVAL`]th write
//! sweeps the whole map under the same lock, which bounds growth by the
//! write rate. Long-running services with bursty writes should also run
//! [`InMemoryTokenStore::spawn_sweeper`].
//!
//! # Example
//!
//! ```
//! use composable_rust_tokens::stores::InMemoryTokenStore;
//! use composable_rust_tokens::providers::TokenStore;
//! use composable_rust_tokens::{Principal, TokenKey, TokenPurpose};
//! use chrono::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = InMemoryTokenStore::new();
//! let key = TokenKey::new(TokenPurpose::PasswordReset, "q8Yx3kLm");
//! let principal = Principal::new("u@example.com")?;
//!
//! store.put(&key, &principal, Duration::minutes(5)).await?;
//! assert_eq!(store.take(&key).await?, Some(principal));
//! assert_eq!(store.take(&key).await?, None);
//! # Ok(())
//! # }
//! ```

use crate::environment::{Clock, SystemClock};
use crate::error::{Result, TokenError};
use crate::providers::TokenStore;
use crate::purpose::TokenKey;
use crate::token::Principal;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Number of writes between opportunistic sweeps.
pub const PUT_SWEEP_INTERVAL: usize = 64;

/// A stored binding from token key to principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEntry {
    /// Account the token was issued for.
    pub principal: Principal,

    /// Instant after which the entry is dead.
    pub expires_at: DateTime<Utc>,
}

impl StoredEntry {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

type Entries = HashMap<TokenKey, StoredEntry>;

fn retain_live(entries: &mut Entries, now: DateTime<Utc>) -> usize {
    let before = entries.len();
    entries.retain(|_, entry| entry.is_live(now));
    before - entries.len()
}

/// In-memory token store with read-time expiry.
///
/// # Thread Safety
///
/// Clones share the same map and clock. Every operation runs inside one
/// critical section, which is what makes [`TokenStore::take`] atomic.
///
/// # Memory
///
/// Expired entries are dropped when read, on every
/// [`PUT_SWEEP_INTERVAL`]th [`put`](TokenStore::put), and by
/// [`sweep`](Self::sweep). For a store that outlives a request burst, start
/// [`spawn_sweeper`](Self::spawn_sweeper) as well.
pub struct InMemoryTokenStore<C: Clock = SystemClock> {
    entries: Arc<Mutex<Entries>>,
    puts: Arc<AtomicUsize>,
    clock: Arc<C>,
}

impl InMemoryTokenStore<SystemClock> {
    /// Create an empty store on the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for InMemoryTokenStore<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> Clone for InMemoryTokenStore<C> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            puts: Arc::clone(&self.puts),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<C: Clock> std::fmt::Debug for InMemoryTokenStore<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryTokenStore").finish_non_exhaustive()
    }
}

impl<C: Clock> InMemoryTokenStore<C> {
    /// Create an empty store that reads time from `clock`.
    #[must_use]
    pub fn with_clock(clock: C) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            puts: Arc::new(AtomicUsize::new(0)),
            clock: Arc::new(clock),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Entries>> {
        self.entries.lock().map_err(|_| {
            TokenError::StoreUnavailable("in-memory token store lock poisoned".to_string())
        })
    }

    /// Remove `key` if it has expired, returning the live entry otherwise.
    fn live_entry<'a>(
        entries: &'a mut Entries,
        key: &TokenKey,
        now: DateTime<Utc>,
    ) -> Option<&'a StoredEntry> {
        let expired = entries.get(key).is_some_and(|entry| !entry.is_live(now));
        if expired {
            entries.remove(key);
            tracing::warn!(
                purpose = %key.purpose(),
                token = %key.fingerprint(),
                "Token expired"
            );
            return None;
        }
        entries.get(key)
    }

    /// Drop every expired entry.
    ///
    /// # Returns
    ///
    /// Number of entries removed.
    ///
    /// # Errors
    ///
    /// Returns error if the store lock is poisoned.
    pub fn sweep(&self) -> Result<usize> {
        let now = self.clock.now();
        let removed = retain_live(&mut *self.lock()?, now);

        if removed > 0 {
            tracing::debug!(removed = removed, "Swept expired tokens");
        }
        Ok(removed)
    }

    /// Number of live entries.
    ///
    /// # Errors
    ///
    /// Returns error if the store lock is poisoned.
    pub fn len(&self) -> Result<usize> {
        let now = self.clock.now();
        let entries = self.lock()?;
        Ok(entries.values().filter(|entry| entry.is_live(now)).count())
    }

    /// Returns `true` if no live entry exists.
    ///
    /// # Errors
    ///
    /// Returns error if the store lock is poisoned.
    pub fn is_empty(&self) -> Result<bool> {
        self.len().map(|len| len == 0)
    }
}

impl<C: Clock + 'static> InMemoryTokenStore<C> {
    /// Run [`sweep`](Self::sweep) every `period` on the current tokio runtime.
    ///
    /// The task runs until aborted through the returned handle.
    #[must_use]
    pub fn spawn_sweeper(&self, period: std::time::Duration) -> tokio::task::JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if let Err(e) = store.sweep() {
                    tracing::error!(error = %e, "Token sweep failed");
                }
            }
        })
    }
}

impl<C: Clock> TokenStore for InMemoryTokenStore<C> {
    async fn put(&self, key: &TokenKey, principal: &Principal, ttl: Duration) -> Result<()> {
        let now = self.clock.now();
        let mut entries = self.lock()?;
        entries.insert(
            key.clone(),
            StoredEntry {
                principal: principal.clone(),
                expires_at: now + ttl,
            },
        );

        let writes = self.puts.fetch_add(1, Ordering::Relaxed) + 1;
        if writes % PUT_SWEEP_INTERVAL == 0 {
            let removed = retain_live(&mut entries, now);
            if removed > 0 {
                tracing::debug!(removed = removed, "Swept expired tokens on write");
            }
        }
        Ok(())
    }

    async fn get(&self, key: &TokenKey) -> Result<Option<Principal>> {
        let now = self.clock.now();
        let mut entries = self.lock()?;
        Ok(Self::live_entry(&mut entries, key, now).map(|entry| entry.principal.clone()))
    }

    async fn remaining_ttl(&self, key: &TokenKey) -> Result<Option<Duration>> {
        let now = self.clock.now();
        let mut entries = self.lock()?;
        Ok(Self::live_entry(&mut entries, key, now).map(|entry| entry.expires_at - now))
    }

    async fn take(&self, key: &TokenKey) -> Result<Option<Principal>> {
        let now = self.clock.now();
        let mut entries = self.lock()?;

        // Check and removal happen under the same guard.
        if Self::live_entry(&mut entries, key, now).is_none() {
            return Ok(None);
        }
        Ok(entries.remove(key).map(|entry| entry.principal))
    }

    async fn delete(&self, key: &TokenKey) -> Result<bool> {
        let now = self.clock.now();
        let mut entries = self.lock()?;
        Ok(entries
            .remove(key)
            .is_some_and(|entry| entry.is_live(now)))
    }
}

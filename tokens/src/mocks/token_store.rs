//! Broken token stores for failure-path tests.

use crate::error::{Result, TokenError};
use crate::providers::TokenStore;
use crate::purpose::TokenKey;
use crate::token::Principal;
use chrono::Duration;

/// Store whose every operation fails with [`TokenError::StoreUnavailable`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingTokenStore;

fn unavailable<T>() -> Result<T> {
    Err(TokenError::StoreUnavailable(
        "mock store connection refused".to_string(),
    ))
}

impl TokenStore for FailingTokenStore {
    async fn put(&self, _key: &TokenKey, _principal: &Principal, _ttl: Duration) -> Result<()> {
        unavailable()
    }

    async fn get(&self, _key: &TokenKey) -> Result<Option<Principal>> {
        unavailable()
    }

    async fn remaining_ttl(&self, _key: &TokenKey) -> Result<Option<Duration>> {
        unavailable()
    }

    async fn take(&self, _key: &TokenKey) -> Result<Option<Principal>> {
        unavailable()
    }

    async fn delete(&self, _key: &TokenKey) -> Result<bool> {
        unavailable()
    }
}

/// Store whose operations never complete, to exercise deadlines.
#[derive(Debug, Clone, Copy, Default)]
pub struct StalledTokenStore;

impl TokenStore for StalledTokenStore {
    async fn put(&self, _key: &TokenKey, _principal: &Principal, _ttl: Duration) -> Result<()> {
        std::future::pending().await
    }

    async fn get(&self, _key: &TokenKey) -> Result<Option<Principal>> {
        std::future::pending().await
    }

    async fn remaining_ttl(&self, _key: &TokenKey) -> Result<Option<Duration>> {
        std::future::pending().await
    }

    async fn take(&self, _key: &TokenKey) -> Result<Option<Principal>> {
        std::future::pending().await
    }

    async fn delete(&self, _key: &TokenKey) -> Result<bool> {
        std::future::pending().await
    }
}

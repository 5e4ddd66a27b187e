//! Store call deadlines.

use crate::error::{Result, TokenError};
use std::future::Future;
use std::time::Duration;

/// Await a store operation, failing with [`TokenError::StoreUnavailable`]
/// if it does not finish within `limit`.
///
/// A timed-out lookup is an outage, never an absent token.
pub(crate) async fn within<T, F>(
    limit: Option<Duration>,
    operation: &'static str,
    fut: F,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let Some(limit) = limit else {
        return fut.await;
    };

    if let Ok(result) = tokio::time::timeout(limit, fut).await {
        result
    } else {
        tracing::warn!(
            operation = operation,
            timeout_ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
            "Token store operation timed out"
        );
        Err(TokenError::StoreUnavailable(format!(
            "{operation} timed out after {limit:?}"
        )))
    }
}

//! Storage implementations for credential tokens.
//!
//! - **In-memory** - Mutex-protected map with read-time expiry and an
//!   optional sweeper task. Suited to single-process deployments and tests.
//! - **Redis** - Native key expiry with atomic `GETDEL` consumption.

pub mod token_memory;
pub mod token_redis;

// Re-exports
pub use token_memory::{InMemoryTokenStore, StoredEntry};
pub use token_redis::RedisTokenStore;

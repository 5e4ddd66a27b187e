//! Token providers.
//!
//! Traits for the external dependencies of the token subsystem. The issuer
//! and validator depend on these traits and receive concrete
//! implementations by injection, never through a global handle.
//!
//! This enables:
//! - **Testing**: In-memory store driven by a manual clock
//! - **Production**: `Redis` with native key expiry
//! - **Failure drills**: Stores that fail or stall on purpose (see `mocks`)

pub mod token_store;

pub use token_store::TokenStore;

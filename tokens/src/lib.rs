//! # Composable Rust Credential Tokens
//!
//! Short-lived, single-purpose tokens that let a user prove possession of
//! something sent out of band: an email verification link, a password reset
//! link, or a session refresh token.
//!
//! ## Features
//!
//! - **Unguessable**: values drawn from the OS CSPRNG, base64url encoded
//! - **Namespaced**: verification, reset and refresh tokens never collide
//! - **Single use**: verification and reset tokens are consumed atomically
//! - **Expiring**: fixed TTL from issuance, enforced on every read
//! - **Pluggable storage**: in-memory or `Redis`, injected, never global
//!
//! ## Architecture
//!
//! ```text
//! TokenIssuer ── TokenGenerator ──▶ value
//!      │
//!      └──▶ TokenStore.put(purpose:value → principal, ttl)
//!
//! TokenValidator ──▶ TokenStore.take      (verification, reset)
//!                └─▶ TokenStore.get + remaining_ttl   (refresh)
//! ```
//!
//! ## Example: Password Reset
//!
//! ```rust,ignore
//! let service = TokenService::new(RedisTokenStore::new(url).await?, TokenConfig::default())?;
//!
//! // "Forgot password": issue and hand the value to the mailer
//! let token = service.issue_reset_token(&Principal::new(email)?).await?;
//! mailer.send_reset_link(email, &token.value).await?;
//!
//! // Link clicked: first presentation wins, any replay fails
//! let principal = service.consume_reset_token(&presented).await?;
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

// Public modules
pub mod config;
pub mod environment;
pub mod error;
pub mod generator;
pub mod issuer;
pub mod providers;
pub mod purpose;
pub mod service;
pub mod stores;
pub mod token;
pub mod validator;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

mod deadline;

// Re-export main types for convenience
pub use config::{PurposePolicy, TokenConfig};
pub use error::{Result, TokenError};
pub use issuer::TokenIssuer;
pub use purpose::{ConsumptionPolicy, TokenKey, TokenPurpose};
pub use service::TokenService;
pub use token::{CredentialToken, Principal};
pub use validator::TokenValidator;

//! Mock implementations for testing.
//!
//! Deterministic time and deliberately broken collaborators, so the failure
//! paths of the issuer and validator can be exercised without a real
//! outage.

pub mod clock;
pub mod generator;
pub mod token_store;

pub use clock::ManualClock;
pub use generator::FailingGenerator;
pub use token_store::{FailingTokenStore, StalledTokenStore};

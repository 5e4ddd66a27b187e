//! End-to-end token lifecycle tests.
//!
//! Every scenario runs against the in-memory store on a manual clock, so
//! expiry is simulated rather than waited for.

#![allow(clippy::unwrap_used)] // Test code

use chrono::Duration;
use composable_rust_tokens::mocks::ManualClock;
use composable_rust_tokens::stores::InMemoryTokenStore;
use composable_rust_tokens::{Principal, TokenConfig, TokenError, TokenPurpose, TokenService};
use std::sync::Arc;

type TestService = TokenService<InMemoryTokenStore<ManualClock>>;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("composable_rust_tokens=debug")
        .try_init();
}

fn setup(config: TokenConfig) -> (TestService, InMemoryTokenStore<ManualClock>, ManualClock) {
    init_tracing();
    let clock = ManualClock::default();
    let store = InMemoryTokenStore::with_clock(clock.clone());
    let service = TokenService::new(store.clone(), config).unwrap();
    (service, store, clock)
}

fn user() -> Principal {
    Principal::new("u@example.com").unwrap()
}

#[tokio::test]
async fn test_every_purpose_resolves_immediately_after_issue() {
    let (service, _, _) = setup(TokenConfig::default());

    for purpose in TokenPurpose::ALL {
        let token = service.issuer().issue(purpose, &user()).await.unwrap();
        let validated = service
            .validator()
            .validate(purpose, &token.value)
            .await
            .unwrap();
        assert_eq!(validated.principal, user(), "purpose {purpose}");
    }
}

#[tokio::test]
async fn test_password_reset_scenario() {
    let (service, _, _) = setup(TokenConfig::default().with_reset_ttl(Duration::seconds(300)));

    let token = service.issue_reset_token(&user()).await.unwrap();
    assert_eq!(token.remaining_lifetime, Duration::seconds(300));

    assert_eq!(
        service.consume_reset_token(&token.value).await.unwrap().as_str(),
        "u@example.com"
    );
    assert_eq!(
        service.consume_reset_token(&token.value).await,
        Err(TokenError::InvalidOrExpiredToken)
    );
}

#[tokio::test]
async fn test_consuming_tokens_fail_second_time_within_ttl() {
    let (service, _, clock) = setup(TokenConfig::default());

    let verification = service.issue_verification_token(&user()).await.unwrap();
    clock.advance(Duration::seconds(10));

    assert!(service.consume_verification_token(&verification.value).await.is_ok());
    clock.advance(Duration::seconds(10));
    assert_eq!(
        service.consume_verification_token(&verification.value).await,
        Err(TokenError::InvalidOrExpiredToken)
    );
}

#[tokio::test]
async fn test_refresh_token_validates_repeatedly() {
    let (service, _, clock) = setup(TokenConfig::default());

    let token = service.issue_refresh_token(&user()).await.unwrap();

    for _ in 0..10 {
        clock.advance(Duration::hours(1));
        let checked = service.validate_refresh_token(&token.value).await.unwrap();
        assert_eq!(checked.principal, user());
        assert_eq!(checked.value, token.value);
    }
}

#[tokio::test]
async fn test_refresh_token_expires() {
    let (service, _, clock) = setup(TokenConfig::default().with_refresh_ttl(Duration::days(1)));

    let token = service.issue_refresh_token(&user()).await.unwrap();
    assert!(service.validate_refresh_token(&token.value).await.is_ok());

    clock.advance(Duration::days(1) + Duration::seconds(1));

    assert_eq!(
        service.validate_refresh_token(&token.value).await,
        Err(TokenError::InvalidOrExpiredToken)
    );
}

#[tokio::test]
async fn test_unused_tokens_expire_for_every_purpose() {
    let (service, _, clock) = setup(TokenConfig::default());

    let verification = service.issue_verification_token(&user()).await.unwrap();
    let reset = service.issue_reset_token(&user()).await.unwrap();

    clock.advance(Duration::seconds(300));

    assert_eq!(
        service.consume_verification_token(&verification.value).await,
        Err(TokenError::InvalidOrExpiredToken)
    );
    assert_eq!(
        service.consume_reset_token(&reset.value).await,
        Err(TokenError::InvalidOrExpiredToken)
    );
}

#[tokio::test]
async fn test_revoked_refresh_token_is_invalid() {
    let (service, _, _) = setup(TokenConfig::default());

    let token = service.issue_refresh_token(&user()).await.unwrap();
    service.revoke_refresh_token(&token.value).await.unwrap();

    assert_eq!(
        service.validate_refresh_token(&token.value).await,
        Err(TokenError::InvalidOrExpiredToken)
    );

    // Revoking again is still fine
    service.revoke_refresh_token(&token.value).await.unwrap();
}

#[tokio::test]
async fn test_multiple_live_tokens_per_principal() {
    let (service, store, _) = setup(TokenConfig::default());

    let first = service.issue_reset_token(&user()).await.unwrap();
    let second = service.issue_reset_token(&user()).await.unwrap();

    assert_ne!(first.value, second.value);
    assert_eq!(store.len().unwrap(), 2);

    // Consuming one leaves the other usable
    assert_eq!(service.consume_reset_token(&second.value).await.unwrap(), user());
    assert_eq!(service.consume_reset_token(&first.value).await.unwrap(), user());
    assert!(store.is_empty().unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_issuance_yields_independent_tokens() {
    let (service, store, _) = setup(TokenConfig::default());
    let service = Arc::new(service);

    for purpose in TokenPurpose::ALL {
        let handles: Vec<_> = (0..2)
            .map(|_| {
                let service = Arc::clone(&service);
                tokio::spawn(async move { service.issuer().issue(purpose, &user()).await })
            })
            .collect();

        let mut issued = Vec::new();
        for handle in handles {
            issued.push(handle.await.unwrap().unwrap());
        }
        assert_ne!(issued[0].value, issued[1].value, "purpose {purpose}");

        for token in &issued {
            let validated = service.validator().validate(purpose, &token.value).await.unwrap();
            assert_eq!(validated.principal, user());
        }
    }

    // Only the refresh pair survives validation
    assert_eq!(store.len().unwrap(), 2);
}

#[tokio::test]
async fn test_undelivered_token_stays_valid_until_expiry() {
    let (service, store, clock) = setup(TokenConfig::default());

    // Caller "fails" to email the token: nothing is rolled back
    let token = service.issue_verification_token(&user()).await.unwrap();
    drop(token);
    assert_eq!(store.len().unwrap(), 1);

    clock.advance(Duration::seconds(301));
    assert_eq!(store.sweep().unwrap(), 1);
    assert!(store.is_empty().unwrap());
}

#[tokio::test]
async fn test_rotated_refresh_token_keeps_principal() {
    let (service, _, clock) = setup(TokenConfig::default().with_refresh_ttl(Duration::hours(2)));

    let mut current = service.issue_refresh_token(&user()).await.unwrap();
    for _ in 0..5 {
        clock.advance(Duration::hours(1));
        current = service.rotate_refresh_token(&current.value).await.unwrap();
    }

    // Five hours in, well past the first token's TTL
    let checked = service.validate_refresh_token(&current.value).await.unwrap();
    assert_eq!(checked.principal, user());
    assert_eq!(checked.remaining_lifetime, Duration::hours(2));
}

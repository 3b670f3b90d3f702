/// Identity resolution against the fake household API
///
/// Covers household caching (hit, miss, retry after failure), the
/// unauthenticated short-circuit and display-name resolution.

mod common;

use common::TestContext;
use flatchat_client::error::IdentityError;
use flatchat_shared::models::SessionPatch;
use reqwest::Method;
use serde_json::json;

#[tokio::test]
async fn test_resolves_and_caches_household() {
    let ctx = TestContext::new();
    ctx.backend.add_user("u1", json!({"UserID": "u1", "HouseholdID": "h1"}));
    let resolver = ctx.resolver();

    let household = resolver.resolve_household().await.unwrap();
    assert_eq!(household.as_deref(), Some("h1"));
    assert_eq!(ctx.store.get().unwrap().household_id.as_deref(), Some("h1"));
    assert_eq!(ctx.backend.count(Method::POST, "/read-user"), 1);

    // Second call is served from the session record
    let again = resolver.resolve_household().await.unwrap();
    assert_eq!(again.as_deref(), Some("h1"));
    assert_eq!(ctx.backend.count(Method::POST, "/read-user"), 1);
}

#[tokio::test]
async fn test_cached_household_makes_no_requests() {
    let ctx = TestContext::new();
    ctx.store.set(SessionPatch::household("h7"));
    let resolver = ctx.resolver();

    for _ in 0..3 {
        assert_eq!(
            resolver.resolve_household().await.unwrap().as_deref(),
            Some("h7")
        );
    }
    assert_eq!(ctx.backend.total_requests(), 0);
}

#[tokio::test]
async fn test_each_miss_performs_exactly_one_lookup() {
    let ctx = TestContext::new();
    ctx.backend.add_user("u1", json!({"UserID": "u1", "Name": "Aoife"}));
    let resolver = ctx.resolver();

    // The user has no household, so nothing is cached and every call looks up once
    for expected in 1..=3 {
        assert_eq!(resolver.resolve_household().await, Ok(None));
        assert_eq!(ctx.backend.count(Method::POST, "/read-user"), expected);
    }
}

#[tokio::test]
async fn test_unauthenticated_makes_no_request() {
    let ctx = TestContext::signed_out();
    let resolver = ctx.resolver();

    assert_eq!(
        resolver.resolve_household().await,
        Err(IdentityError::Unauthenticated)
    );
    assert_eq!(
        resolver.resolve_display_name().await,
        Err(IdentityError::Unauthenticated)
    );
    assert_eq!(ctx.backend.total_requests(), 0);
}

#[tokio::test]
async fn test_household_without_tokens_is_unauthenticated() {
    let ctx = TestContext::signed_out();
    ctx.store.set(SessionPatch::household("h1"));

    assert_eq!(
        ctx.resolver().resolve_household().await,
        Err(IdentityError::Unauthenticated)
    );
    assert_eq!(ctx.backend.total_requests(), 0);
}

#[tokio::test]
async fn test_failed_lookup_is_retried() {
    let ctx = TestContext::new();
    ctx.backend.add_user("u1", json!({"UserID": "u1", "HouseholdID": "h1"}));
    ctx.backend
        .fail_next(Method::POST, "/read-user", 500, json!({"message": "Internal error"}));
    let resolver = ctx.resolver();

    assert_eq!(resolver.resolve_household().await, Ok(None));
    assert!(ctx.store.get().unwrap().household_id.is_none());

    assert_eq!(
        resolver.resolve_household().await.unwrap().as_deref(),
        Some("h1")
    );
    assert_eq!(ctx.backend.count(Method::POST, "/read-user"), 2);
}

#[tokio::test]
async fn test_network_failure_is_retried() {
    let ctx = TestContext::new();
    ctx.backend.add_user("u1", json!({"UserID": "u1", "HouseholdID": "h1"}));
    ctx.backend.disconnect_next(Method::POST, "/read-user");
    let resolver = ctx.resolver();

    assert_eq!(
        resolver.require_household().await,
        Err(IdentityError::HouseholdUnresolved)
    );
    assert_eq!(resolver.require_household().await, Ok("h1".to_string()));
}

#[tokio::test]
async fn test_household_survives_in_durable_tier_after_logout() {
    let ctx = TestContext::new();
    ctx.backend.add_user("u1", json!({"UserID": "u1", "HouseholdID": "h1"}));
    ctx.resolver().resolve_household().await.unwrap();

    ctx.store.clear();

    assert!(ctx.store.get().is_none());
    assert_eq!(
        ctx.store.durable_household().household_id.as_deref(),
        Some("h1")
    );
}

#[tokio::test]
async fn test_clear_forces_new_lookup_after_sign_in() {
    let ctx = TestContext::new();
    ctx.backend.add_user("u1", json!({"UserID": "u1", "HouseholdID": "h1"}));
    let resolver = ctx.resolver();
    resolver.resolve_household().await.unwrap();

    ctx.store.clear();
    ctx.store
        .set(SessionPatch::login(common::USER_ID, common::ACCESS_TOKEN));
    resolver.resolve_household().await.unwrap();

    assert_eq!(ctx.backend.count(Method::POST, "/read-user"), 2);
}

#[tokio::test]
async fn test_email_display_name_is_replaced() {
    let ctx = TestContext::new();
    ctx.store.set(SessionPatch::display_name("aoife@example.com"));
    ctx.backend
        .add_user("u1", json!({"UserID": "u1", "Name": "Aoife", "HouseholdID": "h1"}));
    let resolver = ctx.resolver();

    assert_eq!(
        resolver.resolve_display_name().await.unwrap().as_deref(),
        Some("Aoife")
    );
    assert_eq!(
        resolver.resolve_display_name().await.unwrap().as_deref(),
        Some("Aoife")
    );
    assert_eq!(ctx.backend.count(Method::POST, "/read-user"), 1);
}

#[tokio::test]
async fn test_opaque_id_display_name_is_replaced() {
    let ctx = TestContext::new();
    ctx.store
        .set(SessionPatch::display_name("3f2a9c1e-77b0-4d1a-9b8e-0c6f5e2d4a10"));
    ctx.backend.add_user("u1", json!({"UserID": "u1", "Name": "Cian"}));

    assert_eq!(
        ctx.resolver().resolve_display_name().await.unwrap().as_deref(),
        Some("Cian")
    );
}

#[tokio::test]
async fn test_resolve_context_for_user_without_household() {
    let ctx = TestContext::new();
    ctx.backend.add_user("u1", json!({"UserID": "u1", "Name": "Aoife"}));

    assert_eq!(
        ctx.resolver().resolve_context().await,
        Err(IdentityError::HouseholdUnresolved)
    );
    // The name was still cached on the way
    assert_eq!(
        ctx.store.get().unwrap().display_name.as_deref(),
        Some("Aoife")
    );
}

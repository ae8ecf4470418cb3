use std::cell::Cell;

use futures::executor::block_on;

use super::*;
use crate::test_support::{Harness, profile_body, student};

// =============================================================
// Request phase
// =============================================================

#[test]
fn no_token_means_no_authorization_header() {
    let h = Harness::new();
    h.transport.respond(Method::Get, "/profile", 200, profile_body(&student(1)));
    block_on(h.client.fetch_profile()).unwrap();
    let sent = h.transport.last_request().unwrap();
    assert_eq!(sent.header("authorization"), None);
    assert_eq!(sent.header("Accept"), Some("application/json"));
    assert_eq!(sent.url, "http://api.test/profile");
}

#[test]
fn stored_token_is_attached_verbatim() {
    let h = Harness::new();
    h.tokens.save("abc123", &student(1)).unwrap();
    h.transport.respond(Method::Get, "/profile", 200, profile_body(&student(1)));
    block_on(h.client.fetch_profile()).unwrap();
    assert_eq!(
        h.transport.last_request().unwrap().header("Authorization"),
        Some("Bearer abc123")
    );
}

#[test]
fn header_follows_token_store_between_requests() {
    let h = Harness::new();
    for _ in 0..3 {
        h.transport.respond(Method::Get, "/profile", 200, profile_body(&student(1)));
    }
    h.tokens.save("first", &student(1)).unwrap();
    block_on(h.client.fetch_profile()).unwrap();
    h.tokens.clear();
    block_on(h.client.fetch_profile()).unwrap();
    h.tokens.save("second", &student(1)).unwrap();
    block_on(h.client.fetch_profile()).unwrap();
    let auth: Vec<Option<String>> = h
        .transport
        .requests()
        .iter()
        .map(|r| r.header("Authorization").map(str::to_owned))
        .collect();
    assert_eq!(
        auth,
        vec![Some("Bearer first".to_owned()), None, Some("Bearer second".to_owned())]
    );
}

#[test]
fn json_body_sets_content_type() {
    let h = Harness::new();
    h.transport.respond(Method::Post, "/change-password", 200, r#"{"message":"ok"}"#);
    let message = block_on(h.client.change_password("old", "new-password")).unwrap();
    assert_eq!(message, "ok");
    let sent = h.transport.last_request().unwrap();
    assert_eq!(sent.header("content-type"), Some("application/json"));
    assert_eq!(
        sent.body,
        Some(serde_json::json!({ "current_password": "old", "new_password": "new-password" }))
    );
}

#[test]
fn explicit_credential_overrides_store() {
    let h = Harness::new();
    h.transport.respond(Method::Post, "/auth/logout", 204, "");
    block_on(h.client.logout("captured")).unwrap();
    assert_eq!(
        h.transport.last_request().unwrap().header("Authorization"),
        Some("Bearer captured")
    );
}

#[test]
fn base_url_trailing_slash_is_trimmed() {
    let h = Harness::new();
    let client = ApiClient::new("http://api.test/", Rc::new(h.transport.clone()), h.tokens.clone());
    assert_eq!(client.base_url(), "http://api.test");
}

// =============================================================
// Response phase
// =============================================================

fn count_invalidations(h: &Harness) -> Rc<Cell<u32>> {
    let count = Rc::new(Cell::new(0));
    let counter = Rc::clone(&count);
    h.client.events().subscribe(move |_| counter.set(counter.get() + 1));
    count
}

#[test]
fn unauthorized_emits_invalidation() {
    let h = Harness::new();
    let count = count_invalidations(&h);
    h.transport.respond(Method::Get, "/profile", 401, r#"{"message":"Unauthenticated."}"#);
    let err = block_on(h.client.fetch_profile()).unwrap_err();
    assert_eq!(err, ApiError::Unauthorized);
    assert_eq!(count.get(), 1);
}

#[test]
fn unauthorized_with_replaced_token_does_not_invalidate() {
    let h = Harness::new();
    let count = count_invalidations(&h);
    h.tokens.save("old", &student(1)).unwrap();
    let reply = h.transport.defer(Method::Get, "/profile");

    let mut pool = futures::executor::LocalPool::new();
    let client = h.client.clone();
    futures::task::LocalSpawnExt::spawn_local(&pool.spawner(), async move {
        assert_eq!(client.fetch_profile().await, Err(ApiError::Unauthorized));
    })
    .unwrap();
    pool.run_until_stalled();

    h.tokens.save("new", &student(1)).unwrap();
    reply.send(Ok(HttpResponse::new(401, ""))).unwrap();
    pool.run_until_stalled();

    assert_eq!(count.get(), 0);
    assert_eq!(h.tokens.token().as_deref(), Some("new"));
}

#[test]
fn unauthorized_login_is_a_credential_error_only() {
    let h = Harness::new();
    let count = count_invalidations(&h);
    h.transport.respond(Method::Post, "/auth/login", 401, r#"{"message":"Invalid credentials"}"#);
    let err = block_on(h.client.login("a@b.com", "wrong")).unwrap_err();
    assert_eq!(err, ApiError::Unauthorized);
    assert_eq!(count.get(), 0);
}

#[test]
fn forbidden_surfaces_message_without_invalidation() {
    let h = Harness::new();
    let count = count_invalidations(&h);
    h.transport.respond(Method::Put, "/profile", 403, r#"{"message":"Account disabled"}"#);
    let err = block_on(h.client.update_profile(&ProfileUpdate::default())).unwrap_err();
    assert_eq!(err, ApiError::Forbidden { message: Some("Account disabled".to_owned()) });
    assert_eq!(count.get(), 0);
}

#[test]
fn unprocessable_propagates_structured_body() {
    let h = Harness::new();
    let count = count_invalidations(&h);
    h.transport.respond(
        Method::Post,
        "/change-password",
        422,
        r#"{"message":"Invalid.","errors":{"current_password":["The current password is incorrect."]}}"#,
    );
    let err = block_on(h.client.change_password("bad", "new-password")).unwrap_err();
    let ApiError::Validation(errors) = &err else {
        panic!("expected validation error, got {err:?}");
    };
    assert_eq!(errors.first("current_password"), Some("The current password is incorrect."));
    assert_eq!(errors.body["message"], "Invalid.");
    assert_eq!(count.get(), 0);
}

#[test]
fn too_many_requests_is_rate_limited() {
    let h = Harness::new();
    let count = count_invalidations(&h);
    h.transport.respond(Method::Post, "/auth/login", 429, "Too Many Attempts.");
    let err = block_on(h.client.login("a@b.com", "password")).unwrap_err();
    assert_eq!(err, ApiError::RateLimited { message: Some("Too Many Attempts.".to_owned()) });
    assert_eq!(count.get(), 0);
}

#[test]
fn other_statuses_are_propagated() {
    let h = Harness::new();
    h.transport.respond(Method::Get, "/profile", 500, r#"{"error":"Server Error"}"#);
    let err = block_on(h.client.fetch_profile()).unwrap_err();
    assert_eq!(err, ApiError::Status { status: 500, message: Some("Server Error".to_owned()) });
}

#[test]
fn transport_failure_is_network_error() {
    let h = Harness::new();
    h.transport.fail(Method::Get, "/profile", "offline");
    let err = block_on(h.client.fetch_profile()).unwrap_err();
    assert_eq!(err, ApiError::Network("offline".to_owned()));
}

#[test]
fn malformed_success_body_is_decode_error() {
    let h = Harness::new();
    h.transport.respond(Method::Get, "/profile", 200, r#"{"user":{"id":"x"}}"#);
    let err = block_on(h.client.fetch_profile()).unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

#[test]
fn logout_ignores_success_body_and_does_not_invalidate_on_401() {
    let h = Harness::new();
    let count = count_invalidations(&h);
    h.transport.respond(Method::Post, "/auth/logout", 200, "not json at all");
    block_on(h.client.logout("abc")).unwrap();
    h.transport.respond(Method::Post, "/auth/logout", 401, "");
    assert_eq!(block_on(h.client.logout("abc")), Err(ApiError::Unauthorized));
    assert_eq!(count.get(), 0);
}

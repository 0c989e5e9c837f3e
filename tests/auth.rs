mod common;

use axum::http::StatusCode;
use sqlx::Row;

use common::*;
use librarium::services::{session_service, user_service};

#[tokio::test]
async fn index_greets_the_signed_in_user() {
    let (app, pool) = setup().await;
    let cookie = signed_in_cookie(&pool).await;

    let anon = body_text(get(&app, "/").await).await;
    assert!(anon.contains("Sign in"));
    assert!(!anon.contains("staff"));

    let signed_in = body_text(get_with_cookie(&app, "/", &cookie).await).await;
    assert!(signed_in.contains("staff"));
    assert!(signed_in.contains("Sign out"));
}

#[tokio::test]
async fn expired_sessions_behave_as_logged_out() {
    let (app, pool) = setup().await;
    let cookie = signed_in_cookie(&pool).await;

    sqlx::query("UPDATE sessions SET expires_at = 1")
        .execute(&pool)
        .await
        .expect("expire");

    let resp = post_form(&app, "/add_book/new", Some(&cookie), "title=Dune").await;
    assert!(resp.status().is_redirection());
    assert!(location(&resp).starts_with("/login?next="));

    // The stale row is gone after the lookup.
    let row = sqlx::query("SELECT COUNT(*) AS n FROM sessions")
        .fetch_one(&pool)
        .await
        .expect("count");
    assert_eq!(row.get::<i64, _>("n"), 0);
}

#[tokio::test]
async fn unknown_session_tokens_behave_as_logged_out() {
    let (app, _pool) = setup().await;
    let resp = get_with_cookie(&app, "/", "librarium_session=not-a-real-token").await;
    let body = body_text(resp).await;
    assert!(body.contains("Sign in"));
}

#[tokio::test]
async fn logout_revokes_the_session() {
    let (app, pool) = setup().await;
    let cookie = signed_in_cookie(&pool).await;

    let resp = get_with_cookie(&app, "/logout", &cookie).await;
    assert!(resp.status().is_redirection());
    assert_eq!(location(&resp), "/");
    assert!(set_cookies(&resp)
        .iter()
        .any(|c| c.starts_with("librarium_session=;") && c.contains("Max-Age=0")));

    let row = sqlx::query("SELECT COUNT(*) AS n FROM sessions")
        .fetch_one(&pool)
        .await
        .expect("count");
    assert_eq!(row.get::<i64, _>("n"), 0);

    // The old cookie no longer signs anyone in.
    let body = body_text(get_with_cookie(&app, "/", &cookie).await).await;
    assert!(body.contains("Sign in"));
}

#[tokio::test]
async fn login_page_lists_providers_and_requires_one() {
    let (app, _pool) = setup().await;

    let body = body_text(get(&app, "/login").await).await;
    assert!(body.contains("Google"));
    assert!(body.contains("GitLab"));
    assert!(body.contains(r#"name="provider""#));

    let resp = post_form(&app, "/login", None, "provider=").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains("This field is required."));
}

#[tokio::test]
async fn unknown_provider_names_are_rejected() {
    let (app, _pool) = setup().await;
    let resp = post_form(&app, "/login", None, "provider=myspace").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains("Unknown provider"));
}

#[tokio::test]
async fn login_reports_missing_client_configuration() {
    let (app, _pool) = setup().await;
    let resp = post_form(&app, "/login", None, "provider=google").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains("not configured"));
}

#[tokio::test]
async fn authenticated_users_skip_the_login_page() {
    let (app, pool) = setup().await;
    let cookie = signed_in_cookie(&pool).await;

    let resp = get_with_cookie(&app, "/login", &cookie).await;
    assert!(resp.status().is_redirection());
    assert_eq!(location(&resp), "/");
}

#[tokio::test]
async fn callback_with_unknown_state_bounces_to_login() {
    let (app, _pool) = setup().await;
    let resp = get(&app, "/login?code=abc&state=bogus").await;
    assert!(resp.status().is_redirection());
    assert_eq!(location(&resp), "/login");
    assert!(set_cookies(&resp)
        .iter()
        .any(|c| c.starts_with("librarium_flash=")));
}

#[tokio::test]
async fn provisioning_is_idempotent_and_suffixes_nicknames() {
    let (_app, pool) = setup().await;

    let first = user_service::provision(&pool, "jane@example.org", Some("jane"))
        .await
        .expect("provision");
    assert_eq!(first.nickname, "jane");

    let again = user_service::provision(&pool, "jane@example.org", Some("jane"))
        .await
        .expect("provision again");
    assert_eq!(again.id, first.id);

    let other = user_service::provision(&pool, "jane@elsewhere.org", Some("jane"))
        .await
        .expect("provision collision");
    assert_eq!(other.nickname, "jane2");
    assert_ne!(other.id, first.id);
}

#[tokio::test]
async fn nickname_falls_back_to_the_email_local_part() {
    let (_app, pool) = setup().await;
    let user = user_service::provision(&pool, "quiet.reader@example.org", None)
        .await
        .expect("provision");
    assert_eq!(user.nickname, "quiet.reader");
}

#[tokio::test]
async fn stale_login_states_are_single_use() {
    let (_app, pool) = setup().await;

    let state = session_service::create_login_state(&pool, "https://accounts.google.com", false, None)
        .await
        .expect("state");

    let first = session_service::consume_login_state(&pool, &state)
        .await
        .expect("consume");
    assert!(first.is_some());

    let second = session_service::consume_login_state(&pool, &state)
        .await
        .expect("consume again");
    assert!(second.is_none());
}

#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tower::ServiceExt;

use librarium::config::Config;
use librarium::oauth::OAuthManager;
use librarium::services::{session_service, user_service};
use librarium::{db, AppState};

/// Fresh app over an in-memory database with the schema applied.
pub async fn setup() -> (Router, SqlitePool) {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("sqlite options")
        .foreign_keys(true);
    // One connection, or each pool checkout would see its own empty database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("connect");
    db::run_migrations(&pool).await.expect("migrations");

    let config = Config {
        database_url: "sqlite::memory:".into(),
        port: 0,
        base_url: "http://localhost:3000".into(),
        oauth_client_id: None,
        oauth_client_secret: None,
    };
    let state = AppState {
        pool: pool.clone(),
        oauth: Arc::new(OAuthManager::new()),
        config: Arc::new(config),
    };
    (librarium::app(state), pool)
}

/// Provision a user and a live session; returns the Cookie header value.
pub async fn signed_in_cookie(pool: &SqlitePool) -> String {
    let user = user_service::provision(pool, "staff@example.org", Some("staff"))
        .await
        .expect("provision");
    let session = session_service::create_session(pool, user.id, false)
        .await
        .expect("session");
    format!("librarium_session={}", session.token)
}

pub async fn send(app: &Router, req: Request<Body>) -> Response {
    app.clone().oneshot(req).await.expect("request")
}

pub async fn get(app: &Router, path: &str) -> Response {
    let req = Request::builder()
        .uri(path)
        .body(Body::empty())
        .expect("request");
    send(app, req).await
}

pub async fn get_with_cookie(app: &Router, path: &str, cookie: &str) -> Response {
    let req = Request::builder()
        .uri(path)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .expect("request");
    send(app, req).await
}

pub async fn post_form(app: &Router, path: &str, cookie: Option<&str>, body: &str) -> Response {
    let mut builder = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let req = builder.body(Body::from(body.to_string())).expect("request");
    send(app, req).await
}

pub async fn body_text(resp: Response) -> String {
    let bytes = resp
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("utf8 body")
}

pub fn location(resp: &Response) -> String {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

pub fn set_cookies(resp: &Response) -> Vec<String> {
    resp.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(|v| v.to_string())
        .collect()
}

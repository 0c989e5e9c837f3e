//! Session cookie handling and request extractors for the signed-in user.

use std::convert::Infallible;

use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{Html, IntoResponse, Redirect, Response};
use sqlx::SqlitePool;

use crate::models::User;
use crate::services::session_service;

pub const SESSION_COOKIE: &str = "librarium_session";
pub const FLASH_COOKIE: &str = "librarium_flash";

/// Pull one cookie value out of the Cookie header.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(COOKIE)?.to_str().ok()?;
    for pair in raw.split(';') {
        if let Some((k, v)) = pair.trim().split_once('=') {
            if k == name {
                return Some(v.to_string());
            }
        }
    }
    None
}

pub fn session_cookie(token: &str, remember: bool) -> String {
    let mut cookie = format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax");
    if remember {
        cookie.push_str(&format!("; Max-Age={}", session_service::REMEMBER_TTL_SECS));
    }
    cookie
}

pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

fn flash_cookie(message: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(message.as_bytes()).collect();
    format!("{FLASH_COOKIE}={encoded}; Path=/; Max-Age=60")
}

fn clear_flash_cookie() -> String {
    format!("{FLASH_COOKIE}=; Path=/; Max-Age=0")
}

fn append_cookie(resp: &mut Response, cookie: &str) {
    if let Ok(value) = HeaderValue::from_str(cookie) {
        resp.headers_mut().append(SET_COOKIE, value);
    }
}

/// Redirect and queue a one-shot message for the next page render.
pub fn redirect_with_flash(to: &str, message: &str) -> Response {
    let mut resp = Redirect::to(to).into_response();
    append_cookie(&mut resp, &flash_cookie(message));
    resp
}

pub fn redirect_with_cookie(to: &str, cookie: &str) -> Response {
    let mut resp = Redirect::to(to).into_response();
    append_cookie(&mut resp, cookie);
    resp
}

/// Wrap a rendered page, clearing the flash cookie once it has been shown.
pub fn page(body: String, flash: &Flash) -> Response {
    let mut resp = Html(body).into_response();
    if flash.0.is_some() {
        append_cookie(&mut resp, &clear_flash_cookie());
    }
    resp
}

/// One-shot message carried across a redirect in a short-lived cookie.
pub struct Flash(pub Option<String>);

#[async_trait]
impl<S> FromRequestParts<S> for Flash
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let message = cookie_value(&parts.headers, FLASH_COOKIE)
            .filter(|v| !v.is_empty())
            .and_then(|raw| {
                url::form_urlencoded::parse(format!("m={raw}").as_bytes())
                    .find(|(k, _)| k == "m")
                    .map(|(_, v)| v.into_owned())
            });
        Ok(Flash(message))
    }
}

/// The signed-in user, if the request carries a valid session cookie.
pub struct CurrentUser(pub Option<User>);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    SqlitePool: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Some(token) = cookie_value(&parts.headers, SESSION_COOKIE) else {
            return Ok(CurrentUser(None));
        };
        let pool = SqlitePool::from_ref(state);
        match session_service::user_for_token(&pool, &token).await {
            Ok(user) => Ok(CurrentUser(user)),
            Err(err) => {
                tracing::warn!("session lookup failed: {err}");
                Ok(CurrentUser(None))
            }
        }
    }
}

/// Guard for mutating routes: anonymous requests are sent to the login page
/// with the original path preserved in `next`.
pub struct RequireUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for RequireUser
where
    SqlitePool: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let path = parts.uri.path().to_string();
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state)
            .await
            .unwrap_or(CurrentUser(None));
        match user {
            Some(user) => Ok(RequireUser(user)),
            None => Err(Redirect::to(&login_redirect(&path))),
        }
    }
}

pub fn login_redirect(next: &str) -> String {
    let query: String = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("next", next)
        .finish();
    format!("/login?{query}")
}

/// `next` targets must stay on this site; anything absolute is dropped.
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(n) if n.starts_with('/') && !n.starts_with("//") => n,
        _ => "/",
    }
}

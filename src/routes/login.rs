/// Federated login: provider hand-off, callback, logout
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::Form;
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::auth::{
    self, clear_session_cookie, page, redirect_with_cookie, redirect_with_flash, safe_next,
    session_cookie, CurrentUser, Flash,
};
use crate::config::Config;
use crate::error::AppError;
use crate::forms::{FormError, LoginForm};
use crate::oauth::{self, OAuthManager};
use crate::render;
use crate::services::{session_service, user_service};

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub provider: Option<String>,
    pub next: Option<String>,
}

/// GET /login - Login page; doubles as the OIDC callback when the provider
/// redirects back with `code` and `state`.
pub async fn login_page(
    State(pool): State<SqlitePool>,
    State(oauth): State<Arc<OAuthManager>>,
    State(config): State<Arc<Config>>,
    user: CurrentUser,
    flash: Flash,
    Query(query): Query<LoginQuery>,
) -> Result<Response, AppError> {
    if let (Some(code), Some(state)) = (query.code.as_deref(), query.state.as_deref()) {
        return finish_login(&pool, &oauth, &config, code, state).await;
    }

    if let Some(error) = query.error.as_deref() {
        tracing::warn!(error, "provider returned an error");
        return Ok(page(
            render::login(
                query.provider.as_deref().unwrap_or(""),
                query.next.as_deref(),
                &[],
                Some("The identity provider rejected the login. Please try again."),
                flash.0.as_deref(),
            ),
            &flash,
        ));
    }

    if user.0.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    Ok(page(
        render::login(
            query.provider.as_deref().unwrap_or(""),
            query.next.as_deref(),
            &[],
            None,
            flash.0.as_deref(),
        ),
        &flash,
    ))
}

/// POST /login - Validate the form and hand off to the chosen provider.
pub async fn start_login(
    State(pool): State<SqlitePool>,
    State(oauth): State<Arc<OAuthManager>>,
    State(config): State<Arc<Config>>,
    user: CurrentUser,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    if user.0.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let mut errors = form.validate();
    let issuer = if errors.is_empty() {
        match oauth::resolve_issuer(&form.provider) {
            Some(issuer) => Some(issuer),
            None => {
                errors.push(FormError {
                    field: "provider",
                    message: "Unknown provider; use one of the listed names or an issuer URL.",
                });
                None
            }
        }
    } else {
        None
    };

    if !errors.is_empty() {
        return Ok(render_login_again(&form, &errors, None));
    }

    let Some((client_id, _)) = config.oauth_client() else {
        tracing::warn!("login attempted without OAUTH_CLIENT_ID / OAUTH_CLIENT_SECRET");
        return Ok(render_login_again(
            &form,
            &[],
            Some("Federated login is not configured on this server."),
        ));
    };

    let issuer = issuer.unwrap_or_default();
    let meta = match oauth.discover(&issuer).await {
        Ok(meta) => meta,
        Err(err) => {
            tracing::warn!(issuer = %issuer, "discovery failed: {err:#}");
            return Ok(render_login_again(
                &form,
                &[],
                Some("Could not reach the identity provider. Please try again."),
            ));
        }
    };

    let state = session_service::create_login_state(
        &pool,
        &issuer,
        form.remember(),
        form.next.as_deref(),
    )
    .await?;

    let url = oauth::authorization_url(&meta, client_id, &config.redirect_uri(), &state)?;
    tracing::debug!(issuer = %issuer, "redirecting to provider");
    Ok(Redirect::to(url.as_str()).into_response())
}

/// GET /logout - Drop the session row and the cookie.
pub async fn logout(
    State(pool): State<SqlitePool>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    if let Some(token) = auth::cookie_value(&headers, auth::SESSION_COOKIE) {
        session_service::delete_session(&pool, &token).await?;
    }
    Ok(redirect_with_cookie("/", &clear_session_cookie()))
}

/// Completes the provider round-trip: state check, code exchange, userinfo,
/// provisioning, session. Soft failures flash and return to the login page.
async fn finish_login(
    pool: &SqlitePool,
    oauth: &OAuthManager,
    config: &Config,
    code: &str,
    state: &str,
) -> Result<Response, AppError> {
    let Some(login_state) = session_service::consume_login_state(pool, state).await? else {
        tracing::warn!("callback with unknown or stale state");
        return Ok(redirect_with_flash(
            "/login",
            "Login expired. Please try again.",
        ));
    };

    let Some((client_id, client_secret)) = config.oauth_client() else {
        return Ok(redirect_with_flash(
            "/login",
            "Federated login is not configured on this server.",
        ));
    };

    let info = async {
        let meta = oauth.discover(&login_state.issuer).await?;
        let access_token = oauth
            .exchange_code(
                &meta,
                client_id,
                client_secret,
                code,
                &config.redirect_uri(),
            )
            .await?;
        oauth.fetch_userinfo(&meta, &access_token).await
    }
    .await;

    let info = match info {
        Ok(info) => info,
        Err(err) => {
            tracing::warn!(issuer = %login_state.issuer, "callback failed: {err:#}");
            return Ok(redirect_with_flash(
                "/login",
                "Invalid login. Please try again.",
            ));
        }
    };

    let email = match info.email.as_deref() {
        Some(email) if !email.is_empty() => email,
        _ => {
            return Ok(redirect_with_flash(
                "/login",
                "Invalid login. Please try again.",
            ));
        }
    };

    let user = user_service::provision(pool, email, info.preferred_username.as_deref()).await?;
    let session = session_service::create_session(pool, user.id, login_state.remember).await?;
    tracing::info!(user_id = user.id, nickname = %user.nickname, "signed in");

    Ok(redirect_with_cookie(
        safe_next(login_state.next_url.as_deref()),
        &session_cookie(&session.token, session.remember),
    ))
}

fn render_login_again(form: &LoginForm, errors: &[FormError], message: Option<&str>) -> Response {
    page(
        render::login(&form.provider, form.next.as_deref(), errors, message, None),
        &Flash(None),
    )
}

/// Database-backed sessions and OIDC login states
use anyhow::Result;
use rand::distributions::Alphanumeric;
use rand::Rng;
use sqlx::SqlitePool;

use crate::db;
use crate::models::{LoginState, Session, User};

pub const SESSION_TTL_SECS: i64 = 60 * 60 * 24;
pub const REMEMBER_TTL_SECS: i64 = 60 * 60 * 24 * 30;
/// A login state is only valid for the duration of one provider round-trip.
pub const LOGIN_STATE_TTL_SECS: i64 = 60 * 10;

const TOKEN_LEN: usize = 48;

pub async fn create_session(pool: &SqlitePool, user_id: i64, remember: bool) -> Result<Session> {
    let token = random_token(TOKEN_LEN);
    let now = db::now_epoch();
    let ttl = if remember {
        REMEMBER_TTL_SECS
    } else {
        SESSION_TTL_SECS
    };
    let session = Session {
        token,
        user_id,
        remember,
        created_at: now,
        expires_at: now + ttl,
    };
    sqlx::query(
        "INSERT INTO sessions (token, user_id, remember, created_at, expires_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&session.token)
    .bind(session.user_id)
    .bind(session.remember)
    .bind(session.created_at)
    .bind(session.expires_at)
    .execute(pool)
    .await?;
    Ok(session)
}

/// Resolve a session cookie to its user. Expired sessions are deleted on the
/// spot and treated as absent.
pub async fn user_for_token(pool: &SqlitePool, token: &str) -> Result<Option<User>> {
    let session = sqlx::query_as::<_, Session>(
        "SELECT token, user_id, remember, created_at, expires_at FROM sessions WHERE token = ?",
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;

    let Some(session) = session else {
        return Ok(None);
    };

    if session.expires_at < db::now_epoch() {
        delete_session(pool, token).await?;
        return Ok(None);
    }

    let user = sqlx::query_as::<_, User>(
        "SELECT id, nickname, email, role, created_at FROM users WHERE id = ?",
    )
    .bind(session.user_id)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn delete_session(pool: &SqlitePool, token: &str) -> Result<()> {
    sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await?;
    Ok(())
}

/// Persist the state half of the OIDC round-trip; returns the state token
/// that goes into the authorization URL.
pub async fn create_login_state(
    pool: &SqlitePool,
    issuer: &str,
    remember: bool,
    next_url: Option<&str>,
) -> Result<String> {
    let state = random_token(TOKEN_LEN);
    sqlx::query(
        "INSERT INTO login_states (state, issuer, remember, next_url, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&state)
    .bind(issuer)
    .bind(remember)
    .bind(next_url)
    .bind(db::now_epoch())
    .execute(pool)
    .await?;
    Ok(state)
}

/// Single use: the row is deleted whether or not it is still fresh.
pub async fn consume_login_state(pool: &SqlitePool, state: &str) -> Result<Option<LoginState>> {
    let row = sqlx::query_as::<_, LoginState>(
        "SELECT state, issuer, remember, next_url, created_at FROM login_states WHERE state = ?",
    )
    .bind(state)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    sqlx::query("DELETE FROM login_states WHERE state = ?")
        .bind(state)
        .execute(pool)
        .await?;

    if row.created_at + LOGIN_STATE_TTL_SECS < db::now_epoch() {
        return Ok(None);
    }
    Ok(Some(row))
}

fn random_token(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

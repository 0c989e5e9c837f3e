/// User provisioning for federated login
use anyhow::Result;
use sqlx::SqlitePool;

use crate::db;
use crate::models::{Role, User};

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, nickname, email, role, created_at FROM users WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

/// Look up a user by email, creating one on first login. The nickname comes
/// from the provider's preferred username, falling back to the email local
/// part; collisions get a numeric suffix so the UNIQUE constraint holds.
pub async fn provision(
    pool: &SqlitePool,
    email: &str,
    preferred_nickname: Option<&str>,
) -> Result<User> {
    if let Some(user) = find_by_email(pool, email).await? {
        return Ok(user);
    }

    let base = match preferred_nickname {
        Some(n) if !n.trim().is_empty() => n.trim().to_string(),
        _ => {
            let local = email.split('@').next().unwrap_or_default();
            if local.is_empty() {
                "reader".to_string()
            } else {
                local.to_string()
            }
        }
    };

    let mut nickname = base.clone();
    let mut n = 1;
    while nickname_taken(pool, &nickname).await? {
        n += 1;
        nickname = format!("{base}{n}");
    }

    let now = db::now_epoch();
    let role = Role::default().as_i64();
    let res = sqlx::query(
        "INSERT INTO users (nickname, email, role, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(&nickname)
    .bind(email)
    .bind(role)
    .bind(now)
    .execute(pool)
    .await?;

    tracing::info!(email, nickname = %nickname, "user provisioned");
    Ok(User {
        id: res.last_insert_rowid(),
        nickname,
        email: email.to_string(),
        role,
        created_at: now,
    })
}

async fn nickname_taken(pool: &SqlitePool, nickname: &str) -> Result<bool> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE nickname = ?")
        .bind(nickname)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

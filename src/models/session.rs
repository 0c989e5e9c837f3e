/// Rows backing the login cookie and the OIDC redirect round-trip
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Session {
    pub token: String,
    pub user_id: i64,
    pub remember: bool,
    pub created_at: i64,
    pub expires_at: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LoginState {
    pub state: String,
    pub issuer: String,
    pub remember: bool,
    pub next_url: Option<String>,
    pub created_at: i64,
}

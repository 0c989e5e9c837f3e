use anyhow::{Context, Result};
use std::env;

/// Runtime configuration gathered from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Public base URL of this instance, used to build the OAuth redirect URI.
    pub base_url: String,
    pub oauth_client_id: Option<String>,
    pub oauth_client_secret: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://librarium.db".into());
        let port = match env::var("PORT") {
            Ok(v) => v.parse().with_context(|| format!("invalid PORT: {v}"))?,
            Err(_) => 3000,
        };
        let base_url =
            env::var("BASE_URL").unwrap_or_else(|_| format!("http://localhost:{port}"));
        let oauth_client_id = env::var("OAUTH_CLIENT_ID").ok();
        let oauth_client_secret = env::var("OAUTH_CLIENT_SECRET").ok();

        Ok(Config {
            database_url,
            port,
            base_url,
            oauth_client_id,
            oauth_client_secret,
        })
    }

    /// The provider redirects back to the login route itself.
    pub fn redirect_uri(&self) -> String {
        format!("{}/login", self.base_url.trim_end_matches('/'))
    }

    /// Both halves of the OAuth client credential, when configured.
    pub fn oauth_client(&self) -> Option<(&str, &str)> {
        match (&self.oauth_client_id, &self.oauth_client_secret) {
            (Some(id), Some(secret)) => Some((id.as_str(), secret.as_str())),
            _ => None,
        }
    }
}

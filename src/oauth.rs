//! OIDC discovery, token exchange, and userinfo lookup.

use std::collections::HashMap;

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::RwLock;
use url::Url;

/// Identity providers offered on the login page. `Custom` covers any issuer
/// URL typed into the login form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provider {
    Google,
    Microsoft,
    Yahoo,
    Gitlab,
    Custom,
}

impl Provider {
    pub const KNOWN: [Provider; 4] = [
        Provider::Google,
        Provider::Microsoft,
        Provider::Yahoo,
        Provider::Gitlab,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Self::Google => "google",
            Self::Microsoft => "microsoft",
            Self::Yahoo => "yahoo",
            Self::Gitlab => "gitlab",
            Self::Custom => "custom",
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Self::Google => "Google",
            Self::Microsoft => "Microsoft",
            Self::Yahoo => "Yahoo",
            Self::Gitlab => "GitLab",
            Self::Custom => "Custom",
        }
    }

    pub fn issuer(&self) -> Option<&'static str> {
        match self {
            Self::Google => Some("https://accounts.google.com"),
            Self::Microsoft => Some("https://login.microsoftonline.com/common/v2.0"),
            Self::Yahoo => Some("https://api.login.yahoo.com"),
            Self::Gitlab => Some("https://gitlab.com"),
            Self::Custom => None,
        }
    }
}

/// Map the login form's provider field to an issuer URL. Accepts a known
/// provider key or a full https issuer URL.
pub fn resolve_issuer(input: &str) -> Option<String> {
    let input = input.trim();
    for provider in Provider::KNOWN {
        if input.eq_ignore_ascii_case(provider.as_str()) {
            return provider.issuer().map(|s| s.to_string());
        }
    }
    if input.starts_with("https://") || input.starts_with("http://") {
        return Some(input.trim_end_matches('/').to_string());
    }
    None
}

/// The subset of the discovery document this app needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderMetadata {
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub userinfo_endpoint: String,
}

/// Identity attributes fetched from the userinfo endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserInfo {
    pub email: Option<String>,
    pub preferred_username: Option<String>,
    pub name: Option<String>,
}

/// OIDC client with a per-issuer discovery cache.
pub struct OAuthManager {
    http: Client,
    discovery_cache: RwLock<HashMap<String, ProviderMetadata>>,
}

impl OAuthManager {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
            discovery_cache: RwLock::new(HashMap::new()),
        }
    }

    /// Fetch `<issuer>/.well-known/openid-configuration`, cached per issuer.
    pub async fn discover(&self, issuer: &str) -> Result<ProviderMetadata> {
        {
            let cache = self.discovery_cache.read().await;
            if let Some(meta) = cache.get(issuer) {
                return Ok(meta.clone());
            }
        }

        let url = format!(
            "{}/.well-known/openid-configuration",
            issuer.trim_end_matches('/')
        );
        let meta: ProviderMetadata = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .with_context(|| format!("invalid discovery document from {url}"))?;

        let mut cache = self.discovery_cache.write().await;
        cache.insert(issuer.to_string(), meta.clone());
        Ok(meta)
    }

    /// Exchange the authorization code for tokens; returns the access token.
    pub async fn exchange_code(
        &self,
        meta: &ProviderMetadata,
        client_id: &str,
        client_secret: &str,
        code: &str,
        redirect_uri: &str,
    ) -> Result<String> {
        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ];
        let resp: Value = self
            .http
            .post(&meta.token_endpoint)
            .form(&params)
            .send()
            .await?
            .json()
            .await?;

        resp.get("access_token")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow!("token endpoint returned no access_token: {resp}"))
    }

    pub async fn fetch_userinfo(
        &self,
        meta: &ProviderMetadata,
        access_token: &str,
    ) -> Result<UserInfo> {
        let info = self
            .http
            .get(&meta.userinfo_endpoint)
            .bearer_auth(access_token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(info)
    }
}

impl Default for OAuthManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the authorization redirect for the code flow.
pub fn authorization_url(
    meta: &ProviderMetadata,
    client_id: &str,
    redirect_uri: &str,
    state: &str,
) -> Result<Url> {
    let mut url = Url::parse(&meta.authorization_endpoint)?;
    url.query_pairs_mut()
        .append_pair("response_type", "code")
        .append_pair("client_id", client_id)
        .append_pair("scope", "openid email profile")
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("state", state);
    Ok(url)
}

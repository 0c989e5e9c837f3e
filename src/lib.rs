pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod forms;
pub mod models;
pub mod oauth;
pub mod render;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::Router;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::oauth::OAuthManager;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub oauth: Arc<OAuthManager>,
    pub config: Arc<Config>,
}

impl axum::extract::FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl axum::extract::FromRef<AppState> for Arc<OAuthManager> {
    fn from_ref(state: &AppState) -> Self {
        state.oauth.clone()
    }
}

impl axum::extract::FromRef<AppState> for Arc<Config> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

/// Build the application router with all routes and middleware attached.
pub fn app(state: AppState) -> Router {
    routes::routes()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

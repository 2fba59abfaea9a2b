//! beatschain-dp library interface
//!
//! Exposes the data provider, its backends and the HTTP router for the
//! binary and for integration testing.

pub mod api;
pub mod backends;
pub mod config;
pub mod error;
pub mod provider;

pub use crate::error::{ApiError, ApiResult};
pub use crate::provider::UnifiedDataProvider;

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<UnifiedDataProvider>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    pub chain_enabled: bool,
    pub content_enabled: bool,
}

impl AppState {
    pub fn new(provider: Arc<UnifiedDataProvider>) -> Self {
        Self {
            provider,
            startup_time: Utc::now(),
            chain_enabled: false,
            content_enabled: false,
        }
    }

    /// Record which backends are configured, for the health report
    pub fn with_backends(mut self, content_enabled: bool, chain_enabled: bool) -> Self {
        self.content_enabled = content_enabled;
        self.chain_enabled = chain_enabled;
        self
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::catalog_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        // Read-only catalog consumed by browser front ends
        .layer(CorsLayer::permissive())
        .with_state(state)
}

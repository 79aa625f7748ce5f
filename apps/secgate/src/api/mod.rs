//! # secgate HTTP API Module
//!
//! This module implements the HTTP REST API server using axum. It is a thin
//! presentation layer over one [`CardScreen`]; every privileged action goes
//! through the screen's gate.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /level` - Current security level
//! - `POST /gate` - Run the gate for a level (`{"level": "semi"}`)
//! - `POST /press` - Press the card button and wait for the outcome
//! - `GET /screen` - Current card screen state
//!
//! ## Configuration (Environment Variables)
//!
//! - `SECGATE_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*"
//!   for all (default: localhost only)

mod handlers;
mod types;

pub use handlers::{gate_handler, health_handler, level_handler, press_handler, screen_handler};
pub use types::{GateRequest, GateResponse, HealthResponse, LevelResponse, ScreenResponse};

use crate::screen::CardScreen;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use secgate_core::GateError;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state containing the card screen.
#[derive(Clone, Debug)]
pub struct AppState {
    /// The screen every request acts on. Clones share the same gate,
    /// store and published state.
    pub screen: CardScreen,
}

impl AppState {
    /// Create new app state with a screen.
    #[must_use]
    pub fn new(screen: CardScreen) -> Self {
        Self { screen }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build CORS layer from `SECGATE_CORS_ORIGINS`.
///
/// "*" allows every origin, a comma-separated list allows those origins,
/// and an unset or unusable value falls back to localhost only.
fn build_cors_layer() -> CorsLayer {
    let origins_env = std::env::var("SECGATE_CORS_ORIGINS").ok();

    match origins_env.as_deref() {
        Some("*") => {
            tracing::warn!("CORS: Allowing ALL origins (SECGATE_CORS_ORIGINS=*)");
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| {
                    let trimmed = s.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => Some(hv),
                        Err(e) => {
                            tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed.is_empty() {
                build_localhost_cors()
            } else {
                restricted_cors(allowed)
            }
        }
        None => build_localhost_cors(),
    }
}

fn build_localhost_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:3000",
        "http://localhost:8080",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:8080",
    ]
    .iter()
    .filter_map(|o| o.parse::<HeaderValue>().ok())
    .collect();

    restricted_cors(origins)
}

fn restricted_cors(origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/level", get(handlers::level_handler))
        .route("/gate", post(handlers::gate_handler))
        .route("/press", post(handlers::press_handler))
        .route("/screen", get(handlers::screen_handler))
        .layer(axum::extract::DefaultBodyLimit::max(16 * 1024))
        .layer(build_cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server.
pub async fn run_server(addr: &str, screen: CardScreen) -> Result<(), GateError> {
    let router = create_router(AppState::new(screen));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| GateError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("secgate HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| GateError::IoError(format!("Server error: {}", e)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.

use super::{
    AppState,
    types::{GateRequest, GateResponse, HealthResponse, LevelResponse, ScreenResponse},
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use secgate_core::{GateError, SecurityLevel};

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// LEVEL HANDLER
// =============================================================================

/// Get the current security level.
pub async fn level_handler(State(state): State<AppState>) -> impl IntoResponse {
    let gate = state.screen.gate();
    let response = LevelResponse {
        level: gate.current_level(),
        policy: gate.policy(),
        required_level: state.screen.required_level(),
    };

    (StatusCode::OK, Json(response))
}

// =============================================================================
// GATE HANDLER
// =============================================================================

/// Run the gate for the requested level and report the outcome.
pub async fn gate_handler(
    State(state): State<AppState>,
    Json(request): Json<GateRequest>,
) -> impl IntoResponse {
    let required: SecurityLevel = match request.level.parse() {
        Ok(level) => level,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(GateResponse::denied(None, e.to_string())),
            );
        }
    };

    let gate = state.screen.gate();
    match gate.run_async(required).await {
        Ok(()) => (
            StatusCode::OK,
            Json(GateResponse::granted(gate.current_level())),
        ),
        Err(e @ GateError::AuthorizationFailed { .. }) => (
            StatusCode::FORBIDDEN,
            Json(GateResponse::denied(
                Some(gate.current_level()),
                e.to_string(),
            )),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(GateResponse::denied(
                Some(gate.current_level()),
                e.to_string(),
            )),
        ),
    }
}

// =============================================================================
// SCREEN HANDLERS
// =============================================================================

/// Press the card button and report how that press settled.
pub async fn press_handler(State(state): State<AppState>) -> impl IntoResponse {
    let outcome = state.screen.press_and_wait().await;
    let pending = state.screen.state().is_pending();
    let level = state.screen.gate().current_level();

    let status = match &outcome {
        Ok(_) => StatusCode::OK,
        Err(GateError::AuthorizationFailed { .. }) => StatusCode::FORBIDDEN,
        Err(e) => {
            tracing::error!(event = "press_abandoned", reason = %e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let body = ScreenResponse::from_outcome(&outcome, pending, level);
    (status, Json(body))
}

/// Get the card screen state without pressing.
pub async fn screen_handler(State(state): State<AppState>) -> impl IntoResponse {
    let response =
        ScreenResponse::from_state(&state.screen.state(), state.screen.gate().current_level());
    (StatusCode::OK, Json(response))
}

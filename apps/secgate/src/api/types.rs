//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.

use crate::screen::{PressOutcome, ScreenState, error_text};
use secgate_core::{Card, LevelPolicy, SecurityLevel};
use serde::{Deserialize, Serialize};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// LEVEL RESPONSE
// =============================================================================

/// Current security level and how it is compared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelResponse {
    pub level: SecurityLevel,
    pub policy: LevelPolicy,
    pub required_level: SecurityLevel,
}

// =============================================================================
// GATE REQUEST/RESPONSE
// =============================================================================

/// Ask the gate for a level. The level is a name (`none`, `semi`, `full`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateRequest {
    pub level: String,
}

/// Gate outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateResponse {
    pub granted: bool,
    /// Level held after the gate resolved.
    pub level: Option<SecurityLevel>,
    pub error: Option<String>,
}

impl GateResponse {
    pub fn granted(level: SecurityLevel) -> Self {
        Self {
            granted: true,
            level: Some(level),
            error: None,
        }
    }

    pub fn denied(level: Option<SecurityLevel>, msg: impl Into<String>) -> Self {
        Self {
            granted: false,
            level,
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// SCREEN RESPONSE
// =============================================================================

/// Card screen state as seen by a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenResponse {
    pub cards: Vec<Card>,
    pub error: Option<String>,
    pub pending: bool,
    pub level: SecurityLevel,
}

impl ScreenResponse {
    pub fn from_state(state: &ScreenState, level: SecurityLevel) -> Self {
        Self {
            cards: state.cards.clone(),
            error: state.has_error().then(|| state.error.clone()),
            pending: state.is_pending(),
            level,
        }
    }

    /// Build the response for one press from that press's own outcome.
    pub fn from_outcome(outcome: &PressOutcome, pending: bool, level: SecurityLevel) -> Self {
        let (cards, error) = match outcome {
            Ok(cards) => (cards.clone(), None),
            Err(e) => (Vec::new(), Some(error_text(e))),
        };
        Self {
            cards,
            error,
            pending,
            level,
        }
    }
}

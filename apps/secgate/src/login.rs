//! # Login Service
//!
//! How the gate authenticates for a security level it does not hold yet.
//!
//! The gate only sees the [`LoginService`] trait. [`SimulatedLogin`] stands
//! in for a real round trip: it waits a fixed delay and then resolves
//! according to a fixed per-level outcome table. By default `none` and
//! `semi` attempts succeed and `full` attempts fail.

use crate::continuation::Continuations;
use secgate_core::{DEFAULT_LOGIN_DELAY_MS, GateError, SecurityLevel};
use serde::{Deserialize, Serialize};
use std::time::Duration;

// =============================================================================
// LOGIN SERVICE TRAIT
// =============================================================================

/// An asynchronous authentication attempt for a required level.
///
/// Implementations must return without running either continuation and
/// must later run exactly one of them. Resolving from inside `attempt`
/// would re-enter the caller on its own stack.
pub trait LoginService: Send + Sync {
    /// Start a login for `required`. On success the gate promotes the
    /// store; the service itself never touches it.
    fn attempt(&self, required: SecurityLevel, continuations: Continuations);
}

// =============================================================================
// SIMULATED OUTCOMES
// =============================================================================

/// Fixed result of a simulated login, per required level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoginOutcomes {
    pub none: bool,
    pub semi: bool,
    pub full: bool,
}

impl Default for LoginOutcomes {
    fn default() -> Self {
        Self {
            none: true,
            semi: true,
            full: false,
        }
    }
}

impl LoginOutcomes {
    /// Outcomes where every attempt succeeds.
    #[must_use]
    pub const fn always_succeed() -> Self {
        Self {
            none: true,
            semi: true,
            full: true,
        }
    }

    /// Outcomes where every attempt fails.
    #[must_use]
    pub const fn always_fail() -> Self {
        Self {
            none: false,
            semi: false,
            full: false,
        }
    }

    /// Whether an attempt for `level` succeeds.
    #[must_use]
    pub const fn succeeds(&self, level: SecurityLevel) -> bool {
        match level {
            SecurityLevel::None => self.none,
            SecurityLevel::Semi => self.semi,
            SecurityLevel::Full => self.full,
        }
    }
}

// =============================================================================
// SIMULATED LOGIN
// =============================================================================

/// Login stand-in: fixed delay, fixed outcome per level.
#[derive(Debug, Clone)]
pub struct SimulatedLogin {
    delay: Duration,
    outcomes: LoginOutcomes,
}

impl Default for SimulatedLogin {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(DEFAULT_LOGIN_DELAY_MS),
            LoginOutcomes::default(),
        )
    }
}

impl SimulatedLogin {
    /// Create a simulated login with the given delay and outcome table.
    #[must_use]
    pub fn new(delay: Duration, outcomes: LoginOutcomes) -> Self {
        Self { delay, outcomes }
    }
}

impl LoginService for SimulatedLogin {
    /// Must be called from within a Tokio runtime.
    fn attempt(&self, required: SecurityLevel, continuations: Continuations) {
        let delay = self.delay;
        let succeed = self.outcomes.succeeds(required);

        tracing::info!(
            event = "login_started",
            required = %required,
            delay_ms = delay.as_millis() as u64,
            "Opening auth page for {} secure",
            required
        );

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if succeed {
                tracing::info!(event = "login_succeeded", required = %required);
                continuations.succeed();
            } else {
                tracing::warn!(
                    event = "login_failed",
                    required = %required,
                    "Login refused for {} secure",
                    required
                );
                continuations.fail(GateError::authorization_failed(required));
            }
        });
    }
}

// =============================================================================
// TESTS
// =============================================================================

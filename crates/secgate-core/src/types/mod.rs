//! # Core Type Definitions
//!
//! This module contains the core types shared by every secgate surface:
//! - The authorization tier (`SecurityLevel`)
//! - The protected resource (`Card`)
//! - Error types (`GateError`)
//!
//! ## Ordering
//!
//! `SecurityLevel` implements `Ord` (`None < Semi < Full`) so that an
//! ordered policy can be expressed. The default gate policy does not use
//! the ordering; see [`crate::policy::LevelPolicy`].

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// SECURITY LEVEL
// =============================================================================

/// A named authorization tier a caller must reach to run a gated action.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum SecurityLevel {
    /// No authorization at all.
    None,
    /// Partial authorization (the level a process starts with).
    #[default]
    Semi,
    /// Full authorization, required for card data.
    Full,
}

impl SecurityLevel {
    /// All levels, lowest first.
    pub const ALL: [SecurityLevel; 3] = [Self::None, Self::Semi, Self::Full];

    /// Get the canonical lowercase name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Semi => "semi",
            Self::Full => "full",
        }
    }
}

impl std::fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for SecurityLevel {
    type Err = GateError;

    /// Parse a level name. Accepts `none`/`semi`/`full` in any case, and the
    /// long forms `noneSecure`/`semiSecure`/`fullSecure`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let short = normalized
            .strip_suffix("secure")
            .map(|p| p.trim_end_matches(['-', '_']))
            .unwrap_or(normalized.as_str());

        match short {
            "none" => Ok(Self::None),
            "semi" => Ok(Self::Semi),
            "full" => Ok(Self::Full),
            _ => Err(GateError::InvalidLevel(s.to_string())),
        }
    }
}

// =============================================================================
// CARD
// =============================================================================

/// A credit-card-like number. No internal structure is enforced.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Card(pub String);

impl Card {
    /// Create a new card from a string.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the card number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Mask every digit except the last four. Separators are kept.
    #[must_use]
    pub fn masked(&self) -> String {
        let digits = self.0.chars().filter(char::is_ascii_digit).count();
        let keep_from = digits.saturating_sub(4);

        let mut seen = 0usize;
        self.0
            .chars()
            .map(|c| {
                if c.is_ascii_digit() {
                    seen += 1;
                    if seen <= keep_from {
                        return '*';
                    }
                }
                c
            })
            .collect()
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in secgate operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    /// The login attempt for the required level did not succeed.
    #[error("Authorization failed for {required} level: {reason}")]
    AuthorizationFailed {
        required: SecurityLevel,
        reason: String,
    },

    /// A security level name could not be parsed.
    #[error("Invalid security level: {0:?}")]
    InvalidLevel(String),

    /// The configuration is malformed or out of bounds.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),

    /// A pending operation was dropped before it resolved.
    #[error("Operation abandoned before it resolved")]
    Abandoned,
}

impl GateError {
    /// Build the failure reported when a login for `required` is refused.
    #[must_use]
    pub fn authorization_failed(required: SecurityLevel) -> Self {
        Self::AuthorizationFailed {
            required,
            reason: format!("Couldn't authorize for {} secure.", required),
        }
    }

    /// Check whether this is an authorization failure.
    #[must_use]
    pub fn is_authorization_failure(&self) -> bool {
        matches!(self, Self::AuthorizationFailed { .. })
    }
}

// =============================================================================
// TESTS
// =============================================================================

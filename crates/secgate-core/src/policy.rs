//! # Level Policy
//!
//! Decides whether the current security level satisfies a requirement.
//!
//! The gate historically compared levels for exact equality: a `Full`
//! session does not satisfy a `Semi` requirement, and a `Semi` session
//! asked for `Full` must log in again. `Exact` keeps that behavior and is
//! the default. `AtLeast` treats the levels as ordered
//! (`None < Semi < Full`) and is opt-in.

use crate::SecurityLevel;
use serde::{Deserialize, Serialize};

/// How the gate compares the current level with a required level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LevelPolicy {
    /// Only the identical level satisfies the requirement.
    #[default]
    Exact,
    /// The identical level or any higher one satisfies the requirement.
    AtLeast,
}

impl LevelPolicy {
    /// Check whether `current` satisfies `required` under this policy.
    #[must_use]
    pub fn satisfies(&self, current: SecurityLevel, required: SecurityLevel) -> bool {
        match self {
            Self::Exact => current == required,
            Self::AtLeast => current >= required,
        }
    }

    /// Get the policy name as used in configuration files.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::AtLeast => "at_least",
        }
    }
}

impl std::fmt::Display for LevelPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

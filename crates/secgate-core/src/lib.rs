//! # secgate-core
//!
//! Security levels and the level store behind the secgate authorization
//! gate - THE LOGIC.
//!
//! ## Architecture
//!
//! This crate holds only the synchronous pieces:
//! - `types` → `SecurityLevel`, `Card`, `GateError`
//! - `store` → the shared current level (`LevelStore`)
//! - `policy` → how a current level is compared with a required one
//! - `primitives` → defaults for the simulated collaborators
//!
//! The gate itself, the login service and the data service are
//! asynchronous and live in the `secgate` app crate.
//!
//! ## Architectural Constraints
//!
//! - Has NO async, NO runtime, NO network dependencies
//! - Never logs; outcomes are returned to the caller

// =============================================================================
// MODULES
// =============================================================================

pub mod policy;
pub mod primitives;
pub mod store;
pub mod types;

// =============================================================================
// RE-EXPORTS
// =============================================================================

pub use policy::LevelPolicy;
pub use primitives::{DEFAULT_FETCH_DELAY_MS, DEFAULT_LOGIN_DELAY_MS, PROTECTED_CARDS};
pub use store::LevelStore;
pub use types::{Card, GateError, SecurityLevel};

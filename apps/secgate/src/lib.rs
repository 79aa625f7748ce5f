//! # secgate
//!
//! The secured-action gate and everything that drives it.
//!
//! ## Layout
//!
//! - `continuation` → the success/failure pair collaborators resolve
//! - `login` → `LoginService` and its simulated implementation
//! - `data` → `DataService` and the simulated card service
//! - `gate` → `SecuredGate`, the only way into a privileged action
//! - `screen` → `CardScreen`, the card button binding and its observable state
//! - `config` → TOML/env configuration and wiring
//! - `api` → axum HTTP surface
//! - `cli` → clap command surface

pub mod api;
pub mod cli;
pub mod config;
pub mod continuation;
pub mod data;
pub mod gate;
pub mod login;
pub mod screen;

pub use config::GateConfig;
pub use continuation::Continuations;
pub use data::{DataService, SimulatedCardService, fetch_async};
pub use gate::SecuredGate;
pub use login::{LoginOutcomes, LoginService, SimulatedLogin};
pub use screen::{CardScreen, PendingPress, PressOutcome, ScreenState};

//! # Configuration
//!
//! Settings for the simulated collaborators and the card screen.
//!
//! ## Sources (later wins)
//!
//! 1. Built-in defaults
//! 2. A TOML file passed with `--config`
//! 3. Environment variables:
//!    - `SECGATE_INITIAL_LEVEL`: level the store starts at
//!    - `SECGATE_LOGIN_DELAY_MS`: simulated login latency
//!    - `SECGATE_FETCH_DELAY_MS`: simulated card fetch latency
//! 4. The `--initial-level` CLI flag
//!
//! ## Example
//!
//! ```toml
//! initial_level = "semi"
//! required_level = "full"
//! policy = "exact"
//! login_delay_ms = 2000
//! fetch_delay_ms = 2000
//!
//! [login]
//! none = true
//! semi = true
//! full = false
//! ```

use crate::data::SimulatedCardService;
use crate::gate::SecuredGate;
use crate::login::{LoginOutcomes, SimulatedLogin};
use crate::screen::CardScreen;
use secgate_core::{
    DEFAULT_FETCH_DELAY_MS, DEFAULT_LOGIN_DELAY_MS, GateError, LevelPolicy, LevelStore,
    SecurityLevel,
    primitives::{MAX_CONFIG_FILE_SIZE, MAX_SIMULATED_DELAY_MS},
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Complete secgate configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GateConfig {
    /// Level the store holds at process start.
    pub initial_level: SecurityLevel,
    /// Level the card screen requires.
    pub required_level: SecurityLevel,
    /// How the gate compares levels.
    pub policy: LevelPolicy,
    /// Simulated login latency in milliseconds.
    pub login_delay_ms: u64,
    /// Simulated fetch latency in milliseconds.
    pub fetch_delay_ms: u64,
    /// Simulated login outcome per level.
    pub login: LoginOutcomes,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            initial_level: SecurityLevel::Semi,
            required_level: SecurityLevel::Full,
            policy: LevelPolicy::Exact,
            login_delay_ms: DEFAULT_LOGIN_DELAY_MS,
            fetch_delay_ms: DEFAULT_FETCH_DELAY_MS,
            login: LoginOutcomes::default(),
        }
    }
}

impl GateConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, GateError> {
        let config: Self = toml::from_str(text)
            .map_err(|e| GateError::ConfigError(format!("Invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self, GateError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            GateError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;

        if !metadata.is_file() {
            return Err(GateError::IoError(format!(
                "Config path '{}' is not a regular file",
                path.display()
            )));
        }

        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(GateError::ConfigError(format!(
                "Config size {} bytes exceeds maximum allowed {} bytes",
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            )));
        }

        let text = std::fs::read_to_string(path).map_err(|e| {
            GateError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;

        Self::from_toml_str(&text)
    }

    /// Apply `SECGATE_*` overrides from the process environment.
    pub fn apply_env(self) -> Result<Self, GateError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `SECGATE_*` overrides read through `lookup`.
    ///
    /// Empty values are ignored.
    pub fn apply_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, GateError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(level) = get("SECGATE_INITIAL_LEVEL") {
            self.initial_level = level.parse()?;
        }
        if let Some(ms) = get("SECGATE_LOGIN_DELAY_MS") {
            self.login_delay_ms = parse_millis("SECGATE_LOGIN_DELAY_MS", &ms)?;
        }
        if let Some(ms) = get("SECGATE_FETCH_DELAY_MS") {
            self.fetch_delay_ms = parse_millis("SECGATE_FETCH_DELAY_MS", &ms)?;
        }

        self.validate()?;
        Ok(self)
    }

    /// Check bounds.
    pub fn validate(&self) -> Result<(), GateError> {
        for (name, value) in [
            ("login_delay_ms", self.login_delay_ms),
            ("fetch_delay_ms", self.fetch_delay_ms),
        ] {
            if value > MAX_SIMULATED_DELAY_MS {
                return Err(GateError::ConfigError(format!(
                    "{} = {} exceeds maximum {}",
                    name, value, MAX_SIMULATED_DELAY_MS
                )));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn login_delay(&self) -> Duration {
        Duration::from_millis(self.login_delay_ms)
    }

    #[must_use]
    pub fn fetch_delay(&self) -> Duration {
        Duration::from_millis(self.fetch_delay_ms)
    }

    /// Wire a fresh store, the simulated login and the gate.
    #[must_use]
    pub fn build_gate(&self) -> SecuredGate {
        let login = SimulatedLogin::new(self.login_delay(), self.login);
        SecuredGate::new(LevelStore::new(self.initial_level), Arc::new(login))
            .with_policy(self.policy)
    }

    /// Wire the complete card screen.
    #[must_use]
    pub fn build_screen(&self) -> CardScreen {
        CardScreen::new(
            self.build_gate(),
            Arc::new(SimulatedCardService::new(self.fetch_delay())),
            self.required_level,
        )
    }
}

fn parse_millis(key: &str, value: &str) -> Result<u64, GateError> {
    value
        .trim()
        .parse()
        .map_err(|_| GateError::ConfigError(format!("{} must be an integer, got {:?}", key, value)))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_observed_behavior() {
        let config = GateConfig::default();
        assert_eq!(config.initial_level, SecurityLevel::Semi);
        assert_eq!(config.required_level, SecurityLevel::Full);
        assert_eq!(config.policy, LevelPolicy::Exact);
        assert_eq!(config.login_delay(), Duration::from_secs(2));
        assert_eq!(config.fetch_delay(), Duration::from_secs(2));
        assert!(!config.login.full);
    }

    #[test]
    fn empty_document_gives_defaults() {
        assert_eq!(
            GateConfig::from_toml_str("").expect("parse"),
            GateConfig::default()
        );
    }

    #[test]
    fn partial_document_overrides_fields() {
        let config = GateConfig::from_toml_str(
            r#"
            initial_level = "none"
            policy = "at_least"
            login_delay_ms = 5

            [login]
            full = true
            "#,
        )
        .expect("parse");

        assert_eq!(config.initial_level, SecurityLevel::None);
        assert_eq!(config.policy, LevelPolicy::AtLeast);
        assert_eq!(config.login_delay_ms, 5);
        assert_eq!(config.fetch_delay_ms, DEFAULT_FETCH_DELAY_MS);
        assert!(config.login.full);
        assert!(config.login.semi);
    }

    #[test]
    fn unknown_keys_rejected() {
        let err = GateConfig::from_toml_str("retries = 3").expect_err("should fail");
        assert!(matches!(err, GateError::ConfigError(_)));
    }

    #[test]
    fn unknown_level_rejected() {
        assert!(GateConfig::from_toml_str(r#"initial_level = "root""#).is_err());
    }

    #[test]
    fn oversized_delay_rejected() {
        let err = GateConfig::from_toml_str("fetch_delay_ms = 600000").expect_err("should fail");
        assert!(err.to_string().contains("fetch_delay_ms"));
    }

    #[test]
    fn env_overrides_apply() {
        let config = GateConfig::default()
            .apply_overrides(env(&[
                ("SECGATE_INITIAL_LEVEL", "fullSecure"),
                ("SECGATE_LOGIN_DELAY_MS", " 10 "),
                ("SECGATE_FETCH_DELAY_MS", ""),
            ]))
            .expect("overrides");

        assert_eq!(config.initial_level, SecurityLevel::Full);
        assert_eq!(config.login_delay_ms, 10);
        assert_eq!(config.fetch_delay_ms, DEFAULT_FETCH_DELAY_MS);
    }

    #[test]
    fn env_bad_number_rejected() {
        let err = GateConfig::default()
            .apply_overrides(env(&[("SECGATE_LOGIN_DELAY_MS", "soon")]))
            .expect_err("should fail");
        assert!(err.to_string().contains("SECGATE_LOGIN_DELAY_MS"));
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "initial_level = \"none\"").expect("write");

        let config = GateConfig::load(file.path()).expect("load");
        assert_eq!(config.initial_level, SecurityLevel::None);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = GateConfig::load(&dir.path().join("absent.toml")).expect_err("should fail");
        assert!(matches!(err, GateError::IoError(_)));
    }

    #[test]
    fn load_directory_is_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        assert!(matches!(
            GateConfig::load(dir.path()),
            Err(GateError::IoError(_))
        ));
    }

    #[tokio::test]
    async fn build_gate_uses_initial_level_and_policy() {
        let config = GateConfig {
            initial_level: SecurityLevel::None,
            policy: LevelPolicy::AtLeast,
            ..GateConfig::default()
        };
        let gate = config.build_gate();
        assert_eq!(gate.current_level(), SecurityLevel::None);
        assert_eq!(gate.policy(), LevelPolicy::AtLeast);

        let screen = config.build_screen();
        assert_eq!(screen.required_level(), SecurityLevel::Full);
    }
}

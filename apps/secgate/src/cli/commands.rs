//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::api;
use crate::config::GateConfig;
use crate::screen::error_text;
use secgate_core::{Card, GateError, SecurityLevel};
use std::path::Path;

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Build the effective configuration: file (if any), then environment,
/// then the `--initial-level` flag.
pub fn load_config(
    path: Option<&Path>,
    initial_level: Option<SecurityLevel>,
) -> Result<GateConfig, GateError> {
    let config = match path {
        Some(p) => {
            tracing::debug!("Loading configuration from {:?}", p);
            GateConfig::load(p)?
        }
        None => GateConfig::default(),
    };

    let mut config = config.apply_env()?;
    if let Some(level) = initial_level {
        config.initial_level = level;
    }
    Ok(config)
}

// =============================================================================
// PRESS COMMAND
// =============================================================================

/// Press the card button once and print how the press settled.
pub async fn cmd_press(
    config: &GateConfig,
    json_mode: bool,
    reveal: bool,
) -> Result<(), GateError> {
    let screen = config.build_screen();

    if !json_mode {
        println!(
            "Requesting secret cards (requires {} secure, currently {})...",
            screen.required_level(),
            screen.gate().current_level()
        );
    }

    let outcome = screen.press_and_wait().await;
    let level = screen.gate().current_level();

    if json_mode {
        let output = serde_json::json!({
            "level": level,
            "cards": outcome.as_ref().map(|c| card_lines(c, reveal)).unwrap_or_default(),
            "error": outcome.as_ref().err().map(error_text),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
    } else {
        match &outcome {
            Ok(cards) => {
                for line in card_lines(cards, reveal) {
                    println!("{} credit card", line);
                }
                println!();
                println!("Security level: {}", level);
            }
            Err(e) => println!("{}", error_text(e)),
        }
    }

    outcome.map(|_| ())
}

fn card_lines(cards: &[Card], reveal: bool) -> Vec<String> {
    cards
        .iter()
        .map(|c| if reveal { c.to_string() } else { c.masked() })
        .collect()
}

// =============================================================================
// GATE COMMAND
// =============================================================================

/// Run the gate for `level` and report the outcome.
pub async fn cmd_gate(config: &GateConfig, json_mode: bool, level: &str) -> Result<(), GateError> {
    let required: SecurityLevel = level.parse()?;
    let gate = config.build_gate();
    let before = gate.current_level();

    let outcome = gate.run_async(required).await;
    let after = gate.current_level();

    if json_mode {
        let output = serde_json::json!({
            "required": required,
            "before": before,
            "after": after,
            "granted": outcome.is_ok(),
            "error": outcome.as_ref().err().map(|e| e.to_string()),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
    } else {
        match &outcome {
            Ok(()) => println!("Granted: {} secure (was {})", after, before),
            Err(e) => println!("Denied: {}", e),
        }
    }

    outcome
}

// =============================================================================
// LEVEL COMMAND
// =============================================================================

/// Show the starting level and gate settings.
pub fn cmd_level(config: &GateConfig, json_mode: bool) -> Result<(), GateError> {
    if json_mode {
        let output = serde_json::json!({
            "initial_level": config.initial_level,
            "required_level": config.required_level,
            "policy": config.policy,
            "login_delay_ms": config.login_delay_ms,
            "fetch_delay_ms": config.fetch_delay_ms,
            "login": config.login,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!("secgate Security Level");
    println!("======================");
    println!("Initial level:  {}", config.initial_level);
    println!("Required level: {}", config.required_level);
    println!("Policy:         {}", config.policy);
    println!();
    println!("Simulated login ({} ms):", config.login_delay_ms);
    for level in SecurityLevel::ALL {
        let verdict = if config.login.succeeds(level) {
            "succeeds"
        } else {
            "fails"
        };
        println!("  {:<5} {}", level, verdict);
    }
    println!("Simulated fetch: {} ms", config.fetch_delay_ms);

    Ok(())
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(config: &GateConfig, host: &str, port: u16) -> Result<(), GateError> {
    let screen = config.build_screen();

    println!("secgate Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:           {}", host);
    println!("  Port:           {}", port);
    println!("  Initial level:  {}", config.initial_level);
    println!("  Required level: {}", config.required_level);
    println!();
    println!("Endpoints:");
    println!("  GET  /health - Health check");
    println!("  GET  /level  - Current security level");
    println!("  POST /gate   - Run the gate for a level");
    println!("  POST /press  - Press the card button");
    println!("  GET  /screen - Card screen state");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let addr = format!("{}:{}", host, port);
    api::run_server(&addr, screen).await
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn fast_config() -> GateConfig {
        GateConfig {
            login_delay_ms: 0,
            fetch_delay_ms: 0,
            ..GateConfig::default()
        }
    }

    #[test]
    fn load_config_flag_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "initial_level = \"none\"\nrequired_level = \"semi\"").expect("write");

        let config =
            load_config(Some(file.path()), Some(SecurityLevel::Full)).expect("load config");

        assert_eq!(config.initial_level, SecurityLevel::Full);
        assert_eq!(config.required_level, SecurityLevel::Semi);
    }

    #[test]
    fn card_lines_mask_unless_revealed() {
        let cards = [Card::new("1221 3113 3113 3133")];
        assert_eq!(card_lines(&cards, false), vec!["**** **** **** 3133"]);
        assert_eq!(card_lines(&cards, true), vec!["1221 3113 3113 3133"]);
    }

    #[tokio::test]
    async fn press_with_default_outcomes_is_denied() {
        let result = cmd_press(&fast_config(), true, false).await;
        assert_eq!(
            result,
            Err(GateError::authorization_failed(SecurityLevel::Full))
        );
    }

    #[tokio::test]
    async fn press_at_full_succeeds() {
        let config = GateConfig {
            initial_level: SecurityLevel::Full,
            ..fast_config()
        };
        assert!(cmd_press(&config, true, true).await.is_ok());
    }

    #[tokio::test]
    async fn gate_semi_from_none_is_granted() {
        let config = GateConfig {
            initial_level: SecurityLevel::None,
            ..fast_config()
        };
        assert!(cmd_gate(&config, true, "semi").await.is_ok());
    }

    #[tokio::test]
    async fn gate_rejects_unknown_level() {
        assert!(matches!(
            cmd_gate(&fast_config(), true, "root").await,
            Err(GateError::InvalidLevel(_))
        ));
    }

    #[test]
    fn level_prints_without_error() {
        assert!(cmd_level(&GateConfig::default(), false).is_ok());
        assert!(cmd_level(&GateConfig::default(), true).is_ok());
    }
}

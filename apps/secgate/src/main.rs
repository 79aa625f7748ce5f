//! # secgate - Secured-Action Gate
//!
//! The main binary for the secgate demo.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  apps/secgate (THE BINARY)               │
//! │                                                          │
//! │   ┌─────────────┐            ┌─────────────┐             │
//! │   │    CLI      │            │  HTTP API   │             │
//! │   │   (clap)    │            │   (axum)    │             │
//! │   └──────┬──────┘            └──────┬──────┘             │
//! │          └────────────┬─────────────┘                    │
//! │                       ▼                                  │
//! │   CardScreen ──► SecuredGate ──► LoginService            │
//! │        │              │                                  │
//! │        ▼              ▼                                  │
//! │   DataService    ┌──────────────┐                        │
//! │                  │ secgate-core │                        │
//! │                  │ (THE LOGIC)  │                        │
//! │                  └──────────────┘                        │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Press the card button (fails by default: full-secure login is refused)
//! secgate press
//!
//! # Start at full and reveal the cards
//! secgate -L full press --reveal
//!
//! # Ask the gate for a level directly
//! secgate gate --level semi
//!
//! # Start the HTTP server
//! secgate server --host 0.0.0.0 --port 8080
//! ```

use clap::Parser;
use secgate::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // SECGATE_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("SECGATE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "secgate=info,tower_http=info".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the secgate startup banner.
fn print_banner() {
    println!(
        r#"
  ┌─┐┌─┐┌─┐┌─┐┌─┐┌┬┐┌─┐
  └─┐├┤ │  │ ┬├─┤ │ ├┤
  └─┘└─┘└─┘└─┘┴ ┴ ┴ └─┘

  Secured-Action Gate v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}

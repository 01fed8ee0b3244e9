//! # Memory Score - Brand Memory Diagnostic
//!
//! The main binary for the Memory Score engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │          apps/memscore (THE BINARY)          │
//! │                                              │
//! │  ┌─────────────┐        ┌────────────────┐   │
//! │  │    CLI      │        │  Config/Input  │   │
//! │  │   (clap)    │        │  (toml, json)  │   │
//! │  └──────┬──────┘        └───────┬────────┘   │
//! │         └───────────┬───────────┘            │
//! │                     ▼                        │
//! │            ┌─────────────────┐               │
//! │            │  memscore-core  │               │
//! │            │  (THE LOGIC)    │               │
//! │            └─────────────────┘               │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! memscore stages
//! memscore score -i metrics.json
//! memscore decay --score 55 --rounding up
//! memscore compare -i metrics.json --competitor rival.json --name "Rival"
//! memscore --schema dynamic report -i weighted.json
//! ```

use clap::Parser;
use memscore::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    // MEMSCORE_LOG_FORMAT=json switches to machine-parseable output.
    let log_format = std::env::var("MEMSCORE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "memscore=info".into());

    // Logs go to stderr so stdout carries only command output.
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

    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Display startup banner (never in JSON mode)
    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    // Execute command
    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the Memory Score startup banner.
fn print_banner() {
    println!(
        r#"
  MEMORY SCORE v{}

  Create • Expand • Strengthen • Retrieve • Reinstate • Defend
"#,
        env!("CARGO_PKG_VERSION")
    );
}

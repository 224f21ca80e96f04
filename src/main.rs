//! FitFlow API gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶  http::server ──▶ http::handlers ──▶ analysis
//!                      (request id,      (validation,        (prompts,
//!                       limits, CORS)     feature flag)       payload checks)
//!                                                                 │
//!                                                                 ▼
//!     Client Response                                    resilience::invoker
//!     ◀──────────────  http::response ◀──────────────── (retry 429/503 with
//!                      (status mapping)                   capped backoff)
//!                                                                 │
//!                                                                 ▼
//!                                                            llm::client ──▶ Groq API
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use fitflow_gateway::config::loader::{self, CliOverrides};
use fitflow_gateway::lifecycle::startup;
use fitflow_gateway::observability::logging;

#[derive(Parser)]
#[command(name = "fitflow-gateway")]
#[command(about = "API gateway for FitFlow's AI food, form and chat features", long_about = None)]
struct Cli {
    /// Path to a TOML config file; defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address (e.g. 127.0.0.1:5000).
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match loader::read(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    logging::init(&config.observability.log_level);
    tracing::info!("fitflow-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    let overrides = CliOverrides {
        bind_address: cli.bind,
    };
    let config = match loader::finalize(config, |key| std::env::var(key).ok(), &overrides) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = startup::run(config).await {
        tracing::error!(error = %e, "Gateway failed");
        return ExitCode::FAILURE;
    }

    tracing::info!("Shutdown complete");
    ExitCode::SUCCESS
}

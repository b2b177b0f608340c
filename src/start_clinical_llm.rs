//! Startup helpers for the clinical language-model server.

use std::process::ExitCode;

use crate::llm::core::config::LlmConfig;
use crate::server::{self, AppState};

/// Environment variable overriding the listening port.
pub const PORT_ENV: &str = "CLINICAL_LLM_PORT";

/// Load configuration and models, then serve until Ctrl-C.
///
/// # Returns
/// `ExitCode::SUCCESS` on graceful shutdown, `1` on failure.
#[must_use]
pub fn run() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting Clinical LLM v{}", env!("CARGO_PKG_VERSION"));

    let config = match LlmConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {e}");
            return ExitCode::from(1);
        }
    };
    tracing::info!("Inference endpoint: {}", config.inference.base_url);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    let port = get_port();

    let state = match rt.block_on(AppState::new(&config)) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to load models: {e}");
            return ExitCode::from(1);
        }
    };

    if let Err(e) = rt.block_on(server::run_server_with_shutdown(state, port, shutdown_signal())) {
        tracing::error!("Server error: {e}");
        return ExitCode::from(1);
    }

    tracing::info!("Server stopped");
    ExitCode::SUCCESS
}

/// Get configured server port.
#[must_use]
pub fn get_port() -> u16 {
    parse_port(std::env::var(PORT_ENV).ok().as_deref())
}

fn parse_port(value: Option<&str>) -> u16 {
    value
        .and_then(|p| p.trim().parse().ok())
        .unwrap_or(server::DEFAULT_PORT)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        return;
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_port() {
        assert_eq!(parse_port(Some("8000")), 8000);
        assert_eq!(parse_port(Some(" 8001 ")), 8001);
        assert_eq!(parse_port(Some("not-a-port")), server::DEFAULT_PORT);
        assert_eq!(parse_port(None), server::DEFAULT_PORT);
    }
}

pub mod core;
pub mod providers;
pub mod server;

use crate::core::config::AppConfig;
use crate::core::{ProfitCalculator, TracingDiagnostics};
use crate::providers::mfapi::MfApiProvider;
use crate::server::AppState;
use crate::server::handlers::ProfitResponse;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::debug;

pub enum AppCommand {
    Serve {
        host: Option<String>,
        port: Option<u16>,
    },
    Profit {
        scheme_code: String,
        start_date: String,
        end_date: String,
        capital: f64,
    },
}

/// Wires the mfapi provider and tracing diagnostics into a calculator.
pub fn build_calculator(config: &AppConfig) -> Result<ProfitCalculator> {
    let provider = MfApiProvider::from_config(&config.providers.mfapi)?;
    Ok(ProfitCalculator::new(
        Arc::new(provider),
        Arc::new(TracingDiagnostics),
    ))
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    let mut config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let calculator = build_calculator(&config)?;

    match command {
        AppCommand::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            server::serve(&config.server, AppState { calculator }).await
        }
        AppCommand::Profit {
            scheme_code,
            start_date,
            end_date,
            capital,
        } => {
            let profit = calculator
                .calculate_profit(&scheme_code, &start_date, &end_date, capital)
                .await
                .context(server::error::PROFIT_FAILED_MESSAGE)?;
            let output = serde_json::to_string(&ProfitResponse { profit })?;
            println!("{output}");
            Ok(())
        }
    }
}

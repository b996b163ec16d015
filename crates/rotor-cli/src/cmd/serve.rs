use anyhow::Context;
use gemini_agent::GeminiClient;
use rotor_core::config::{Config, WarnLevel};
use rotor_server::parser::GeminiParser;
use rotor_server::AppState;
use std::sync::Arc;

/// Load the dataset, restore the snapshot, and run rotation plus the HTTP
/// API until Ctrl-C.
pub fn run(config: &Config) -> anyhow::Result<()> {
    for w in config.validate() {
        if w.level == WarnLevel::Warning {
            tracing::warn!("{}", w.message);
        }
    }
    config.ensure_valid()?;

    let rotor = Arc::new(super::row::open(config)?);
    let state = rotor.state();
    tracing::info!(
        dataset = %rotor.dataset().source().display(),
        rows = state.total,
        index = state.index,
        snapshot = %config.state_path.display(),
        "dataset loaded"
    );

    let client = GeminiClient::new(config.gemini.api_key.clone(), config.gemini.model.clone());
    let app_state = AppState::new(Arc::clone(&rotor), Arc::new(GeminiParser::new(client)));

    let rt = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    rt.block_on(rotor_server::serve(app_state, config))
}

use anyhow::Context;
use clap::Args;
use rotor_core::config::{parse_origins, Config};
use std::path::PathBuf;

/// Flags shared by every subcommand. Each one can also come from the
/// environment and wins over the config file.
#[derive(Args, Debug, Default)]
pub struct Overrides {
    /// YAML config file (defaults apply when omitted)
    #[arg(long, global = true, env = "ROTOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// CSV dataset to rotate over
    #[arg(long = "csv", global = true, env = "CSV_PATH")]
    pub csv_path: Option<PathBuf>,

    /// Snapshot file for cursor and conditions
    #[arg(long = "state", global = true, env = "STATE_PATH")]
    pub state_path: Option<PathBuf>,

    /// Seconds between ticks
    #[arg(long = "interval", global = true, env = "UPDATE_INTERVAL_SECONDS")]
    pub update_interval_secs: Option<u64>,

    /// Comma-separated CORS origins; `*` allows any
    #[arg(long, global = true, env = "ALLOWED_ORIGINS")]
    pub allowed_origins: Option<String>,

    /// Gemini API key
    #[arg(long, global = true, env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Gemini model name
    #[arg(long, global = true, env = "GEMINI_MODEL")]
    pub model: Option<String>,

    /// Address to bind
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Port to bind
    #[arg(long, global = true, env = "PORT")]
    pub port: Option<u16>,
}

impl Overrides {
    /// Config file (if any) with flag and environment overrides applied.
    pub fn resolve(&self) -> anyhow::Result<Config> {
        let mut config =
            Config::load_or_default(self.config.as_deref()).context("failed to load config")?;
        if let Some(p) = &self.csv_path {
            config.dataset_path = Some(p.clone());
        }
        if let Some(p) = &self.state_path {
            config.state_path = p.clone();
        }
        if let Some(secs) = self.update_interval_secs {
            config.update_interval_secs = secs;
        }
        if let Some(raw) = &self.allowed_origins {
            config.allowed_origins = parse_origins(raw);
        }
        if let Some(key) = &self.api_key {
            config.gemini.api_key = Some(key.clone());
        }
        if let Some(model) = &self.model {
            config.gemini.model = model.clone();
        }
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        Ok(config)
    }
}

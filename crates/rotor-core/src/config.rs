use crate::error::{DatasetError, Result, RotorError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Dataset file looked up when no path is configured.
pub const DEFAULT_DATASET_FILE: &str = "NIFTY_historical_data.csv";

/// Origins always allowed so a local frontend works out of the box.
pub const DEV_ORIGINS: [&str; 5] = [
    "http://localhost:3000",
    "http://localhost:3001",
    "https://localhost:3000",
    "http://127.0.0.1:3000",
    "https://127.0.0.1:3000",
];

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// GeminiConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key: None,
        }
    }
}

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_path: Option<PathBuf>,
    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,
    #[serde(default = "default_interval")]
    pub update_interval_secs: u64,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

fn default_state_path() -> PathBuf {
    PathBuf::from("rotor_state.json")
}

fn default_interval() -> u64 {
    60
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dataset_path: None,
            state_path: default_state_path(),
            update_interval_secs: default_interval(),
            allowed_origins: Vec::new(),
            gemini: GeminiConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Config {
    /// Read a YAML config file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    /// Load `path` if given, otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_secs)
    }

    /// Fail on anything that would make the service unusable.
    pub fn ensure_valid(&self) -> Result<()> {
        match self
            .validate()
            .into_iter()
            .find(|w| w.level == WarnLevel::Error)
        {
            Some(w) => Err(RotorError::InvalidConfig(w.message)),
            None => Ok(()),
        }
    }

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.update_interval_secs == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "update_interval_secs must be greater than 0".to_string(),
            });
        }

        if self.gemini.api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "no Gemini API key configured; every command will be recorded as failed"
                    .to_string(),
            });
        }

        if self.gemini.model.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "gemini.model is empty".to_string(),
            });
        }

        for origin in &self.allowed_origins {
            if origin != "*" && !origin.starts_with("http://") && !origin.starts_with("https://") {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("allowed origin '{origin}' has no http(s) scheme"),
                });
            }
        }

        if self.state_path.as_os_str().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "state_path is empty".to_string(),
            });
        }

        warnings
    }

    /// Configured origins followed by the local development origins, without
    /// duplicates.
    pub fn cors_origins(&self) -> Vec<String> {
        let mut origins: Vec<String> = Vec::new();
        let configured = self.allowed_origins.iter().map(String::as_str);
        for origin in configured.chain(DEV_ORIGINS) {
            let origin = origin.trim().trim_end_matches('/');
            if !origin.is_empty() && !origins.iter().any(|o| o == origin) {
                origins.push(origin.to_string());
            }
        }
        origins
    }

    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o.trim() == "*")
    }

    /// The configured dataset, or the first default candidate that exists
    /// under `cwd` or its parent.
    pub fn resolve_dataset_path(&self, cwd: &Path) -> std::result::Result<PathBuf, DatasetError> {
        if let Some(path) = &self.dataset_path {
            return Ok(path.clone());
        }
        let mut candidates = vec![cwd.join(DEFAULT_DATASET_FILE)];
        if let Some(parent) = cwd.parent() {
            candidates.push(parent.join(DEFAULT_DATASET_FILE));
        }
        candidates
            .iter()
            .find(|p| p.is_file())
            .cloned()
            .ok_or_else(|| DatasetError::NotFound(cwd.join(DEFAULT_DATASET_FILE)))
    }
}

/// Split a comma-separated origin list, as passed through the environment.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

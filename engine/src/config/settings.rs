// Engine settings, loaded from environment variables
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::EngineError;

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub host: String,
    pub port: u16,
    /// Pretrained tokenizer identifier handed to the model worker.
    pub tokenizer: String,
    /// Pretrained model identifier handed to the model worker.
    pub model: String,
    pub device: String,
    pub max_context: usize,
    /// Unix socket of the model worker.
    pub model_sock: PathBuf,
    /// When false the service never tries to load a model and always uses
    /// the simple forecaster.
    pub kronos_enabled: bool,
    /// Optional ceiling on `pred_hours`; unset means no limit.
    pub max_pred_hours: Option<usize>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            host: "0.0.0.0".to_string(),
            port: 5001,
            tokenizer: "NeoQuasar/Kronos-Tokenizer-base".to_string(),
            model: "NeoQuasar/Kronos-small".to_string(),
            device: "cpu".to_string(),
            max_context: 512,
            model_sock: default_sock_path(),
            kronos_enabled: true,
            max_pred_hours: None,
        }
    }
}

fn env_str(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env_str(name).and_then(|s| s.parse().ok())
}

fn env_bool(name: &str) -> Option<bool> {
    env_str(name).map(|s| matches!(s.to_lowercase().as_str(), "1" | "true" | "yes" | "y" | "on"))
}

fn default_sock_path() -> PathBuf {
    match env_str("XDG_RUNTIME_DIR") {
        Some(xdg) => PathBuf::from(xdg).join("kronos-model.sock"),
        None => PathBuf::from("/tmp/kronos-model.sock"),
    }
}

impl EngineSettings {
    /// Reads every setting from the environment, keeping the default for
    /// anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env_str("KRONOS_SERVICE_HOST").unwrap_or(defaults.host),
            port: env_parse("KRONOS_SERVICE_PORT")
                .or_else(|| env_parse("PYTHON_SERVICE_PORT"))
                .unwrap_or(defaults.port),
            tokenizer: env_str("KRONOS_TOKENIZER").unwrap_or(defaults.tokenizer),
            model: env_str("KRONOS_MODEL").unwrap_or(defaults.model),
            device: env_str("DEVICE").unwrap_or(defaults.device),
            max_context: env_parse("KRONOS_MAX_CONTEXT").unwrap_or(defaults.max_context),
            model_sock: env_str("KRONOS_MODEL_SOCK")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_sock),
            kronos_enabled: env_bool("KRONOS_ENABLED").unwrap_or(defaults.kronos_enabled),
            max_pred_hours: env_parse("KRONOS_MAX_PRED_HOURS").or(defaults.max_pred_hours),
        }
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, EngineError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| EngineError::ConfigError(format!("invalid bind address '{}:{}': {}", self.host, self.port, e)))
    }
}

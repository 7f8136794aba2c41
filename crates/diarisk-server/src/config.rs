//! Server configuration resolved once from the environment at startup.

use std::path::PathBuf;
use std::str::FromStr;

/// Log output format, selected by `LOG_FORMAT`.
///
/// `json` produces structured records for cloud log collectors; anything else
/// falls back to the local compact format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            _ => Ok(Self::Compact),
        }
    }
}

/// Configuration consumed by the server binary.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listening port (`PORT`, default 5000).
    pub port: u16,
    /// Path to the serialized model artifact (`MODEL_PATH`, default
    /// `model.onnx` next to the service).
    pub model_path: PathBuf,
    /// Log output format (`LOG_FORMAT`).
    pub log_format: LogFormat,
}

impl ServerConfig {
    /// Reads configuration from the environment. Unset or unparseable values
    /// take their defaults; configuration never fails startup.
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(5000);
        let model_path = std::env::var("MODEL_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("model.onnx"));
        let log_format = std::env::var("LOG_FORMAT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();

        Self {
            port,
            model_path,
            log_format,
        }
    }
}

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Upper bound on request bodies; base64 images blow past axum's 2 MB default.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    #[serde(default)]
    pub logs: LogsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(rename = "type", default = "default_backend")]
    pub backend: ScoringBackend,
    // Stdio specific fields
    pub command: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: HashMap<String, String>,
    // Http specific fields
    pub url: Option<String>,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Maximum number of scorer calls in flight; must be 1 for stdio.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Per-call limit in seconds; `0` or `null` waits forever.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringBackend {
    Stdio,
    Http,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
            logs: LogsConfig::default(),
        }
    }
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            command: Some("python3".to_string()),
            args: vec!["score_worker.py".to_string()],
            env: HashMap::new(),
            url: None,
            headers: HashMap::new(),
            workers: default_workers(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5001
}

fn default_max_body_bytes() -> usize {
    50 * 1024 * 1024
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_backend() -> ScoringBackend {
    ScoringBackend::Stdio
}

fn default_workers() -> usize {
    1
}

fn default_timeout_secs() -> Option<u64> {
    Some(300)
}

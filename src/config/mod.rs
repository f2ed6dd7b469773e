mod types;

pub use types::*;

use crate::Result;
use std::{env, io::ErrorKind, path::Path};
use tracing::debug;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Loads the configuration from `$CONFIG_PATH` (default `config.yaml`).
///
/// A missing default file falls back to built-in defaults; an explicitly
/// configured path must exist.
pub async fn load() -> Result<Config> {
    match env::var("CONFIG_PATH") {
        Ok(config_path) => load_from(&config_path).await,
        Err(_) => match load_from(DEFAULT_CONFIG_PATH).await {
            Err(crate::Error::Io(e)) if e.kind() == ErrorKind::NotFound => {
                debug!("No {} found, using default configuration", DEFAULT_CONFIG_PATH);
                Ok(Config::default())
            }
            other => other,
        },
    }
}

pub async fn load_from(config_path: impl AsRef<Path>) -> Result<Config> {
    let config_path = config_path.as_ref();
    debug!("Loading configuration from: {}", config_path.display());

    let config_str = tokio::fs::read_to_string(config_path).await?;
    parse(&config_str)
}

pub fn parse(config_str: &str) -> Result<Config> {
    let config: Config = serde_yaml::from_str(config_str)?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    let scoring = &config.scoring;
    if scoring.workers == 0 {
        return Err(crate::Error::config("scoring.workers must be at least 1"));
    }
    match scoring.backend {
        ScoringBackend::Stdio if scoring.command.as_deref().is_none_or(str::is_empty) => Err(
            crate::Error::config("stdio scoring backend requires command field"),
        ),
        ScoringBackend::Stdio if scoring.workers > 1 => Err(crate::Error::config(
            "stdio scoring backend serves one call at a time; set scoring.workers to 1",
        )),
        ScoringBackend::Http if scoring.url.as_deref().is_none_or(str::is_empty) => Err(
            crate::Error::config("http scoring backend requires url field"),
        ),
        _ => Ok(()),
    }
}

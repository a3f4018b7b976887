mod types;

pub use types::*;

use crate::Result;
use std::env;
use std::path::Path;
use tracing::debug;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Loads the service configuration.
///
/// `CONFIG_PATH` names the YAML file. Without it, `config.yaml` is read when
/// present and built-in defaults are used otherwise.
pub async fn load() -> Result<Config> {
    load_with(env::var("CONFIG_PATH").ok(), DEFAULT_CONFIG_PATH).await
}

async fn load_with(config_path: Option<String>, default_path: &str) -> Result<Config> {
    match config_path {
        Some(config_path) => load_from(&config_path).await,
        None if Path::new(default_path).exists() => load_from(default_path).await,
        None => {
            debug!("No configuration file found, using defaults");
            Ok(Config::default())
        }
    }
}

pub async fn load_from(config_path: &str) -> Result<Config> {
    debug!("Loading configuration from: {}", config_path);

    let config_str = tokio::fs::read_to_string(config_path).await?;
    let config: Config = serde_yaml::from_str(&config_str)?;

    Ok(config)
}

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Application configuration, loaded from a YAML file.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub api_key: String,
    pub api_base: String,
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_max_retries() -> u32 {
    2
}

/// Config file resolution: `--config` flag > `ES_CONFIG` env var >
/// `config.yaml` in the working directory.
pub fn resolve_config_path(cli_override: Option<&Path>) -> PathBuf {
    if let Some(path) = cli_override {
        debug!("Using config file from --config argument: {}", path.display());
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var("ES_CONFIG") {
        debug!("Using config file from ES_CONFIG: {}", path);
        return PathBuf::from(path);
    }
    PathBuf::from("config.yaml")
}

pub fn load_config(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        anyhow::bail!(
            "config not found at {}\n\
             Use --config to specify a config file, or set the ES_CONFIG environment variable.\n\
             Example config.yaml:\n\
             api_key: \"YOUR_KEY\"\napi_base: \"http://localhost:5001/v1\"\nmodel: \"gpt-4o\"\n",
            path.display()
        );
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Reading config {}", path.display()))?;
    let cfg: AppConfig =
        serde_yaml::from_str(&raw).with_context(|| format!("Parsing config {}", path.display()))?;
    Ok(cfg)
}

//! Runtime configuration.
//!
//! Values are layered: built-in defaults, then `config.toml`, then the
//! `TODO_DATA_DIR` / `TODO_ENDPOINT` environment variables, then command line
//! flags. The config file is looked up in the data directory unless
//! `--config` names one explicitly.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use serde::Deserialize;
use tracing::{debug, info};

use crate::fields::Backend;

pub const CONFIG_FILE: &str = "config.toml";
pub const ENV_DATA_DIR: &str = "TODO_DATA_DIR";
pub const ENV_ENDPOINT: &str = "TODO_ENDPOINT";

/// Contents of `config.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    backend: Option<Backend>,
    endpoint: Option<String>,
    data_dir: Option<PathBuf>,
}

/// Values supplied on the command line.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub config: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub remote: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub backend: Backend,
    pub endpoint: Option<String>,
    pub data_dir: PathBuf,
}

/// `~/.todo`, falling back to `./.todo` without a home directory.
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".todo")
}

impl Config {
    /// Resolve configuration from the process environment.
    pub fn load(overrides: &Overrides) -> anyhow::Result<Self> {
        Self::resolve(overrides, |key| std::env::var(key).ok())
    }

    fn resolve(overrides: &Overrides, env: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let env_data_dir = env(ENV_DATA_DIR).filter(|v| !v.is_empty()).map(PathBuf::from);
        let base_dir = overrides
            .data_dir
            .clone()
            .or_else(|| env_data_dir.clone())
            .unwrap_or_else(default_data_dir);

        let file = match &overrides.config {
            Some(path) => read_file_config(path)?,
            None => {
                let path = base_dir.join(CONFIG_FILE);
                if path.exists() {
                    read_file_config(&path)?
                } else {
                    debug!(path = %path.display(), "no config file, using defaults");
                    FileConfig::default()
                }
            }
        };

        let data_dir = overrides
            .data_dir
            .clone()
            .or(env_data_dir)
            .or(file.data_dir)
            .unwrap_or(base_dir);

        let mut backend = file.backend.unwrap_or_default();
        let mut endpoint = file.endpoint;
        if let Some(url) = env(ENV_ENDPOINT).filter(|v| !v.is_empty()) {
            backend = Backend::Remote;
            endpoint = Some(url);
        }
        if let Some(url) = &overrides.remote {
            backend = Backend::Remote;
            endpoint = Some(url.clone());
        }

        if backend == Backend::Remote {
            let Some(url) = &endpoint else {
                bail!("remote backend selected but no endpoint configured");
            };
            reqwest::Url::parse(url).with_context(|| format!("invalid endpoint URL '{url}'"))?;
        }

        let config = Config {
            backend,
            endpoint,
            data_dir,
        };
        info!(backend = ?config.backend, data_dir = %config.data_dir.display(), "configuration resolved");
        Ok(config)
    }
}

fn read_file_config(path: &Path) -> anyhow::Result<FileConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let file = toml::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))?;
    debug!(path = %path.display(), "loaded config file");
    Ok(file)
}

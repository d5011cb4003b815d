use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Error, bail};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::icons::DEFAULT_SIZES;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub output_dir: Option<PathBuf>,
    pub sizes: Vec<u32>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            output_dir: None,
            sizes: DEFAULT_SIZES.to_vec(),
        }
    }
}

/// Reads the config passed with `--config`. Fields left out keep their
/// defaults.
pub fn load_configuration(config_path: &Path) -> Result<Config, Error> {
    if !config_path.exists() {
        bail!("config file {} does not exist", config_path.display());
    }

    let contents = fs::read_to_string(config_path)
        .with_context(|| format!("failed to read config {}", config_path.display()))?;

    let config: Config = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse config {}", config_path.display()))?;

    if config.sizes.is_empty() {
        bail!("config {} lists no icon sizes", config_path.display());
    }

    debug!(path = %config_path.display(), ?config, "loaded config");

    Ok(config)
}

//! Experiment config discovery for the CLI.
//!
//! Search order:
//! 1. `--config <path>`
//! 2. `$IRLAB_CONFIG`
//! 3. `./irlab.toml`

use anyhow::{anyhow, Context, Result};
use irlab_core::config::ExperimentConfig;
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable naming the config file
const CONFIG_ENV: &str = "IRLAB_CONFIG";

/// Config file looked up in the working directory
const DEFAULT_CONFIG_FILE: &str = "irlab.toml";

/// Picks the config path from the flag, the environment and the working directory.
fn resolve_config_path(custom: Option<&PathBuf>, env: Option<String>, cwd: &Path) -> PathBuf {
    if let Some(path) = custom {
        return path.clone();
    }
    if let Some(path) = env.filter(|p| !p.trim().is_empty()) {
        return PathBuf::from(path);
    }
    cwd.join(DEFAULT_CONFIG_FILE)
}

/// Finds the config file, failing when it does not exist.
pub fn find_config(custom: Option<&PathBuf>) -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("Failed to read the working directory")?;
    let path = resolve_config_path(custom, std::env::var(CONFIG_ENV).ok(), &cwd);
    if !path.is_file() {
        return Err(anyhow!(
            "Experiment config not found: {}\n\
             Pass --config, set ${}, or create {} in the working directory.",
            path.display(),
            CONFIG_ENV,
            DEFAULT_CONFIG_FILE
        ));
    }
    Ok(path)
}

/// Loads and validates the experiment config.
pub fn load_config(custom: Option<&PathBuf>) -> Result<ExperimentConfig> {
    let path = find_config(custom)?;
    info!("Loading experiment config {}", path.display());
    ExperimentConfig::load(&path)
        .with_context(|| format!("Failed to load experiment config: {}", path.display()))
}

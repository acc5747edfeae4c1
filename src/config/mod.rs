//! Configuration module for Travel-Proxy-RS
//!
//! Handles loading settings from YAML files and environment variables.

mod settings;

pub use settings::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit settings file
pub const SETTINGS_PATH_ENV: &str = "TRAVEL_PROXY_SETTINGS_PATH";

/// Default locations probed for settings.yml, in order
pub fn default_paths() -> Vec<PathBuf> {
    let mut paths = vec![
        PathBuf::from("settings.yml"),
        PathBuf::from("config/settings.yml"),
        PathBuf::from("/etc/travel-proxy/settings.yml"),
    ];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("travel-proxy-rs/settings.yml"));
    }
    paths
}

/// Settings file to load: the explicit path, then the path named by
/// the environment, then the first default location that exists.
pub fn locate(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    match std::env::var(SETTINGS_PATH_ENV).map(PathBuf::from) {
        Ok(path) if path.exists() => Some(path),
        _ => default_paths().into_iter().find(|p| p.exists()),
    }
}

/// Load settings from `path`, or defaults when there is none.
/// Environment overrides always apply.
pub fn load(path: Option<&Path>) -> Result<Settings> {
    let mut settings = match path {
        Some(path) => Settings::from_file(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };

    settings.merge_env();
    Ok(settings)
}

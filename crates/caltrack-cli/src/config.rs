//! Settings file lookup and parsing

use caltrack_core::Settings;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Settings file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "caltrack.toml";

/// Errors raised while loading settings
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config at {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Resolve and load settings.
///
/// An explicit path (from `--config` or `CALTRACK_CONFIG`) must exist.
/// Otherwise `./caltrack.toml` is used when present, else the defaults.
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings, ConfigError> {
    if let Some(path) = explicit {
        return load_settings_from(path);
    }

    let local = Path::new(CONFIG_FILE_NAME);
    if local.exists() {
        load_settings_from(local)
    } else {
        tracing::debug!("no {CONFIG_FILE_NAME}, using default column bindings");
        Ok(Settings::default())
    }
}

pub fn load_settings_from(path: &Path) -> Result<Settings, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let settings = toml::from_str(&text).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "loaded settings");
    Ok(settings)
}

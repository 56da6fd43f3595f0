// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Name of the config file picked up from the working directory when no
/// `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "Buildwatch.toml";

/// Load a configuration file from a given path and return the raw
/// `RawConfigFile`.
///
/// This only performs TOML deserialization; validation happens in
/// [`load_and_validate`].
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading config file at {:?}", path))?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw = load_from_path(path)?;
    ConfigFile::try_from(raw)
}

/// Resolve the configuration to use.
///
/// - An explicit path must exist.
/// - Without one, `Buildwatch.toml` in the working directory is used if it
///   exists; otherwise the built-in defaults apply.
///
/// Returns the config plus the path it was read from (if any).
pub fn resolve(explicit: Option<&Path>) -> Result<(ConfigFile, Option<PathBuf>)> {
    if let Some(path) = explicit {
        let cfg = load_and_validate(path)?;
        return Ok((cfg, Some(path.to_path_buf())));
    }

    let default_path = default_config_path();
    if default_path.is_file() {
        let cfg = load_and_validate(&default_path)?;
        return Ok((cfg, Some(default_path)));
    }

    Ok((ConfigFile::try_from(RawConfigFile::default())?, None))
}

/// Helper to resolve a default config path.
pub fn default_config_path() -> PathBuf {
    PathBuf::from(DEFAULT_CONFIG_FILE)
}

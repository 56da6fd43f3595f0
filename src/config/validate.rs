// src/config/validate.rs

use globset::Glob;

use crate::config::model::{CommandConfig, ConfigFile, RawConfigFile, WatchSection};
use crate::errors::{BuildwatchError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::BuildwatchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let watch = validate_watch(raw.watch)?;
        validate_command("build", &raw.build)?;
        validate_command("test", &raw.test)?;
        Ok(ConfigFile::new_unchecked(watch, raw.build, raw.test))
    }
}

/// Re-run validation on an already constructed config (e.g. after CLI
/// overrides were applied).
pub fn validate_config(cfg: ConfigFile) -> Result<ConfigFile> {
    ConfigFile::try_from(RawConfigFile {
        watch: cfg.watch,
        build: cfg.build,
        test: cfg.test,
    })
}

fn validate_watch(mut watch: WatchSection) -> Result<WatchSection> {
    watch.extensions = watch
        .extensions
        .iter()
        .map(|ext| ext.trim().trim_start_matches('.').to_string())
        .collect();

    if watch.extensions.is_empty() {
        return Err(BuildwatchError::ConfigError(
            "[watch].extensions must list at least one extension".to_string(),
        ));
    }

    if watch.extensions.iter().any(|ext| ext.is_empty()) {
        return Err(BuildwatchError::ConfigError(
            "[watch].extensions contains an empty extension".to_string(),
        ));
    }

    for pattern in watch.exclude.iter() {
        Glob::new(pattern).map_err(|e| {
            BuildwatchError::ConfigError(format!(
                "[watch].exclude has invalid glob '{}': {}",
                pattern, e
            ))
        })?;
    }

    Ok(watch)
}

fn validate_command(section: &str, cmd: &CommandConfig) -> Result<()> {
    match cmd.cmd.first() {
        None => {
            return Err(BuildwatchError::ConfigError(format!(
                "[{}].cmd must contain at least the program to run",
                section
            )));
        }
        Some(program) if program.trim().is_empty() => {
            return Err(BuildwatchError::ConfigError(format!(
                "[{}].cmd has an empty program name",
                section
            )));
        }
        Some(_) => {}
    }

    if let Some(name) = &cmd.name {
        if name.trim().is_empty() {
            return Err(BuildwatchError::ConfigError(format!(
                "[{}].name must not be empty",
                section
            )));
        }
    }

    Ok(())
}

// src/config/mod.rs

//! Configuration loading and validation for buildwatch.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk, or fall back to defaults (`loader.rs`).
//! - Validate and normalize it (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, resolve, DEFAULT_CONFIG_FILE};
pub use model::{CommandConfig, ConfigFile, RawConfigFile, WatchSection};
pub use validate::validate_config;

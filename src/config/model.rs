// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [watch]
/// root = "."
/// extensions = ["go"]
/// exclude = ["vendor/**"]
///
/// [build]
/// cmd = ["go", "build", "./..."]
///
/// [test]
/// cmd = ["go", "test", "-v", "./..."]
/// ```
///
/// All sections are optional; an empty file yields the built-in defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub watch: WatchSection,

    #[serde(default = "CommandConfig::default_build")]
    pub build: CommandConfig,

    #[serde(default = "CommandConfig::default_test")]
    pub test: CommandConfig,
}

impl Default for RawConfigFile {
    fn default() -> Self {
        Self {
            watch: WatchSection::default(),
            build: CommandConfig::default_build(),
            test: CommandConfig::default_test(),
        }
    }
}

/// Validated configuration.
///
/// Produced by `ConfigFile::try_from(RawConfigFile)` (see `validate.rs`),
/// which rejects empty commands and normalizes extensions.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub watch: WatchSection,
    pub build: CommandConfig,
    pub test: CommandConfig,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        watch: WatchSection,
        build: CommandConfig,
        test: CommandConfig,
    ) -> Self {
        Self { watch, build, test }
    }
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchSection {
    /// Directory to watch. Relative paths are resolved against the directory
    /// containing the config file.
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// File extensions (without the leading dot) that count as source files.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Glob patterns, relative to `root`, for paths that never trigger a
    /// rebuild even when their extension matches.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Watch subdirectories as well.
    #[serde(default = "default_recursive")]
    pub recursive: bool,

    /// Drop change events whose file content hash did not change.
    #[serde(default)]
    pub use_hash: bool,
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_extensions() -> Vec<String> {
    vec!["go".to_string()]
}

fn default_recursive() -> bool {
    true
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            root: default_root(),
            extensions: default_extensions(),
            exclude: Vec::new(),
            recursive: default_recursive(),
            use_hash: false,
        }
    }
}

/// `[build]` / `[test]` section.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CommandConfig {
    /// Display label. Defaults to "Build" / "Test" depending on the section.
    #[serde(default)]
    pub name: Option<String>,

    /// Program followed by its arguments. Not run through a shell.
    pub cmd: Vec<String>,

    /// Exit codes that end a run without reporting a result at all.
    ///
    /// Useful for tools that occasionally fail spuriously while files are
    /// still being written; the display then stays "in progress" until the
    /// next change.
    #[serde(default)]
    pub ignore_exit_codes: Vec<i32>,
}

impl CommandConfig {
    pub fn new<I, S>(cmd: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: None,
            cmd: cmd.into_iter().map(Into::into).collect(),
            ignore_exit_codes: Vec::new(),
        }
    }

    pub fn default_build() -> Self {
        Self::new(["go", "build", "./..."])
    }

    pub fn default_test() -> Self {
        Self::new(["go", "test", "-v", "./..."])
    }

    /// Label for this command, falling back to `fallback` when unset.
    pub fn display_name<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.name.as_deref().unwrap_or(fallback)
    }
}

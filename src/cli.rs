// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `buildwatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "buildwatch",
    version,
    about = "Rebuild and retest whenever a source file changes.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// If omitted, `Buildwatch.toml` in the current directory is used when it
    /// exists, otherwise the built-in defaults (`go build` / `go test`).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory to watch. Overrides `[watch].root`.
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Source file extension that triggers a rebuild (repeatable).
    ///
    /// Replaces `[watch].extensions` when given.
    #[arg(long = "ext", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Run build and test once, print the result and exit. No watching.
    #[arg(long)]
    pub once: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `BUILDWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve + validate the configuration, print it, don't run anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

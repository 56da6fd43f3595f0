// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod render;
pub mod types;
pub mod watch;

use std::path::{Path, PathBuf};

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::ConfigFile;
use crate::engine::{Aggregator, AggregatorOptions, DisplayState, SupervisorEvent};
use crate::errors::BuildwatchError;
use crate::exec::{Builder, CommandSpec};
use crate::render::TerminalRenderer;
use crate::watch::SourceFilter;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config resolution (file, defaults, CLI overrides)
/// - the build/test command slots
/// - the (optional) file watcher
/// - Ctrl-C handling
/// - the aggregator loop rendering to stdout
pub async fn run(args: CliArgs) -> Result<()> {
    let (cfg, config_path) = config::resolve(args.config.as_deref())?;
    let cfg = apply_cli_overrides(cfg, &args)?;
    let root = watch_root(&cfg, config_path.as_deref(), args.root.as_deref());

    if args.dry_run {
        print_dry_run(&cfg, &root, config_path.as_deref());
        return Ok(());
    }

    // Notify reports absolute paths; exclude globs are matched relative to
    // the same absolute root.
    let root = root.canonicalize().unwrap_or(root);
    let filter = SourceFilter::from_config(root.clone(), &cfg.watch)?;

    let (event_tx, event_rx) = mpsc::channel::<SupervisorEvent>(64);

    // Watching is disabled in --once mode. Setup failures are fatal.
    let _watcher_handle = if !args.once {
        Some(watch::spawn_watcher(
            root.clone(),
            cfg.watch.recursive,
            filter.clone(),
            cfg.watch.use_hash,
            event_tx.clone(),
        )?)
    } else {
        None
    };

    // Ctrl-C → graceful shutdown.
    {
        let tx = event_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(SupervisorEvent::ShutdownRequested).await;
        });
    }

    let (builder, results) = Builder::from_config(&cfg);
    let options = AggregatorOptions {
        exit_when_settled: args.once,
    };
    let state = DisplayState::new(
        builder.build_command().name(),
        builder.test_command().name(),
        filter,
        options,
    );

    info!(?root, extensions = ?cfg.watch.extensions, "starting supervisor");

    let aggregator = Aggregator::new(
        state,
        event_rx,
        builder,
        results,
        TerminalRenderer::stdout(),
    );
    let final_state = aggregator.run().await;

    if args.once && final_state.has_failures() {
        return Err(BuildwatchError::ChecksFailed(format!(
            "{} {}, {} {}",
            final_state.build().name,
            final_state.build().status,
            final_state.test().name,
            final_state.test().status,
        ))
        .into());
    }

    Ok(())
}

/// Apply `--ext` on top of the resolved config and re-validate.
fn apply_cli_overrides(mut cfg: ConfigFile, args: &CliArgs) -> Result<ConfigFile> {
    if !args.extensions.is_empty() {
        cfg.watch.extensions = args.extensions.clone();
    }
    Ok(config::validate_config(cfg)?)
}

/// Figure out which directory to watch.
///
/// - `--root` wins and is taken as given (relative to the cwd).
/// - Otherwise `[watch].root` is resolved against the directory holding the
///   config file, or the cwd when running on defaults.
fn watch_root(cfg: &ConfigFile, config_path: Option<&Path>, cli_root: Option<&Path>) -> PathBuf {
    if let Some(root) = cli_root {
        return root.to_path_buf();
    }

    if cfg.watch.root.is_absolute() {
        return cfg.watch.root.clone();
    }

    match config_path.and_then(Path::parent) {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(&cfg.watch.root),
        _ => cfg.watch.root.clone(),
    }
}

/// Print the resolved configuration without running anything.
fn print_dry_run(cfg: &ConfigFile, root: &Path, config_path: Option<&Path>) {
    println!("buildwatch dry-run");
    match config_path {
        Some(path) => println!("  config: {}", path.display()),
        None => println!("  config: (built-in defaults)"),
    }
    println!("  watch.root = {}", root.display());
    println!("  watch.extensions = {:?}", cfg.watch.extensions);
    if !cfg.watch.exclude.is_empty() {
        println!("  watch.exclude = {:?}", cfg.watch.exclude);
    }
    println!("  watch.recursive = {}", cfg.watch.recursive);
    println!("  watch.use_hash = {}", cfg.watch.use_hash);
    println!();

    for (section, fallback, cmd) in [("build", "Build", &cfg.build), ("test", "Test", &cfg.test)] {
        let spec = CommandSpec::from_config(cmd, fallback);
        println!("[{section}] {}", spec.name());
        println!("      cmd: {spec}");
        if !cmd.ignore_exit_codes.is_empty() {
            println!("      ignore_exit_codes: {:?}", cmd.ignore_exit_codes);
        }
    }

    debug!("dry-run complete (no execution)");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RawConfigFile;

    fn defaults() -> ConfigFile {
        ConfigFile::try_from(RawConfigFile::default()).expect("defaults are valid")
    }

    #[test]
    fn cli_root_wins() {
        let root = watch_root(
            &defaults(),
            Some(Path::new("conf/Buildwatch.toml")),
            Some(Path::new("elsewhere")),
        );
        assert_eq!(root, PathBuf::from("elsewhere"));
    }

    #[test]
    fn relative_root_resolves_against_config_dir() {
        let root = watch_root(&defaults(), Some(Path::new("conf/Buildwatch.toml")), None);
        assert_eq!(root, PathBuf::from("conf/."));

        let root = watch_root(&defaults(), Some(Path::new("Buildwatch.toml")), None);
        assert_eq!(root, PathBuf::from("."));
    }
}

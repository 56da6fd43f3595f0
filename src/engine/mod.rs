// src/engine/mod.rs

//! Result aggregation for buildwatch.
//!
//! This module ties together:
//! - file-watch events (restart triggers and watcher errors)
//! - build and test results coming out of the two command slots
//! - shutdown requests
//!
//! The pure display state machine lives in [`display`]; the async loop that
//! feeds it and performs restarts/redraws is [`aggregator`].

use std::path::PathBuf;

use crate::types::CommandResult;

/// Everything the aggregator reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupervisorEvent {
    /// A path changed on disk (not yet filtered for relevance).
    FileChanged(PathBuf),
    /// The filesystem watcher reported an error.
    WatchError(String),
    /// The build slot finished a run.
    BuildFinished(CommandResult),
    /// The test slot finished a run.
    TestFinished(CommandResult),
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

/// Options shared by the display core and the async loop.
#[derive(Debug, Clone, Copy, Default)]
pub struct AggregatorOptions {
    /// Stop once both build and test have reported (used for `--once`).
    pub exit_when_settled: bool,
}

pub mod aggregator;
pub mod display;

pub use aggregator::Aggregator;
pub use display::{DisplayState, DisplayStep};

// src/engine/display.rs

//! Pure display state machine.
//!
//! Consumes [`SupervisorEvent`]s and tracks the last known build and test
//! results. Each result moves `Dirty → Ok | Bad` when its command reports,
//! and back to `Dirty` on every relevant file change. It never flips between
//! `Ok` and `Bad` directly.
//!
//! No channels, no processes, no terminal: the async shell in
//! [`super::aggregator`] performs the restarts and redraws requested here.

use tracing::{debug, error, warn};

use crate::engine::{AggregatorOptions, SupervisorEvent};
use crate::types::{CommandResult, Status};
use crate::watch::SourceFilter;

/// What the shell should do after one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayStep {
    /// Kill and relaunch build and test.
    pub restart: bool,
    /// Clear the screen and print both results.
    pub redraw: bool,
    /// Whether the loop should keep running.
    pub keep_running: bool,
}

impl DisplayStep {
    fn ignored() -> Self {
        Self {
            restart: false,
            redraw: false,
            keep_running: true,
        }
    }

    fn redraw() -> Self {
        Self {
            redraw: true,
            ..Self::ignored()
        }
    }
}

#[derive(Debug)]
pub struct DisplayState {
    filter: SourceFilter,
    options: AggregatorOptions,
    build: CommandResult,
    test: CommandResult,
}

impl DisplayState {
    /// Both results start `Dirty`: nothing has completed yet.
    pub fn new(
        build_name: impl Into<String>,
        test_name: impl Into<String>,
        filter: SourceFilter,
        options: AggregatorOptions,
    ) -> Self {
        Self {
            filter,
            options,
            build: CommandResult::dirty(build_name),
            test: CommandResult::dirty(test_name),
        }
    }

    pub fn build(&self) -> &CommandResult {
        &self.build
    }

    pub fn test(&self) -> &CommandResult {
        &self.test
    }

    /// Both commands have reported since the last invalidation.
    pub fn is_settled(&self) -> bool {
        !self.build.status.is_dirty() && !self.test.status.is_dirty()
    }

    pub fn has_failures(&self) -> bool {
        self.build.status == Status::Bad || self.test.status == Status::Bad
    }

    /// Apply one event.
    pub fn step(&mut self, event: SupervisorEvent) -> DisplayStep {
        match event {
            SupervisorEvent::FileChanged(path) => {
                if !self.filter.is_relevant(&path) {
                    debug!(?path, "ignoring change to non-source file");
                    return DisplayStep::ignored();
                }
                debug!(?path, "source changed; invalidating results");
                self.build.mark_dirty();
                self.test.mark_dirty();
                DisplayStep {
                    restart: true,
                    ..DisplayStep::redraw()
                }
            }
            SupervisorEvent::WatchError(message) => {
                error!("file watch error: {}", message);
                DisplayStep::redraw()
            }
            SupervisorEvent::BuildFinished(result) => {
                let accepted = accept(&mut self.build, result);
                self.after_result(accepted)
            }
            SupervisorEvent::TestFinished(result) => {
                let accepted = accept(&mut self.test, result);
                self.after_result(accepted)
            }
            SupervisorEvent::ShutdownRequested => DisplayStep {
                keep_running: false,
                ..DisplayStep::ignored()
            },
        }
    }

    fn after_result(&self, accepted: bool) -> DisplayStep {
        if !accepted {
            return DisplayStep::ignored();
        }

        let mut step = DisplayStep::redraw();
        if self.options.exit_when_settled && self.is_settled() {
            debug!("build and test settled; stopping");
            step.keep_running = false;
        }
        step
    }
}

/// Overwrite `slot` with `result` if a result is expected.
///
/// A result for a slot that is not `Dirty` would mean two results for one
/// run; it is dropped so the status never flips between `Ok` and `Bad`.
fn accept(slot: &mut CommandResult, result: CommandResult) -> bool {
    if !slot.status.is_dirty() {
        warn!(
            command = %result.name,
            current = %slot.status,
            incoming = %result.status,
            "unexpected result while not in progress; dropping"
        );
        return false;
    }
    *slot = result;
    true
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn state(options: AggregatorOptions) -> DisplayState {
        let filter = SourceFilter::new("/proj", ["go"], &[]).expect("filter");
        DisplayState::new("Build", "Test", filter, options)
    }

    fn changed(path: &str) -> SupervisorEvent {
        SupervisorEvent::FileChanged(PathBuf::from(path))
    }

    #[test]
    fn starts_dirty() {
        let s = state(AggregatorOptions::default());
        assert_eq!(s.build(), &CommandResult::dirty("Build"));
        assert_eq!(s.test(), &CommandResult::dirty("Test"));
        assert!(!s.is_settled());
    }

    #[test]
    fn irrelevant_change_is_dropped_without_redraw() {
        let mut s = state(AggregatorOptions::default());
        s.step(SupervisorEvent::BuildFinished(CommandResult::new("Build", "", Status::Ok)));

        let step = s.step(changed("README.md"));
        assert_eq!(step, DisplayStep::ignored());
        assert_eq!(s.build().status, Status::Ok);
    }

    #[test]
    fn relevant_change_invalidates_both_and_restarts() {
        let mut s = state(AggregatorOptions::default());
        s.step(SupervisorEvent::BuildFinished(CommandResult::new("Build", "", Status::Ok)));
        s.step(SupervisorEvent::TestFinished(CommandResult::new("Test", "FAIL", Status::Bad)));

        let step = s.step(changed("/proj/a.go"));
        assert!(step.restart);
        assert!(step.redraw);
        assert_eq!(s.build().status, Status::Dirty);
        assert_eq!(s.test().status, Status::Dirty);
        // Old output is kept for faded display.
        assert_eq!(s.test().output, "FAIL");
    }

    #[test]
    fn results_overwrite_in_full() {
        let mut s = state(AggregatorOptions::default());
        let step = s.step(SupervisorEvent::TestFinished(CommandResult::new(
            "Test",
            "FAIL",
            Status::Bad,
        )));
        assert_eq!(step, DisplayStep::redraw());
        assert_eq!(s.test(), &CommandResult::new("Test", "FAIL", Status::Bad));
        assert!(s.has_failures());
    }

    #[test]
    fn second_result_without_invalidation_is_dropped() {
        let mut s = state(AggregatorOptions::default());
        s.step(SupervisorEvent::BuildFinished(CommandResult::new("Build", "", Status::Ok)));

        let step = s.step(SupervisorEvent::BuildFinished(CommandResult::new(
            "Build",
            "boom",
            Status::Bad,
        )));
        assert!(!step.redraw);
        assert_eq!(s.build().status, Status::Ok);
    }

    #[test]
    fn watch_error_redraws_without_state_change() {
        let mut s = state(AggregatorOptions::default());
        let step = s.step(SupervisorEvent::WatchError("inotify limit".into()));
        assert_eq!(step, DisplayStep::redraw());
        assert_eq!(s.build().status, Status::Dirty);
    }

    #[test]
    fn exit_when_settled_stops_after_both_results() {
        let mut s = state(AggregatorOptions {
            exit_when_settled: true,
        });
        let step = s.step(SupervisorEvent::BuildFinished(CommandResult::new("Build", "", Status::Ok)));
        assert!(step.keep_running);

        let step = s.step(SupervisorEvent::TestFinished(CommandResult::new("Test", "", Status::Ok)));
        assert!(step.redraw);
        assert!(!step.keep_running);
    }

    #[test]
    fn shutdown_stops_without_redraw() {
        let mut s = state(AggregatorOptions::default());
        let step = s.step(SupervisorEvent::ShutdownRequested);
        assert!(!step.keep_running);
        assert!(!step.redraw);
        assert!(!step.restart);
    }
}

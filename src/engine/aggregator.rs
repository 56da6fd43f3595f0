// src/engine/aggregator.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::exec::{Builder, BuilderResults};
use crate::render::Renderer;

use super::SupervisorEvent;
use super::display::DisplayState;

/// Single-threaded event loop merging watch events and command results.
///
/// IO shell around [`DisplayState`]: it waits on the event channel and on
/// both result receivers, feeds whatever arrives first into the state
/// machine, then restarts the [`Builder`] and redraws as requested.
pub struct Aggregator<R: Renderer> {
    state: DisplayState,
    event_rx: mpsc::Receiver<SupervisorEvent>,
    builder: Builder,
    results: BuilderResults,
    renderer: R,
}

impl<R: Renderer> fmt::Debug for Aggregator<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Aggregator")
            .field("state", &self.state)
            .field("builder", &self.builder)
            .finish_non_exhaustive()
    }
}

impl<R: Renderer> Aggregator<R> {
    pub fn new(
        state: DisplayState,
        event_rx: mpsc::Receiver<SupervisorEvent>,
        builder: Builder,
        results: BuilderResults,
        renderer: R,
    ) -> Self {
        Self {
            state,
            event_rx,
            builder,
            results,
            renderer,
        }
    }

    /// Main loop.
    ///
    /// - Launches build and test once and draws the initial (dirty) state.
    /// - Processes one event per iteration until shutdown is requested, the
    ///   state machine asks to stop, or every source is closed.
    /// - Kills both commands on the way out.
    ///
    /// Returns the final display state.
    pub async fn run(mut self) -> DisplayState {
        info!("buildwatch supervisor started");

        self.builder.start().await;
        self.render();

        let mut events_open = true;
        let mut build_open = true;
        let mut test_open = true;

        loop {
            let event = tokio::select! {
                ev = self.event_rx.recv(), if events_open => match ev {
                    Some(ev) => ev,
                    None => {
                        debug!("event channel closed");
                        events_open = false;
                        continue;
                    }
                },
                res = self.results.test.recv(), if test_open => match res {
                    Some(res) => SupervisorEvent::TestFinished(res),
                    None => {
                        test_open = false;
                        continue;
                    }
                },
                res = self.results.build.recv(), if build_open => match res {
                    Some(res) => SupervisorEvent::BuildFinished(res),
                    None => {
                        build_open = false;
                        continue;
                    }
                },
                else => {
                    info!("all event sources closed; exiting");
                    break;
                }
            };

            debug!(?event, "supervisor received event");

            let step = self.state.step(event);

            if step.restart {
                self.builder.start().await;
            }

            if step.redraw {
                self.render();
            }

            if !step.keep_running {
                info!("stopping supervisor");
                break;
            }
        }

        self.builder.kill().await;
        info!("supervisor exiting");
        self.state
    }

    fn render(&mut self) {
        if let Err(err) = self.renderer.render(self.state.build(), self.state.test()) {
            warn!(error = %err, "failed to render status");
        }
    }
}

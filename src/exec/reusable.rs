// src/exec/reusable.rs

//! A restartable process slot.
//!
//! A [`ReusableCommand`] runs at most one instance of its command at a time.
//! `start` replaces any running instance; `kill` stops it. Completed runs are
//! published on a [`CommandResults`] channel, except runs that were killed
//! or superseded: those are never reported.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::exec::runner::{result_for, run_process};
use crate::exec::spec::CommandSpec;
use crate::types::CommandResult;

/// A result tagged with the generation of the run that produced it.
#[derive(Debug)]
struct TaggedResult {
    run_id: u64,
    result: CommandResult,
}

/// The process currently owned by a slot.
///
/// - `cancel` asks the run task to kill its process.
/// - `handle` is the Tokio task waiting on the process.
struct ActiveRun {
    run_id: u64,
    cancel: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

enum Slot {
    /// Nothing running; the next `start` launches a fresh process.
    Ready,
    Running(ActiveRun),
}

/// One external-process slot that is restarted over and over.
pub struct ReusableCommand {
    spec: Arc<CommandSpec>,
    slot: Mutex<Slot>,
    /// Run id whose result is still wanted. Bumped on every stop, so any
    /// result tagged with an older id is stale.
    generation: Arc<AtomicU64>,
    result_tx: mpsc::Sender<TaggedResult>,
}

impl std::fmt::Debug for ReusableCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReusableCommand")
            .field("spec", &self.spec)
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl ReusableCommand {
    /// Create an idle slot for `spec` plus the receiving end of its results.
    pub fn new(spec: CommandSpec) -> (Self, CommandResults) {
        // A single pending result per slot; the run task waits for the
        // consumer beyond that.
        let (result_tx, result_rx) = mpsc::channel(1);
        let generation = Arc::new(AtomicU64::new(0));

        let results = CommandResults {
            name: spec.name().to_string(),
            rx: result_rx,
            generation: Arc::clone(&generation),
        };

        let command = Self {
            spec: Arc::new(spec),
            slot: Mutex::new(Slot::Ready),
            generation,
            result_tx,
        };

        (command, results)
    }

    pub fn name(&self) -> &str {
        self.spec.name()
    }

    pub fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    /// Whether a process launched by this slot is still running.
    pub async fn is_running(&self) -> bool {
        let slot = self.slot.lock().await;
        matches!(&*slot, Slot::Running(run) if !run.handle.is_finished())
    }

    /// Kill whatever is running, then launch a fresh process.
    ///
    /// Returns once the new run task is installed; the process itself is
    /// waited on in the background.
    pub async fn start(&self) {
        let mut slot = self.slot.lock().await;
        self.stop_locked(&mut slot).await;

        let run_id = self.generation.load(Ordering::SeqCst);
        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(execute(
            Arc::clone(&self.spec),
            run_id,
            self.result_tx.clone(),
            cancel_rx,
        ));

        debug!(command = %self.spec.name(), run_id, "installed new run");
        *slot = Slot::Running(ActiveRun {
            run_id,
            cancel: Some(cancel_tx),
            handle,
        });
    }

    /// Kill the running process, if any, and reset the slot.
    ///
    /// Calling this on an idle slot only invalidates results that might
    /// still be in flight.
    pub async fn kill(&self) {
        let mut slot = self.slot.lock().await;
        self.stop_locked(&mut slot).await;
    }

    /// Must be called with the slot lock held.
    ///
    /// Waits for the run task to finish, which after cancellation only
    /// covers killing and reaping the process.
    async fn stop_locked(&self, slot: &mut Slot) {
        self.generation.fetch_add(1, Ordering::SeqCst);

        let Slot::Running(mut run) = std::mem::replace(slot, Slot::Ready) else {
            return;
        };

        if let Some(cancel) = run.cancel.take() {
            if cancel.send(()).is_err() {
                debug!(
                    command = %self.spec.name(),
                    run_id = run.run_id,
                    "run already finished while stopping"
                );
            }
        }

        if let Err(err) = run.handle.await {
            warn!(
                command = %self.spec.name(),
                run_id = run.run_id,
                error = %err,
                "run task ended abnormally"
            );
        }
    }
}

/// Body of a run task: execute once and publish the result if it is wanted.
async fn execute(
    spec: Arc<CommandSpec>,
    run_id: u64,
    result_tx: mpsc::Sender<TaggedResult>,
    mut cancel_rx: oneshot::Receiver<()>,
) {
    let outcome = run_process(&spec, run_id, &mut cancel_rx).await;

    let Some(result) = result_for(&spec, outcome) else {
        debug!(command = %spec.name(), run_id, "run produced no result");
        return;
    };

    let tagged = TaggedResult { run_id, result };

    // Killed runs returned above, so the cancel channel is still unused here.
    tokio::select! {
        sent = result_tx.send(tagged) => {
            if sent.is_err() {
                debug!(command = %spec.name(), run_id, "result receiver dropped");
            }
        }
        _ = &mut cancel_rx => {
            info!(command = %spec.name(), run_id, "superseded before result was consumed");
        }
    }
}

/// Receiving end of a [`ReusableCommand`]'s results.
///
/// Only results of the most recently started run are yielded.
#[derive(Debug)]
pub struct CommandResults {
    name: String,
    rx: mpsc::Receiver<TaggedResult>,
    generation: Arc<AtomicU64>,
}

impl CommandResults {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wait for the next current result.
    ///
    /// Returns `None` once the owning command and all its runs are gone.
    /// Cancel safe: stale results are discarded without awaiting.
    pub async fn recv(&mut self) -> Option<CommandResult> {
        loop {
            let tagged = self.rx.recv().await?;
            let current = self.generation.load(Ordering::SeqCst);
            if tagged.run_id == current {
                return Some(tagged.result);
            }
            debug!(
                command = %self.name,
                run_id = tagged.run_id,
                current,
                "discarding result of superseded run"
            );
        }
    }
}

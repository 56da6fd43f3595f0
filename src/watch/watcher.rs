// src/watch/watcher.rs

use std::path::{Path, PathBuf};

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::engine::SupervisorEvent;
use crate::errors::Result;
use crate::watch::filter::SourceFilter;
use crate::watch::hash::ContentHashes;

/// Handle for the filesystem watcher.
///
/// Keeps the underlying `RecommendedWatcher` alive. Dropping this handle
/// stops file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
    root: PathBuf,
}

impl WatcherHandle {
    /// The (canonicalized) directory being watched.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

/// Start watching `root` and forward activity to the supervisor.
///
/// - Every path of every non-access event becomes a
///   `SupervisorEvent::FileChanged`; relevance is decided by the consumer.
/// - Watch errors become `SupervisorEvent::WatchError`.
/// - With `use_hash`, change events for relevant files whose contents are
///   byte-identical to the last sighting are dropped here.
///
/// Fails if the watcher cannot be created or `root` cannot be watched.
pub fn spawn_watcher(
    root: impl Into<PathBuf>,
    recursive: bool,
    filter: SourceFilter,
    use_hash: bool,
    event_tx: mpsc::Sender<SupervisorEvent>,
) -> Result<WatcherHandle> {
    let root = root.into();
    let root = root.canonicalize().unwrap_or(root);

    // Channel from the blocking notify callback into the async world.
    let (raw_tx, mut raw_rx) = mpsc::unbounded_channel::<notify::Result<Event>>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| {
            if let Err(err) = raw_tx.send(res) {
                eprintln!("buildwatch: failed to forward notify event: {err}");
            }
        },
        Config::default(),
    )?;

    let mode = if recursive {
        RecursiveMode::Recursive
    } else {
        RecursiveMode::NonRecursive
    };
    watcher.watch(&root, mode)?;

    info!(?root, recursive, "file watcher started");

    tokio::spawn(async move {
        let mut hashes = use_hash.then(ContentHashes::new);

        while let Some(res) = raw_rx.recv().await {
            let events = match res {
                Ok(event) => changed_paths(event)
                    .into_iter()
                    .filter(|path| keep_after_hash(&mut hashes, &filter, path))
                    .map(SupervisorEvent::FileChanged)
                    .collect::<Vec<_>>(),
                Err(err) => vec![SupervisorEvent::WatchError(err.to_string())],
            };

            for event in events {
                if event_tx.send(event).await.is_err() {
                    debug!("supervisor gone; stopping watcher forwarding");
                    return;
                }
            }
        }
        debug!("watcher event loop finished");
    });

    Ok(WatcherHandle {
        _inner: watcher,
        root,
    })
}

/// Paths touched by a notify event, skipping pure access notifications
/// (open/read/close-without-write).
fn changed_paths(event: Event) -> Vec<PathBuf> {
    debug!(?event, "received notify event");
    match event.kind {
        EventKind::Access(_) => Vec::new(),
        _ => event.paths,
    }
}

fn keep_after_hash(
    hashes: &mut Option<ContentHashes>,
    filter: &SourceFilter,
    path: &Path,
) -> bool {
    match hashes {
        Some(hashes) if filter.is_relevant(path) => hashes.content_changed(path),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use notify::event::{AccessKind, CreateKind, ModifyKind};

    use super::*;

    #[test]
    fn access_events_are_ignored() {
        let event = Event::new(EventKind::Access(AccessKind::Any)).add_path("a.go".into());
        assert!(changed_paths(event).is_empty());
    }

    #[test]
    fn modify_and_create_events_keep_all_paths() {
        let event = Event::new(EventKind::Modify(ModifyKind::Any))
            .add_path("a.go".into())
            .add_path("b.go".into());
        assert_eq!(changed_paths(event), vec![PathBuf::from("a.go"), PathBuf::from("b.go")]);

        let event = Event::new(EventKind::Create(CreateKind::File)).add_path("c.go".into());
        assert_eq!(changed_paths(event), vec![PathBuf::from("c.go")]);
    }
}

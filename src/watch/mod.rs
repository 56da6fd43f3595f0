// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Deciding which paths are relevant source files (`filter`).
//! - Wiring up a cross-platform filesystem watcher (`notify`).
//! - Optionally dropping events whose file content did not change (`hash`).
//!
//! It knows nothing about commands; it only turns filesystem activity into
//! `SupervisorEvent`s.

pub mod filter;
pub mod hash;
pub mod path_utils;
pub mod watcher;

pub use filter::SourceFilter;
pub use hash::{compute_file_hash, ContentHashes};
pub use watcher::{spawn_watcher, WatcherHandle};

// src/exec/mod.rs

//! Process execution layer.
//!
//! Commands run directly (no shell) through `tokio::process::Command`.
//!
//! - [`spec`] holds the immutable program/argument description of a slot.
//! - [`termination`] classifies how a process ended (killed vs. failed).
//! - [`runner`] executes one run and decides what it reports.
//! - [`reusable`] is the restartable slot that guarantees at most one live
//!   process and never reports superseded runs.
//! - [`builder`] pairs the build and test slots.

pub mod builder;
pub mod reusable;
pub mod runner;
pub mod spec;
pub mod termination;

pub use builder::{Builder, BuilderResults};
pub use reusable::{CommandResults, ReusableCommand};
pub use runner::RunOutcome;
pub use spec::CommandSpec;
pub use termination::Termination;

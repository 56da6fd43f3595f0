// src/exec/builder.rs

//! The build + test pair, restarted together.

use tracing::debug;

use crate::config::ConfigFile;
use crate::exec::reusable::{CommandResults, ReusableCommand};
use crate::exec::spec::CommandSpec;

/// Receivers for the two slots of a [`Builder`].
#[derive(Debug)]
pub struct BuilderResults {
    pub build: CommandResults,
    pub test: CommandResults,
}

/// Owns the build and test slots and keeps their lifecycles in step.
#[derive(Debug)]
pub struct Builder {
    build: ReusableCommand,
    test: ReusableCommand,
}

impl Builder {
    pub fn new(build: CommandSpec, test: CommandSpec) -> (Self, BuilderResults) {
        let (build, build_rx) = ReusableCommand::new(build);
        let (test, test_rx) = ReusableCommand::new(test);

        (
            Self { build, test },
            BuilderResults {
                build: build_rx,
                test: test_rx,
            },
        )
    }

    pub fn from_config(cfg: &ConfigFile) -> (Self, BuilderResults) {
        Self::new(
            CommandSpec::from_config(&cfg.build, "Build"),
            CommandSpec::from_config(&cfg.test, "Test"),
        )
    }

    pub fn build_command(&self) -> &ReusableCommand {
        &self.build
    }

    pub fn test_command(&self) -> &ReusableCommand {
        &self.test
    }

    /// Kill both slots, then launch build and test in parallel.
    pub async fn start(&self) {
        debug!("restarting build and test");
        self.kill().await;
        self.build.start().await;
        self.test.start().await;
    }

    /// Kill both slots (test first).
    pub async fn kill(&self) {
        self.test.kill().await;
        self.build.kill().await;
    }
}

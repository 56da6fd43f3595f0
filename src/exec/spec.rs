// src/exec/spec.rs

use std::fmt;
use std::process::Stdio;

use tokio::process::Command;

use crate::config::CommandConfig;

/// Immutable description of a command slot: what to run and how to label it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    name: String,
    program: String,
    args: Vec<String>,
    ignore_exit_codes: Vec<i32>,
}

impl CommandSpec {
    pub fn new<I, S>(name: impl Into<String>, program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            ignore_exit_codes: Vec::new(),
        }
    }

    /// Build a spec from a validated `[build]` / `[test]` section.
    ///
    /// `fallback_name` is used when the section has no explicit `name`.
    pub fn from_config(cfg: &CommandConfig, fallback_name: &str) -> Self {
        let mut parts = cfg.cmd.iter().cloned();
        let program = parts.next().unwrap_or_default();
        Self::new(cfg.display_name(fallback_name), program, parts)
            .with_ignored_exit_codes(cfg.ignore_exit_codes.iter().copied())
    }

    pub fn with_ignored_exit_codes(mut self, codes: impl IntoIterator<Item = i32>) -> Self {
        self.ignore_exit_codes = codes.into_iter().collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn ignores_exit_code(&self, code: Option<i32>) -> bool {
        code.is_some_and(|c| self.ignore_exit_codes.contains(&c))
    }

    /// Derive a fresh, not-yet-started process descriptor.
    ///
    /// Stdout is piped for capture, stderr is piped so it can be drained into
    /// the debug log, stdin is closed. On unix the process leads its own
    /// process group, so a kill can take its descendants down with it.
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(unix)]
        cmd.process_group(0);

        cmd
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

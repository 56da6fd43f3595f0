// src/types.rs

use std::fmt;

/// Last known state of a build or test command.
///
/// - `Dirty`: a run is pending or in progress; any previous output is stale.
/// - `Ok`: the most recent run exited successfully.
/// - `Bad`: the most recent run failed (non-zero exit or could not launch).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Dirty,
    Ok,
    Bad,
}

impl Status {
    pub fn is_dirty(self) -> bool {
        self == Status::Dirty
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Dirty => "dirty",
            Status::Ok => "ok",
            Status::Bad => "bad",
        };
        f.write_str(s)
    }
}

/// Outcome of one completed (non-killed) command run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandResult {
    /// Label of the command that produced this result (e.g. "Build").
    pub name: String,
    /// Captured stdout of the run.
    pub output: String,
    pub status: Status,
}

impl CommandResult {
    pub fn new(name: impl Into<String>, output: impl Into<String>, status: Status) -> Self {
        Self {
            name: name.into(),
            output: output.into(),
            status,
        }
    }

    /// A result that has not been produced yet: no output, `Dirty`.
    pub fn dirty(name: impl Into<String>) -> Self {
        Self::new(name, String::new(), Status::Dirty)
    }

    /// Invalidate the status while keeping the previous output around so the
    /// presentation layer can show it faded.
    pub fn mark_dirty(&mut self) {
        self.status = Status::Dirty;
    }
}

// src/exec/termination.rs

//! Classification of how a child process ended.

use std::process::ExitStatus;

/// Why a process stopped running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Forcibly terminated, either by us (superseded run) or by `SIGKILL`
    /// from elsewhere. Never reported as a result.
    Killed,
    /// Exited with status zero.
    ExitedOk,
    /// Any other termination. `None` when there is no exit code (e.g. a
    /// signal other than `SIGKILL`).
    ExitedError(Option<i32>),
}

impl Termination {
    /// Classify a wait status.
    ///
    /// `kill_requested` must be set when the supervisor itself asked for the
    /// process to be terminated. It is the only signal used on platforms
    /// without wait-status signal information.
    pub fn classify(status: ExitStatus, kill_requested: bool) -> Self {
        if kill_requested || killed_by_signal(&status) {
            return Termination::Killed;
        }

        if status.success() {
            Termination::ExitedOk
        } else {
            Termination::ExitedError(status.code())
        }
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Termination::Killed => None,
            Termination::ExitedOk => Some(0),
            Termination::ExitedError(code) => *code,
        }
    }
}

#[cfg(unix)]
fn killed_by_signal(status: &ExitStatus) -> bool {
    use std::os::unix::process::ExitStatusExt;

    status.signal() == Some(libc::SIGKILL)
}

#[cfg(not(unix))]
fn killed_by_signal(_status: &ExitStatus) -> bool {
    false
}

// src/exec/runner.rs

//! Execution of a single process run.

use std::io;
use std::process::ExitStatus;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdout};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::exec::spec::CommandSpec;
use crate::exec::termination::Termination;
use crate::types::{CommandResult, Status};

/// How one run ended, before deciding whether it is worth reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The process terminated; `output` is the stdout captured up to that
    /// point (empty when the run was killed).
    Finished {
        termination: Termination,
        output: String,
    },
    /// The process could not be launched or waited on.
    Failed(String),
}

/// Launch `spec` and wait for it, or kill it as soon as `cancel_rx` resolves.
///
/// A closed cancel channel (the owning slot was dropped) is treated the same
/// as an explicit cancellation.
pub async fn run_process(
    spec: &CommandSpec,
    run_id: u64,
    cancel_rx: &mut oneshot::Receiver<()>,
) -> RunOutcome {
    info!(
        command = %spec.name(),
        run_id,
        cmd = %spec,
        "starting command process"
    );

    let mut child = match spec.to_command().spawn() {
        Ok(child) => child,
        Err(err) => {
            warn!(command = %spec.name(), run_id, error = %err, "failed to launch command");
            return RunOutcome::Failed(format!("failed to launch `{}`: {}", spec, err));
        }
    };

    let stdout = child.stdout.take();
    if let Some(stderr) = child.stderr.take() {
        drain_stderr(spec.name().to_string(), run_id, stderr);
    }

    tokio::select! {
        res = wait_with_stdout(&mut child, stdout) => match res {
            Ok((status, output)) => {
                let termination = Termination::classify(status, false);
                info!(
                    command = %spec.name(),
                    run_id,
                    exit_code = ?termination.exit_code(),
                    ?termination,
                    "command process exited"
                );
                RunOutcome::Finished { termination, output }
            }
            Err(err) => {
                warn!(command = %spec.name(), run_id, error = %err, "failed waiting for command");
                RunOutcome::Failed(format!("waiting for `{}`: {}", spec, err))
            }
        },

        cancel = &mut *cancel_rx => {
            if cancel.is_err() {
                debug!(command = %spec.name(), run_id, "slot dropped; killing orphaned process");
            } else {
                info!(command = %spec.name(), run_id, "run superseded; killing process");
            }

            kill_process_group(&child, spec.name(), run_id);
            if let Err(err) = child.kill().await {
                warn!(command = %spec.name(), run_id, error = %err, "failed to kill process");
            }

            let termination = match child.wait().await {
                Ok(status) => Termination::classify(status, true),
                Err(_) => Termination::Killed,
            };
            RunOutcome::Finished {
                termination,
                output: String::new(),
            }
        }
    }
}

/// Decide what, if anything, a finished run reports.
///
/// - Killed runs report nothing.
/// - Exit codes listed in `ignore_exit_codes` report nothing.
/// - Zero exit reports `Ok`; everything else, including launch failures,
///   reports `Bad`.
pub fn result_for(spec: &CommandSpec, outcome: RunOutcome) -> Option<CommandResult> {
    match outcome {
        RunOutcome::Finished {
            termination: Termination::Killed,
            ..
        } => None,
        RunOutcome::Finished {
            termination: Termination::ExitedOk,
            output,
        } => Some(CommandResult::new(spec.name(), output, Status::Ok)),
        RunOutcome::Finished {
            termination: Termination::ExitedError(code),
            output,
        } => {
            if spec.ignores_exit_code(code) {
                info!(
                    command = %spec.name(),
                    exit_code = ?code,
                    "exit code is configured as ignored; not reporting this run"
                );
                return None;
            }
            Some(CommandResult::new(spec.name(), output, Status::Bad))
        }
        RunOutcome::Failed(message) => Some(CommandResult::new(spec.name(), message, Status::Bad)),
    }
}

async fn wait_with_stdout(
    child: &mut Child,
    stdout: Option<ChildStdout>,
) -> io::Result<(ExitStatus, String)> {
    let read_stdout = async {
        let mut buf = Vec::new();
        if let Some(mut out) = stdout {
            out.read_to_end(&mut buf).await?;
        }
        Ok::<_, io::Error>(buf)
    };

    let (status, buf) = tokio::try_join!(child.wait(), read_stdout)?;
    Ok((status, String::from_utf8_lossy(&buf).into_owned()))
}

/// SIGKILL every process in the child's group (the child and anything it
/// forked). The child itself is still killed and reaped by the caller.
#[cfg(unix)]
fn kill_process_group(child: &Child, name: &str, run_id: u64) {
    let Some(pid) = child.id() else {
        return;
    };
    let Ok(pgid) = libc::pid_t::try_from(pid) else {
        return;
    };

    // SAFETY: plain syscall; a negative pid addresses the process group
    // created at spawn, which only holds this run's processes.
    let rc = unsafe { libc::kill(-pgid, libc::SIGKILL) };
    if rc != 0 {
        debug!(
            command = %name,
            run_id,
            error = %io::Error::last_os_error(),
            "process group already gone"
        );
    }
}

#[cfg(not(unix))]
fn kill_process_group(_child: &Child, _name: &str, _run_id: u64) {}

/// Stderr is not part of the reported output; keep the pipe drained and log
/// it at debug level.
fn drain_stderr(name: String, run_id: u64, stderr: ChildStderr) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(stderr).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            debug!(command = %name, run_id, "stderr: {}", line);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> CommandSpec {
        CommandSpec::new("Test", "go", ["test"]).with_ignored_exit_codes([1])
    }

    fn finished(termination: Termination, output: &str) -> RunOutcome {
        RunOutcome::Finished {
            termination,
            output: output.to_string(),
        }
    }

    #[test]
    fn killed_runs_report_nothing() {
        assert_eq!(result_for(&spec(), finished(Termination::Killed, "partial")), None);
    }

    #[test]
    fn success_reports_ok_with_output() {
        let res = result_for(&spec(), finished(Termination::ExitedOk, "ok")).expect("result");
        assert_eq!(res, CommandResult::new("Test", "ok", Status::Ok));
    }

    #[test]
    fn failure_reports_bad_unless_ignored() {
        let res = result_for(&spec(), finished(Termination::ExitedError(Some(2)), "FAIL"))
            .expect("result");
        assert_eq!(res.status, Status::Bad);
        assert_eq!(res.output, "FAIL");

        assert_eq!(
            result_for(&spec(), finished(Termination::ExitedError(Some(1)), "flaky")),
            None
        );
    }

    #[test]
    fn launch_failure_reports_bad_with_message() {
        let res = result_for(&spec(), RunOutcome::Failed("no such file".into())).expect("result");
        assert_eq!(res.status, Status::Bad);
        assert!(res.output.contains("no such file"));
    }
}

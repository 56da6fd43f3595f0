// tests/reusable_command.rs

#![cfg(unix)]

use std::error::Error;
use std::fs;
use std::time::Duration;

use tokio::time::{sleep, timeout};

use buildwatch::exec::{CommandResults, CommandSpec, ReusableCommand};
use buildwatch::types::{CommandResult, Status};
use buildwatch_test_utils::{init_tracing, sh, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

/// Assert that no result shows up within `wait`.
async fn assert_silent(results: &mut CommandResults, wait: Duration) {
    if let Ok(Some(res)) = timeout(wait, results.recv()).await {
        panic!("expected no result, got {:?}", res);
    }
}

#[tokio::test]
async fn successful_run_reports_ok_with_stdout() -> TestResult {
    init_tracing();

    let (cmd, mut results) = ReusableCommand::new(sh("Build", "printf ok"));
    cmd.start().await;

    let res = with_timeout(results.recv()).await.expect("result");
    assert_eq!(res, CommandResult::new("Build", "ok", Status::Ok));
    Ok(())
}

#[tokio::test]
async fn failing_run_reports_bad_with_captured_output() -> TestResult {
    init_tracing();

    let (cmd, mut results) = ReusableCommand::new(sh("Test", "printf FAIL; exit 1"));
    cmd.start().await;

    let res = with_timeout(results.recv()).await.expect("result");
    assert_eq!(res.status, Status::Bad);
    assert_eq!(res.output, "FAIL");
    assert_eq!(res.name, "Test");
    Ok(())
}

#[tokio::test]
async fn stderr_is_not_part_of_the_output() -> TestResult {
    init_tracing();

    let (cmd, mut results) =
        ReusableCommand::new(sh("Build", "printf out; printf 'compile error' >&2"));
    cmd.start().await;

    let res = with_timeout(results.recv()).await.expect("result");
    assert_eq!(res.output, "out");
    Ok(())
}

#[tokio::test]
async fn launch_failure_reports_bad() -> TestResult {
    init_tracing();

    let spec = CommandSpec::new("Build", "buildwatch-no-such-program-3f9a", ["x"]);
    let (cmd, mut results) = ReusableCommand::new(spec);
    cmd.start().await;

    let res = with_timeout(results.recv()).await.expect("result");
    assert_eq!(res.status, Status::Bad);
    assert!(res.output.contains("failed to launch"), "output: {}", res.output);
    Ok(())
}

#[tokio::test]
async fn kill_mid_run_reports_nothing_and_slot_restarts() -> TestResult {
    init_tracing();

    let dir = tempfile::tempdir()?;
    let flag = dir.path().join("quick");
    let script = format!(
        "if [ -f '{}' ]; then printf again; else sleep 5; printf late; fi",
        flag.display()
    );
    let (cmd, mut results) = ReusableCommand::new(sh("Test", &script));

    cmd.start().await;
    assert!(cmd.is_running().await);

    with_timeout(cmd.kill()).await;
    assert!(!cmd.is_running().await);
    assert_silent(&mut results, Duration::from_millis(300)).await;

    fs::write(&flag, "")?;
    cmd.start().await;
    let res = with_timeout(results.recv()).await.expect("result");
    assert_eq!(res.output, "again");
    Ok(())
}

#[tokio::test]
async fn kill_on_idle_slot_is_a_no_op() -> TestResult {
    init_tracing();

    let (cmd, mut results) = ReusableCommand::new(sh("Build", "printf ok"));
    cmd.kill().await;
    cmd.kill().await;
    assert!(!cmd.is_running().await);
    assert_silent(&mut results, Duration::from_millis(100)).await;

    cmd.start().await;
    let res = with_timeout(results.recv()).await.expect("result");
    assert_eq!(res.status, Status::Ok);
    Ok(())
}

#[tokio::test]
async fn externally_sigkilled_process_is_not_reported() -> TestResult {
    init_tracing();

    let (cmd, mut results) = ReusableCommand::new(sh("Build", "printf partial; kill -9 $$"));
    cmd.start().await;
    assert_silent(&mut results, Duration::from_millis(500)).await;
    Ok(())
}

#[tokio::test]
async fn ignored_exit_code_reports_nothing() -> TestResult {
    init_tracing();

    let spec = sh("Test", "exit 1").with_ignored_exit_codes([1]);
    let (cmd, mut results) = ReusableCommand::new(spec);
    cmd.start().await;
    assert_silent(&mut results, Duration::from_millis(500)).await;
    Ok(())
}

#[tokio::test]
async fn rapid_starts_deliver_only_the_last_run() -> TestResult {
    init_tracing();

    let (cmd, mut results) = ReusableCommand::new(sh("Test", "sleep 0.3; printf done"));

    for _ in 0..5 {
        cmd.start().await;
    }

    let res = with_timeout(results.recv()).await.expect("result");
    assert_eq!(res.output, "done");
    assert_silent(&mut results, Duration::from_millis(600)).await;
    assert!(!cmd.is_running().await);
    Ok(())
}

#[tokio::test]
async fn buffered_result_of_superseded_run_is_discarded() -> TestResult {
    init_tracing();

    let dir = tempfile::tempdir()?;
    let msg = dir.path().join("msg");
    fs::write(&msg, "one")?;

    let script = format!("cat '{}'", msg.display());
    let (cmd, mut results) = ReusableCommand::new(sh("Build", &script));

    // First run completes and its result sits in the channel unread.
    cmd.start().await;
    for _ in 0..100 {
        if !cmd.is_running().await {
            break;
        }
        sleep(Duration::from_millis(10)).await;
    }

    fs::write(&msg, "two")?;
    cmd.start().await;

    let res = with_timeout(results.recv()).await.expect("result");
    assert_eq!(res.output, "two");
    Ok(())
}

/// Whether `pid` is still a live (non-zombie) process.
#[cfg(target_os = "linux")]
fn is_alive(pid: &str) -> bool {
    match fs::read_to_string(format!("/proc/{}/stat", pid)) {
        // Format: "pid (comm) state ...".
        Ok(stat) => stat
            .rsplit_once(')')
            .and_then(|(_, rest)| rest.split_whitespace().next())
            .is_some_and(|state| state != "Z"),
        Err(_) => false,
    }
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn restarts_and_kill_leave_no_descendants_behind() -> TestResult {
    init_tracing();

    let dir = tempfile::tempdir()?;
    let pids = dir.path().join("pids");
    let script = format!("sleep 30 & echo $! >> '{}'; wait", pids.display());
    let (cmd, mut results) = ReusableCommand::new(sh("Test", &script));

    for _ in 0..3 {
        cmd.start().await;
        sleep(Duration::from_millis(200)).await;
    }
    with_timeout(cmd.kill()).await;

    let recorded = fs::read_to_string(&pids)?;
    let pids: Vec<&str> = recorded.lines().collect();
    assert_eq!(pids.len(), 3, "pids: {:?}", pids);

    let mut survivors = pids.clone();
    for _ in 0..100 {
        survivors.retain(|pid| is_alive(pid));
        if survivors.is_empty() {
            break;
        }
        sleep(Duration::from_millis(20)).await;
    }
    assert!(survivors.is_empty(), "still running: {:?}", survivors);

    assert_silent(&mut results, Duration::from_millis(100)).await;
    Ok(())
}

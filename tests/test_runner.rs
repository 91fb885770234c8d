//! End-to-end runner tests with real child processes

#![cfg(unix)]

use std::sync::Arc;
use std::time::Duration;

use deployerd::deploy::coordinator::{Coordinator, CoordinatorHandle, StatusReport, SUCCESS_LOG_LINE};
use deployerd::deploy::runner::{DeployParams, ShellLauncher};
use deployerd::deploy::status::{DeployStatus, LastOutcome};
use deployerd::filesys::dir::Dir;
use deployerd::storage::layout::StorageLayout;
use deployerd::storage::store::StateStore;

async fn setup(program: &str, args: Vec<String>) -> CoordinatorHandle {
    let dir = Dir::create_temp_dir("deployerd-runner-test").await.unwrap();
    let layout = StorageLayout::new(dir.path());
    let store = StateStore::new(&layout);
    let launcher = Arc::new(ShellLauncher::new(program, args, true));
    let (handle, _join) = Coordinator::spawn(store, launcher).await;
    handle
}

async fn await_idle(handle: &CoordinatorHandle) -> StatusReport {
    for _ in 0..200 {
        let report = handle.status(true).await.unwrap();
        if report.status == DeployStatus::Idle {
            return report;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    panic!("deployment did not complete in time");
}

#[tokio::test]
async fn test_successful_script_run() {
    let handle = setup(
        "/bin/sh",
        vec!["-c".to_string(), "echo pulling; echo done".to_string()],
    )
    .await;

    handle.request_deploy(DeployParams::default()).await.unwrap();

    let report = await_idle(&handle).await;
    assert_eq!(report.outcome, LastOutcome::Successful);
    assert_eq!(report.logs, format!("{}\n", SUCCESS_LOG_LINE));
}

#[tokio::test]
async fn test_failing_script_keeps_tagged_tail() {
    let script = "for i in 1 2 3 4 5 6 7 8; do echo step $i; done; echo boom 1>&2; exit 7";
    let handle = setup("/bin/sh", vec!["-c".to_string(), script.to_string()]).await;

    handle.request_deploy(DeployParams::default()).await.unwrap();

    let report = await_idle(&handle).await;
    assert_eq!(report.outcome, LastOutcome::Failed);

    // Cross-stream interleaving is not deterministic, so only assert on
    // positions that are fixed within a single stream's order.
    let lines: Vec<&str> = report.logs.lines().collect();
    assert_eq!(lines.len(), 5);
    assert!(lines.iter().any(|l| *l == "STDOUT: step 8"));
    // Early output fell out of the tail window
    assert!(!lines.iter().any(|l| *l == "STDOUT: step 1"));
}

#[tokio::test]
async fn test_missing_executable_reports_spawn_error() {
    let handle = setup("/nonexistent/deployerd-missing-script", Vec::new()).await;

    handle.request_deploy(DeployParams::default()).await.unwrap();

    let report = await_idle(&handle).await;
    assert_eq!(report.outcome, LastOutcome::Failed);
    assert!(report.logs.contains("Failed to start"));
}

#[tokio::test]
async fn test_params_exported_as_environment() {
    let handle = setup(
        "/bin/sh",
        vec!["-c".to_string(), "echo image=$DEPLOY_IMAGE; exit 1".to_string()],
    )
    .await;

    let params = DeployParams {
        image: Some("registry.example.com/app:1.2".to_string()),
        ..Default::default()
    };
    handle.request_deploy(params).await.unwrap();

    let report = await_idle(&handle).await;
    assert!(report
        .logs
        .contains("STDOUT: image=registry.example.com/app:1.2"));
}

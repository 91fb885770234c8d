//! State store integration tests

use deployerd::deploy::status::{DeployStatus, LastOutcome};
use deployerd::filesys::dir::Dir;
use deployerd::storage::layout::StorageLayout;
use deployerd::storage::store::StateStore;

async fn temp_store() -> (StateStore, StorageLayout) {
    let dir = Dir::create_temp_dir("deployerd-store-test").await.unwrap();
    let layout = StorageLayout::new(dir.path());
    (StateStore::new(&layout), layout)
}

#[tokio::test]
async fn test_missing_files_degrade_to_defaults() {
    let (store, _layout) = temp_store().await;

    assert_eq!(store.load_status().await, DeployStatus::Idle);
    assert_eq!(store.load_outcome().await, LastOutcome::Unknown);
    assert_eq!(store.load_log().await, "");
}

#[tokio::test]
async fn test_status_round_trip() {
    let (store, _layout) = temp_store().await;

    store.save_status(DeployStatus::Deploying).await;
    assert_eq!(store.load_status().await, DeployStatus::Deploying);

    store.save_status(DeployStatus::Idle).await;
    assert_eq!(store.load_status().await, DeployStatus::Idle);
}

#[tokio::test]
async fn test_outcome_round_trip() {
    let (store, _layout) = temp_store().await;

    store.save_outcome(LastOutcome::Failed).await;
    assert_eq!(store.load_outcome().await, LastOutcome::Failed);

    store.save_outcome(LastOutcome::Successful).await;
    assert_eq!(store.load_outcome().await, LastOutcome::Successful);
}

#[tokio::test]
async fn test_unrecognized_status_reads_as_unknown() {
    let (store, layout) = temp_store().await;

    layout.status_file().write_string("???").await.unwrap();
    assert_eq!(store.load_status().await, DeployStatus::Unknown);
}

#[tokio::test]
async fn test_log_append_and_replace() {
    let (store, _layout) = temp_store().await;

    store.append_log("STDOUT: one\n").await;
    store.append_log("STDERR: two\n").await;
    assert_eq!(store.load_log().await, "STDOUT: one\nSTDERR: two\n");

    store.save_log("replaced\n").await;
    assert_eq!(store.load_log().await, "replaced\n");

    store.save_log("").await;
    assert_eq!(store.load_log().await, "");
}

#[tokio::test]
async fn test_store_is_shared_across_instances() {
    let (store, layout) = temp_store().await;

    store.save_status(DeployStatus::Deploying).await;
    store.save_outcome(LastOutcome::Failed).await;
    store.append_log("interrupted\n").await;

    // A second store over the same layout observes the persisted values
    let reopened = StateStore::new(&layout);
    assert_eq!(reopened.load_status().await, DeployStatus::Deploying);
    assert_eq!(reopened.load_outcome().await, LastOutcome::Failed);
    assert_eq!(reopened.load_log().await, "interrupted\n");
}

//! Retention policy integration: sweeper and workspace lifecycle.

use std::time::Duration;

use tempfile::TempDir;

use reformer_core::{RetentionSweeper, WorkspaceManager};

#[tokio::test]
async fn test_sweeper_reaps_expired_workspace_trees() {
    let root = TempDir::new().unwrap();
    let manager = WorkspaceManager::new(root.path());

    let ws = manager.create().await.unwrap();
    let out = ws.output_dir().await.unwrap();
    tokio::fs::write(out.join("artifact.pdf"), b"result bytes")
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(60)).await;
    let stats = RetentionSweeper::sweep_once(root.path(), Duration::from_millis(20)).await;

    assert_eq!(stats.reaped, 1);
    assert!(manager.open(ws.id()).await.is_err());
}

#[tokio::test]
async fn test_sweeper_leaves_active_workspaces_alone() {
    let root = TempDir::new().unwrap();
    let manager = WorkspaceManager::new(root.path());

    let ws = manager.create().await.unwrap();
    ws.output_dir().await.unwrap();

    for _ in 0..4 {
        RetentionSweeper::sweep_once(root.path(), Duration::from_secs(1800)).await;
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert!(manager.open(ws.id()).await.is_ok());
}

#[tokio::test]
async fn test_background_loop_reaps_on_interval() {
    let root = TempDir::new().unwrap();
    let manager = WorkspaceManager::new(root.path());
    let ws = manager.create().await.unwrap();
    ws.input_dir().await.unwrap();

    tokio::time::sleep(Duration::from_millis(60)).await;

    let sweeper = RetentionSweeper::new(
        root.path(),
        Duration::from_millis(20),
        Duration::from_millis(25),
    );
    let handle = sweeper.start();

    // A couple of intervals is plenty for the loop to catch it.
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(manager.open(ws.id()).await.is_err());

    sweeper.stop();
    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("sweeper loop did not shut down")
        .unwrap();
}

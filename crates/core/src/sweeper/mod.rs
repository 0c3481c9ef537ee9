//! Retention sweeper: reclaims workspaces older than the TTL.
//!
//! Runs on its own timer task, fully decoupled from request handling,
//! and holds no locks; the filesystem is the only shared resource and
//! paths never cross workspaces.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::metrics;

/// Outcome of one sweep pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub scanned: usize,
    pub reaped: usize,
    pub failed: usize,
}

/// Background reaper for expired workspaces.
pub struct RetentionSweeper {
    root: PathBuf,
    ttl: Duration,
    interval: Duration,
    running: Arc<AtomicBool>,
    shutdown_tx: broadcast::Sender<()>,
}

impl RetentionSweeper {
    pub fn new(root: impl Into<PathBuf>, ttl: Duration, interval: Duration) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            root: root.into(),
            ttl,
            interval,
            running: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
        }
    }

    /// Spawns the sweep loop.
    pub fn start(&self) -> tokio::task::JoinHandle<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Retention sweeper already running");
            return tokio::spawn(async {});
        }

        info!(
            root = %self.root.display(),
            ttl_secs = self.ttl.as_secs(),
            interval_secs = self.interval.as_secs(),
            "Starting retention sweeper"
        );

        let root = self.root.clone();
        let ttl = self.ttl;
        let interval = self.interval;
        let running = Arc::clone(&self.running);
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let stats = Self::sweep_once(&root, ttl).await;
                        if stats.reaped > 0 || stats.failed > 0 {
                            info!(
                                scanned = stats.scanned,
                                reaped = stats.reaped,
                                failed = stats.failed,
                                "Sweep pass finished"
                            );
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        break;
                    }
                }
            }

            running.store(false, Ordering::SeqCst);
            info!("Retention sweeper stopped");
        })
    }

    /// Signals the loop to stop after the current pass.
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(());
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// One pass over the workspace root. A failure on one workspace never
    /// aborts the sweep of the others, and deletion races (another pass,
    /// manual cleanup) are a no-op.
    pub async fn sweep_once(root: &Path, ttl: Duration) -> SweepStats {
        let mut stats = SweepStats::default();

        let mut entries = match tokio::fs::read_dir(root).await {
            Ok(entries) => entries,
            // Root not created yet: nothing to sweep.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return stats,
            Err(e) => {
                warn!(root = %root.display(), error = %e, "Cannot read workspace root");
                stats.failed += 1;
                return stats;
            }
        };

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "Error while listing workspaces");
                    stats.failed += 1;
                    break;
                }
            };

            let path = entry.path();
            stats.scanned += 1;

            let is_dir = entry
                .file_type()
                .await
                .map(|t| t.is_dir())
                .unwrap_or(false);
            if !is_dir {
                debug!(path = %path.display(), "Skipping non-directory entry");
                continue;
            }

            let age = match entry
                .metadata()
                .await
                .and_then(|m| m.modified())
                .map(|m| SystemTime::now().duration_since(m).unwrap_or_default())
            {
                Ok(age) => age,
                Err(e) => {
                    // Possibly removed between listing and stat.
                    debug!(path = %path.display(), error = %e, "Could not stat workspace");
                    continue;
                }
            };

            if age <= ttl {
                continue;
            }

            match tokio::fs::remove_dir_all(&path).await {
                Ok(()) => {
                    debug!(path = %path.display(), age_secs = age.as_secs(), "Reaped workspace");
                    metrics::WORKSPACES_REAPED.inc();
                    stats.reaped += 1;
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to reap workspace");
                    stats.failed += 1;
                }
            }
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const YOUNG_TTL: Duration = Duration::from_secs(3600);
    const EXPIRED_TTL: Duration = Duration::from_millis(10);

    async fn make_workspace(root: &Path, name: &str) -> PathBuf {
        let path = root.join(name);
        tokio::fs::create_dir_all(path.join("out")).await.unwrap();
        tokio::fs::write(path.join("out/artifact.pdf"), b"data")
            .await
            .unwrap();
        path
    }

    #[tokio::test]
    async fn test_expired_workspace_is_reaped() {
        let root = TempDir::new().unwrap();
        let ws = make_workspace(root.path(), "old-job").await;

        tokio::time::sleep(Duration::from_millis(50)).await;
        let stats = RetentionSweeper::sweep_once(root.path(), EXPIRED_TTL).await;

        assert_eq!(stats.reaped, 1);
        assert!(!ws.exists());
    }

    #[tokio::test]
    async fn test_young_workspace_survives_repeated_sweeps() {
        let root = TempDir::new().unwrap();
        let ws = make_workspace(root.path(), "fresh-job").await;

        for _ in 0..3 {
            let stats = RetentionSweeper::sweep_once(root.path(), YOUNG_TTL).await;
            assert_eq!(stats.reaped, 0);
        }
        assert!(ws.exists());
    }

    #[tokio::test]
    async fn test_sweep_handles_mixed_ages() {
        let root = TempDir::new().unwrap();
        let old = make_workspace(root.path(), "old-job").await;
        tokio::time::sleep(Duration::from_millis(400)).await;

        // Sweep with a TTL that puts only the first workspace past it.
        let young = make_workspace(root.path(), "young-job").await;
        let stats = RetentionSweeper::sweep_once(root.path(), Duration::from_millis(200)).await;

        assert_eq!(stats.scanned, 2);
        assert_eq!(stats.reaped, 1);
        assert!(!old.exists());
        assert!(young.exists());
    }

    #[tokio::test]
    async fn test_missing_root_is_empty_sweep() {
        let root = TempDir::new().unwrap();
        let gone = root.path().join("never-created");
        let stats = RetentionSweeper::sweep_once(&gone, EXPIRED_TTL).await;
        assert_eq!(stats, SweepStats::default());
    }

    #[tokio::test]
    async fn test_plain_files_in_root_are_left_alone() {
        let root = TempDir::new().unwrap();
        let stray = root.path().join("stray.txt");
        tokio::fs::write(&stray, b"not a workspace").await.unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        let stats = RetentionSweeper::sweep_once(root.path(), EXPIRED_TTL).await;

        assert_eq!(stats.reaped, 0);
        assert!(stray.exists());
    }

    #[tokio::test]
    async fn test_start_and_stop_lifecycle() {
        let root = TempDir::new().unwrap();
        let sweeper = RetentionSweeper::new(
            root.path(),
            YOUNG_TTL,
            Duration::from_millis(20),
        );

        let handle = sweeper.start();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(sweeper.is_running());

        sweeper.stop();
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("sweeper did not stop")
            .unwrap();
        assert!(!sweeper.is_running());
    }
}

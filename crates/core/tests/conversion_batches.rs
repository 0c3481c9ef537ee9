//! Batch conversion integration tests.
//!
//! These drive the conversion service with a mock transcode engine and
//! real in-process codecs, verifying the batch contract: N items in, N
//! index-aligned outcomes out, per-item failures never aborting the rest.

use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use reformer_core::engines::{EngineStatus, EnginesConfig};
use reformer_core::images::ImageOutputFormat;
use reformer_core::pipeline::VideoOutputFormat;
use reformer_core::service::ConversionService;
use reformer_core::testing::MockTranscoder;
use reformer_core::{
    AudioSupport, Config, EngineSet, IncomingItem, ItemOutcome, UploadedItem, Workspace,
    WorkspaceManager,
};

struct TestHarness {
    service: ConversionService,
    manager: WorkspaceManager,
    _root: TempDir,
}

impl TestHarness {
    /// Engines resolve as present so availability checks pass; the
    /// transcoder itself is the mock.
    fn new(transcoder: MockTranscoder) -> Self {
        let root = TempDir::new().unwrap();
        let manager = WorkspaceManager::new(root.path());

        let engines = Arc::new(EngineSet::from_statuses(
            EngineStatus::Ready {
                path: PathBuf::from("ffmpeg"),
            },
            EngineStatus::Ready {
                path: PathBuf::from("ffprobe"),
            },
            EngineStatus::NotConfigured,
            EngineStatus::NotConfigured,
            EngineStatus::NotConfigured,
        ));

        let config = Config {
            engines: EnginesConfig::default(),
            ..Config::default()
        };

        let service = ConversionService::new(
            &config,
            engines,
            AudioSupport::assume_baseline(),
            manager.clone(),
        )
        .with_transcoder(Arc::new(transcoder));

        Self {
            service,
            manager,
            _root: root,
        }
    }

    async fn workspace(&self) -> Workspace {
        self.manager.create().await.unwrap()
    }

    /// Stores raw bytes as an accepted upload in the workspace.
    async fn accepted(&self, ws: &Workspace, name: &str, bytes: &[u8]) -> IncomingItem {
        let input_dir = ws.input_dir().await.unwrap();
        let stored_name = format!("{}-{}", chrono::Utc::now().timestamp_millis(), name);
        let path = input_dir.join(&stored_name);
        tokio::fs::write(&path, bytes).await.unwrap();
        IncomingItem::Accepted(UploadedItem {
            original_name: name.to_string(),
            stored_name,
            path,
            size_bytes: bytes.len() as u64,
            declared_mime: None,
        })
    }
}

fn png_bytes() -> Vec<u8> {
    let mut img = image::RgbaImage::new(8, 8);
    for pixel in img.pixels_mut() {
        *pixel = image::Rgba([0, 128, 255, 255]);
    }
    let mut bytes = std::io::Cursor::new(Vec::new());
    img.write_to(&mut bytes, image::ImageFormat::Png).unwrap();
    bytes.into_inner()
}

#[tokio::test]
async fn test_image_batch_isolates_corrupt_item() {
    let harness = TestHarness::new(MockTranscoder::succeeding());
    let ws = harness.workspace().await;

    let items = vec![
        harness.accepted(&ws, "one.png", &png_bytes()).await,
        harness.accepted(&ws, "two.png", b"corrupt junk").await,
        harness.accepted(&ws, "three.png", &png_bytes()).await,
    ];

    let outcomes = harness
        .service
        .convert_image_batch(&ws, items, ImageOutputFormat::Jpeg, Some(80))
        .await
        .unwrap();

    // [success, failure, success], index-aligned with the upload order.
    assert_eq!(outcomes.len(), 3);
    assert!(outcomes[0].is_success());
    assert!(!outcomes[1].is_success());
    assert!(outcomes[2].is_success());
    assert_eq!(outcomes[0].original_name(), "one.png");
    assert_eq!(outcomes[1].original_name(), "two.png");
    assert_eq!(outcomes[2].original_name(), "three.png");

    // The output directory holds exactly the two produced artifacts.
    let out_dir = ws.output_dir().await.unwrap();
    let mut produced = 0;
    let mut entries = tokio::fs::read_dir(&out_dir).await.unwrap();
    while let Some(entry) = entries.next_entry().await.unwrap() {
        if entry.file_type().await.unwrap().is_file() {
            produced += 1;
        }
    }
    assert_eq!(produced, 2);
}

#[tokio::test]
async fn test_rejected_items_keep_their_batch_position() {
    let harness = TestHarness::new(MockTranscoder::succeeding());
    let ws = harness.workspace().await;

    let items = vec![
        harness.accepted(&ws, "ok.png", &png_bytes()).await,
        IncomingItem::Rejected {
            original_name: "nope.exe".to_string(),
            error: "extension .exe is not allowed for images".to_string(),
        },
    ];

    let outcomes = harness
        .service
        .convert_image_batch(&ws, items, ImageOutputFormat::Png, None)
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes[0].is_success());
    match &outcomes[1] {
        ItemOutcome::Error(failure) => {
            assert_eq!(failure.original_name, "nope.exe");
            assert!(failure.error.contains("exe"));
        }
        other => panic!("expected failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_video_fallback_reports_second_strategy() {
    let transcoder = MockTranscoder::failing_first(1);
    let harness = TestHarness::new(transcoder.clone());
    let ws = harness.workspace().await;

    let items = vec![harness.accepted(&ws, "clip.avi", b"fake video").await];
    let outcomes = harness
        .service
        .transcode_video_batch(&ws, items, VideoOutputFormat::Mp4)
        .await
        .unwrap();

    match &outcomes[0] {
        ItemOutcome::Success(success) => {
            assert_eq!(success.strategy.as_deref(), Some("h264-aac"));
            assert!(success.output_name.ends_with("_reformed.mp4"));
        }
        other => panic!("expected success, got {:?}", other),
    }
    assert_eq!(
        transcoder.attempts().await,
        vec!["copy".to_string(), "h264-aac".to_string()]
    );
}

#[tokio::test]
async fn test_video_batch_mixed_failure() {
    let harness = TestHarness::new(MockTranscoder::failing_for_input("broken"));
    let ws = harness.workspace().await;

    let items = vec![
        harness.accepted(&ws, "good.mp4", b"ok").await,
        harness.accepted(&ws, "broken.mp4", b"bad").await,
        harness.accepted(&ws, "fine.mp4", b"ok").await,
    ];

    let outcomes = harness
        .service
        .transcode_video_batch(&ws, items, VideoOutputFormat::Mkv)
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 3);
    assert!(outcomes[0].is_success());
    assert!(!outcomes[1].is_success());
    assert!(outcomes[2].is_success());

    // The failing item surfaces the last strategy's error.
    match &outcomes[1] {
        ItemOutcome::Error(failure) => assert!(failure.error.contains("h264-aac")),
        other => panic!("expected failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_batch_is_request_wide_error() {
    let harness = TestHarness::new(MockTranscoder::succeeding());
    let ws = harness.workspace().await;

    let result = harness
        .service
        .transcode_video_batch(&ws, Vec::new(), VideoOutputFormat::Mp4)
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_office_batch_fails_fast_without_engine() {
    let harness = TestHarness::new(MockTranscoder::succeeding());
    let ws = harness.workspace().await;

    let items = vec![harness.accepted(&ws, "doc.docx", b"fake doc").await];
    let err = harness
        .service
        .convert_office_batch(&ws, items)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not configured"));
}

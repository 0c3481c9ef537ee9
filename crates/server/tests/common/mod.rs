//! Shared helpers for server integration tests.

use std::io::Write;
use std::net::TcpListener;
use std::time::Duration;

use reqwest::Client;
use tempfile::{NamedTempFile, TempDir};
use tokio::time::sleep;

/// Find an available port
pub fn get_available_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

/// Create a config with an isolated workspace root and engines that
/// resolve as unavailable, so tests never depend on installed binaries.
pub fn test_config(port: u16, storage_root: &std::path::Path) -> String {
    format!(
        r#"
[server]
host = "127.0.0.1"
port = {}

[storage]
root = "{}"
ttl_secs = 1800
sweep_interval_secs = 300

[engines]
ffmpeg = "/nonexistent/ffmpeg"
ffprobe = "/nonexistent/ffprobe"
"#,
        port,
        storage_root.display()
    )
}

pub struct TestServer {
    pub port: u16,
    pub client: Client,
    child: tokio::process::Child,
    _config_file: NamedTempFile,
    _storage_root: TempDir,
}

impl TestServer {
    /// Spawns the server binary with a scratch config and waits for it
    /// to answer health checks.
    pub async fn start() -> Self {
        let port = get_available_port();
        let storage_root = TempDir::new().unwrap();
        let config = test_config(port, storage_root.path());

        let mut config_file = NamedTempFile::new().unwrap();
        config_file.write_all(config.as_bytes()).unwrap();
        config_file.flush().unwrap();

        let child = tokio::process::Command::new(env!("CARGO_BIN_EXE_reformer"))
            .env("REFORMER_CONFIG", config_file.path())
            .env("RUST_LOG", "error") // Quiet logs during tests
            .kill_on_drop(true)
            .spawn()
            .expect("Failed to spawn server");

        let server = Self {
            port,
            client: Client::new(),
            child,
            _config_file: config_file,
            _storage_root: storage_root,
        };

        assert!(
            server.wait_until_ready(100).await,
            "Server did not start in time"
        );
        server
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{}", self.port, path)
    }

    async fn wait_until_ready(&self, max_attempts: u32) -> bool {
        for _ in 0..max_attempts {
            if self
                .client
                .get(self.url("/api/v1/health"))
                .send()
                .await
                .is_ok()
            {
                return true;
            }
            sleep(Duration::from_millis(50)).await;
        }
        false
    }

    pub async fn stop(mut self) {
        self.child.kill().await.ok();
    }
}

/// Small valid PNG payload built in-memory.
pub fn png_bytes() -> Vec<u8> {
    let mut img = image::RgbaImage::new(16, 16);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        *pixel = image::Rgba([(x * 16) as u8, (y * 16) as u8, 128, 255]);
    }
    let mut bytes = std::io::Cursor::new(Vec::new());
    img.write_to(&mut bytes, image::ImageFormat::Png).unwrap();
    bytes.into_inner()
}

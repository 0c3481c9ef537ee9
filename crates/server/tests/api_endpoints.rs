//! End-to-end API tests for the in-process conversion paths (images,
//! archives) and the async job protocol.

mod common;

use std::time::Duration;

use common::{png_bytes, TestServer};
use tokio::time::sleep;

fn image_part(name: &str, bytes: Vec<u8>) -> reqwest::multipart::Part {
    reqwest::multipart::Part::bytes(bytes)
        .file_name(name.to_string())
        .mime_str("image/png")
        .unwrap()
}

#[tokio::test]
async fn test_image_batch_with_corrupt_item_keeps_order() {
    let server = TestServer::start().await;

    let form = reqwest::multipart::Form::new()
        .text("format", "jpeg")
        .text("quality", "85")
        .part("files", image_part("one.png", png_bytes()))
        .part("files", image_part("two.png", b"corrupt bytes".to_vec()))
        .part("files", image_part("three.png", png_bytes()));

    let response = server
        .client
        .post(server.url("/api/v1/convert/image"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let json: serde_json::Value = response.json().await.unwrap();
    let items = json["items"].as_array().unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0]["status"], "success");
    assert_eq!(items[1]["status"], "error");
    assert_eq!(items[2]["status"], "success");
    assert_eq!(items[0]["original_name"], "one.png");
    assert_eq!(items[1]["original_name"], "two.png");

    // The produced artifact downloads with an attachment disposition.
    let download_url = items[0]["download_url"].as_str().unwrap();
    let artifact = server
        .client
        .get(server.url(download_url))
        .send()
        .await
        .unwrap();
    assert!(artifact.status().is_success());
    assert!(artifact
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .contains("attachment"));
    let bytes = artifact.bytes().await.unwrap();
    assert!(!bytes.is_empty());

    server.stop().await;
}

#[tokio::test]
async fn test_disallowed_extension_is_item_failure_not_request_failure() {
    let server = TestServer::start().await;

    let form = reqwest::multipart::Form::new()
        .text("format", "png")
        .part("files", image_part("good.png", png_bytes()))
        .part(
            "files",
            reqwest::multipart::Part::bytes(b"#!/bin/sh".to_vec())
                .file_name("script.sh")
                .mime_str("text/x-shellscript")
                .unwrap(),
        );

    let response = server
        .client
        .post(server.url("/api/v1/convert/image"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let json: serde_json::Value = response.json().await.unwrap();
    let items = json["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["status"], "success");
    assert_eq!(items[1]["status"], "error");
    assert!(items[1]["error"].as_str().unwrap().contains(".sh"));

    server.stop().await;
}

#[tokio::test]
async fn test_image_conversion_without_format_is_bad_request() {
    let server = TestServer::start().await;

    let form = reqwest::multipart::Form::new().part("files", image_part("a.png", png_bytes()));
    let response = server
        .client
        .post(server.url("/api/v1/convert/image"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    server.stop().await;
}

#[tokio::test]
async fn test_archive_job_polling_lifecycle() {
    let server = TestServer::start().await;

    let form = reqwest::multipart::Form::new()
        .text("level", "deflate")
        .part(
            "files",
            reqwest::multipart::Part::bytes(vec![42u8; 100_000])
                .file_name("blob.bin")
                .mime_str("application/octet-stream")
                .unwrap(),
        )
        .part(
            "files",
            reqwest::multipart::Part::bytes(b"small text file".to_vec())
                .file_name("note.txt")
                .mime_str("text/plain")
                .unwrap(),
        );

    let response = server
        .client
        .post(server.url("/api/v1/archive/compress"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    // 202-equivalent: control returns before the work finishes.
    assert_eq!(response.status(), 202);
    let json: serde_json::Value = response.json().await.unwrap();
    let workspace_id = json["workspace_id"].as_str().unwrap().to_string();

    // Poll until the terminal state appears.
    let status_url = server.url(&format!("/api/v1/archive/status/{}", workspace_id));
    let mut terminal: Option<serde_json::Value> = None;
    for _ in 0..100 {
        let poll: serde_json::Value = server
            .client
            .get(&status_url)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        match poll["status"].as_str() {
            Some("processing") => sleep(Duration::from_millis(50)).await,
            Some("completed") => {
                terminal = Some(poll);
                break;
            }
            other => panic!("unexpected job status: {:?}", other),
        }
    }
    let terminal = terminal.expect("job never completed");

    // Reported byte count matches the downloadable artifact exactly.
    let bytes_reported = terminal["bytes"].as_u64().unwrap();
    let download = server
        .client
        .get(server.url(terminal["download_url"].as_str().unwrap()))
        .send()
        .await
        .unwrap();
    assert!(download.status().is_success());
    assert_eq!(download.bytes().await.unwrap().len() as u64, bytes_reported);

    // Terminal reads are idempotent.
    let again: serde_json::Value = server
        .client
        .get(&status_url)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(again, terminal);

    server.stop().await;
}

#[tokio::test]
async fn test_audio_transcode_with_unknown_format_is_bad_request() {
    let server = TestServer::start().await;

    let form = reqwest::multipart::Form::new()
        .text("format", "xyz")
        .part(
            "files",
            reqwest::multipart::Part::bytes(b"fake audio".to_vec())
                .file_name("song.mp3")
                .mime_str("audio/mpeg")
                .unwrap(),
        );

    let response = server
        .client
        .post(server.url("/api/v1/audio/transcode"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let json: serde_json::Value = response.json().await.unwrap();
    assert!(json["error"].as_str().unwrap().contains("xyz"));

    server.stop().await;
}

#[tokio::test]
async fn test_archive_extract_roundtrip() {
    let server = TestServer::start().await;

    // Build a zip in-memory via the compress endpoint's own format? No:
    // craft one directly so extraction is tested in isolation.
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        use std::io::Write;
        let mut writer = zip::ZipWriter::new(&mut cursor);
        writer
            .start_file("docs/readme.txt", zip::write::FileOptions::default())
            .unwrap();
        writer.write_all(b"hello from inside the zip").unwrap();
        writer.finish().unwrap();
    }

    let form = reqwest::multipart::Form::new().part(
        "file",
        reqwest::multipart::Part::bytes(cursor.into_inner())
            .file_name("bundle.zip")
            .mime_str("application/zip")
            .unwrap(),
    );

    let response = server
        .client
        .post(server.url("/api/v1/archive/extract"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(json["count"], 1);
    let entry = &json["files"][0];
    assert_eq!(entry["name"], "readme.txt");
    assert_eq!(entry["original_name"], "docs/readme.txt");

    let content = server
        .client
        .get(server.url(entry["download_url"].as_str().unwrap()))
        .send()
        .await
        .unwrap()
        .bytes()
        .await
        .unwrap();
    assert_eq!(&content[..], b"hello from inside the zip");

    server.stop().await;
}

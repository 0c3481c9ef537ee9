mod common;

use common::TestServer;

#[tokio::test]
async fn test_health_endpoint_reports_engine_states() {
    let server = TestServer::start().await;

    let response = server
        .client
        .get(server.url("/api/v1/health"))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let json: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(json["status"], "ok");
    // Engines were configured to nonexistent paths; the health payload
    // says so instead of the server refusing to boot.
    assert!(json["engines"]["ffmpeg"]
        .as_str()
        .unwrap()
        .starts_with("unavailable"));
    assert_eq!(json["engines"]["libreoffice"], "not_configured");

    server.stop().await;
}

#[tokio::test]
async fn test_config_endpoint_returns_effective_config() {
    let server = TestServer::start().await;

    let response = server
        .client
        .get(server.url("/api/v1/config"))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(json["server"]["port"], server.port);
    assert_eq!(json["limits"]["max_files"], 10);

    server.stop().await;
}

#[tokio::test]
async fn test_download_for_unknown_workspace_is_not_found() {
    let server = TestServer::start().await;

    let response = server
        .client
        .get(server.url(
            "/api/v1/download/00000000-0000-4000-8000-000000000000/out.pdf",
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    // Garbage ids are a 404 too, not a server error.
    let response = server
        .client
        .get(server.url("/api/v1/download/not-a-uuid/out.pdf"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    server.stop().await;
}

#[tokio::test]
async fn test_archive_status_for_unknown_job_is_not_found() {
    let server = TestServer::start().await;

    let response = server
        .client
        .get(server.url(
            "/api/v1/archive/status/00000000-0000-4000-8000-000000000000",
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(json["status"], "not_found");

    server.stop().await;
}

#[tokio::test]
async fn test_metrics_endpoint_serves_prometheus_text() {
    let server = TestServer::start().await;

    let response = server
        .client
        .get(server.url("/metrics"))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    server.stop().await;
}

#[tokio::test]
async fn test_office_conversion_without_engine_fails_with_diagnostic() {
    let server = TestServer::start().await;

    let form = reqwest::multipart::Form::new().part(
        "files",
        reqwest::multipart::Part::bytes(b"fake document".to_vec())
            .file_name("report.docx")
            .mime_str("application/octet-stream")
            .unwrap(),
    );

    let response = server
        .client
        .post(server.url("/api/v1/convert/office"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 500);

    let json: serde_json::Value = response.json().await.unwrap();
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("not configured"));

    server.stop().await;
}

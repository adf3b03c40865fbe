//! End-to-end sync against a fake GCS JSON API.

use base64::Engine;
use image::{DynamicImage, ImageFormat, RgbImage};
use md5::{Digest, Md5};
use portraitsync::{sync_portraits, GcsClient, SyncConfig};
use serde_json::json;
use std::io::Cursor;
use std::process::Command;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn png(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(RgbImage::new(width, height))
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

fn object(name: &str, data: &[u8]) -> serde_json::Value {
    json!({
        "name": name,
        "size": data.len().to_string(),
        "md5Hash": base64::engine::general_purpose::STANDARD.encode(Md5::digest(data)),
    })
}

async fn mount_listing(server: &MockServer, prefix: &str, items: Vec<serde_json::Value>) {
    Mock::given(method("GET"))
        .and(path("/storage/v1/b/afaculty/o"))
        .and(query_param("prefix", prefix))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": items })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn syncs_largest_portrait_per_identifier() {
    let server = MockServer::start().await;
    let large = png(1200, 900);
    let small = png(50, 50);

    mount_listing(
        &server,
        "jane-doe/",
        vec![
            json!({ "name": "jane-doe/" }),
            object("jane-doe/thumb.jpg", &small),
            object("jane-doe/original.PNG", &large),
            json!({ "name": "jane-doe/cv.pdf", "size": "99999999" }),
        ],
    )
    .await;
    mount_listing(&server, "john-smith/", vec![]).await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/storage/v1/b/afaculty/o/jane-doe.*original\.PNG$"))
        .and(query_param("alt", "media"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(large.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = SyncConfig {
        endpoint: server.uri(),
        output_dir: dir.path().to_path_buf(),
        ..SyncConfig::default()
    };
    let store = GcsClient::new(&config).unwrap();
    let identifiers = vec!["jane-doe".to_string(), "john-smith".to_string()];

    let summary = sync_portraits(&config, &store, &identifiers).await.unwrap();
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.skipped, 1);
    assert!(summary.is_success());

    let cover = image::open(dir.path().join("jane-doe/cover.jpg")).unwrap();
    assert_eq!((cover.width(), cover.height()), (512, 384));
    let profile = image::open(dir.path().join("jane-doe/profile.jpg")).unwrap();
    assert_eq!((profile.width(), profile.height()), (256, 192));
    assert!(!dir.path().join("john-smith").exists());
}

#[tokio::test]
async fn corrupted_download_is_reported_and_batch_continues() {
    let server = MockServer::start().await;
    let good = png(80, 40);
    let advertised = png(10, 10);

    mount_listing(&server, "alan-turing/", vec![object("alan-turing/a.png", &advertised)]).await;
    mount_listing(&server, "jane-doe/", vec![object("jane-doe/b.png", &good)]).await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/storage/v1/b/afaculty/o/alan-turing.*a\.png$"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(good.clone()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/storage/v1/b/afaculty/o/jane-doe.*b\.png$"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(good.clone()))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = SyncConfig {
        endpoint: server.uri(),
        output_dir: dir.path().to_path_buf(),
        ..SyncConfig::default()
    };
    let store = GcsClient::new(&config).unwrap();
    let identifiers = vec!["alan-turing".to_string(), "jane-doe".to_string()];

    let summary = sync_portraits(&config, &store, &identifiers).await.unwrap();
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].0, "alan-turing");
    assert!(summary.failed[0].1.contains("MD5 mismatch"));
    assert_eq!(summary.processed, 1);

    let cover = image::open(dir.path().join("jane-doe/cover.jpg")).unwrap();
    assert_eq!((cover.width(), cover.height()), (80, 40));
}

#[tokio::test]
async fn cli_without_identifiers_exits_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let blank = dir.path().join("ids.txt");
    std::fs::write(&blank, "\n   \n").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_portraitsync"))
        .arg("--endpoint")
        .arg(server.uri())
        .arg("--output")
        .arg(dir.path().join("out"))
        .arg("--from-file")
        .arg(&blank)
        .arg("--id")
        .arg("  ")
        .env_remove("GOOGLE_OAUTH_ACCESS_TOKEN")
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No identifiers provided"), "stderr: {}", stderr);
    assert!(!dir.path().join("out").exists());
}

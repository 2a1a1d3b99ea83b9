//! Integration tests for the HTTP archive fetcher against a mock archive

use std::path::Path;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tripdata::adapters::archive::{ArtifactFetcher, HttpArchiveFetcher};
use tripdata::config::{secret_string, DownloadConfig, RetryConfig};
use tripdata::domain::{
    partial_path, Category, DataLayout, DescriptorId, FetchFailure, FileDescriptor, Month,
    StageStatus, Year,
};

const RAW_PATH: &str = "/yellow/yellow_tripdata_2019-01.csv.gz";

fn config(base_url: &str, max_retries: usize) -> DownloadConfig {
    DownloadConfig {
        base_url: base_url.to_string(),
        timeout_seconds: 10,
        connect_timeout_seconds: 5,
        retry: RetryConfig {
            max_retries,
            initial_delay_ms: 1,
            max_delay_ms: 5,
            backoff_multiplier: 2.0,
        },
        ..DownloadConfig::default()
    }
}

fn descriptor(base_url: &str, dir: &Path) -> FileDescriptor {
    let layout = DataLayout::new(base_url, dir, "prod");
    layout.describe(DescriptorId::new(
        Category::Yellow,
        Year::new(2019).unwrap(),
        Month::new(1).unwrap(),
    ))
}

#[tokio::test]
async fn test_downloads_to_final_path() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", RAW_PATH)
        .match_header("user-agent", "taxi-rides-ny-downloader")
        .match_header("accept", "application/octet-stream")
        .with_status(200)
        .with_body("VendorID,fare_amount\n1,12.5\n")
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let descriptor = descriptor(&server.url(), dir.path());
    let fetcher = HttpArchiveFetcher::new(&config(&server.url(), 0), None).unwrap();

    let status = fetcher.fetch(&descriptor, false).await.unwrap();

    assert_eq!(status, StageStatus::Completed);
    assert_eq!(
        std::fs::read_to_string(&descriptor.raw_path).unwrap(),
        "VendorID,fare_amount\n1,12.5\n"
    );
    assert!(!partial_path(&descriptor.raw_path).exists());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_sends_bearer_token() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", RAW_PATH)
        .match_header("authorization", "Bearer ghp_secret")
        .with_status(200)
        .with_body("x")
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let descriptor = descriptor(&server.url(), dir.path());
    let token = secret_string("ghp_secret".to_string());
    let fetcher = HttpArchiveFetcher::new(&config(&server.url(), 0), Some(token)).unwrap();

    fetcher.fetch(&descriptor, false).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_existing_artifact_is_skipped_without_network() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", RAW_PATH)
        .expect(0)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let descriptor = descriptor(&server.url(), dir.path());
    std::fs::create_dir_all(descriptor.raw_path.parent().unwrap()).unwrap();
    std::fs::write(&descriptor.raw_path, "old").unwrap();

    let fetcher = HttpArchiveFetcher::new(&config(&server.url(), 0), None).unwrap();
    let status = fetcher.fetch(&descriptor, false).await.unwrap();

    assert_eq!(status, StageStatus::Skipped);
    assert_eq!(std::fs::read_to_string(&descriptor.raw_path).unwrap(), "old");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_existing_columnar_artifact_is_skipped() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", RAW_PATH)
        .expect(0)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let descriptor = descriptor(&server.url(), dir.path());
    std::fs::create_dir_all(descriptor.columnar_path.parent().unwrap()).unwrap();
    std::fs::write(&descriptor.columnar_path, "PAR1").unwrap();

    let fetcher = HttpArchiveFetcher::new(&config(&server.url(), 0), None).unwrap();
    let status = fetcher.fetch(&descriptor, false).await.unwrap();

    assert_eq!(status, StageStatus::Skipped);
    assert!(!descriptor.raw_path.exists());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_force_overwrites_existing_artifact() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", RAW_PATH)
        .with_status(200)
        .with_body("new")
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let descriptor = descriptor(&server.url(), dir.path());
    std::fs::create_dir_all(descriptor.raw_path.parent().unwrap()).unwrap();
    std::fs::write(&descriptor.raw_path, "old").unwrap();

    let fetcher = HttpArchiveFetcher::new(&config(&server.url(), 0), None).unwrap();
    let status = fetcher.fetch(&descriptor, true).await.unwrap();

    assert_eq!(status, StageStatus::Completed);
    assert_eq!(std::fs::read_to_string(&descriptor.raw_path).unwrap(), "new");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_not_found_fails_without_retry() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", RAW_PATH)
        .with_status(404)
        .expect(1)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let descriptor = descriptor(&server.url(), dir.path());
    let fetcher = HttpArchiveFetcher::new(&config(&server.url(), 3), None).unwrap();

    let err = fetcher.fetch(&descriptor, false).await.unwrap_err();

    assert_eq!(err.id, descriptor.id);
    assert_eq!(err.cause, FetchFailure::NotFound);
    assert!(!descriptor.raw_path.exists());
    assert!(!partial_path(&descriptor.raw_path).exists());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unauthorized_fails_without_retry() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", RAW_PATH)
        .with_status(401)
        .expect(1)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let descriptor = descriptor(&server.url(), dir.path());
    let fetcher = HttpArchiveFetcher::new(&config(&server.url(), 3), None).unwrap();

    let err = fetcher.fetch(&descriptor, false).await.unwrap_err();
    assert_eq!(err.cause, FetchFailure::Authentication { status: 401 });
    mock.assert_async().await;
}

#[tokio::test]
async fn test_server_errors_are_retried() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", RAW_PATH)
        .with_status(503)
        .expect(3)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let descriptor = descriptor(&server.url(), dir.path());
    let fetcher = HttpArchiveFetcher::new(&config(&server.url(), 2), None).unwrap();

    let err = fetcher.fetch(&descriptor, false).await.unwrap_err();
    assert_eq!(err.cause, FetchFailure::Http { status: 503 });
    assert!(!descriptor.raw_path.exists());
    mock.assert_async().await;
}

/// Serves a response whose body stops short of its Content-Length
async fn truncating_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut request = [0u8; 4096];
            let _ = socket.read(&mut request).await;
            let _ = socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\nContent-Length: 1000\r\nConnection: close\r\n\r\nVendorID,fare",
                )
                .await;
            let _ = socket.shutdown().await;
        }
    });

    format!("http://{addr}")
}

#[tokio::test]
async fn test_interrupted_transfer_leaves_no_final_file() {
    let base_url = truncating_server().await;
    let dir = TempDir::new().unwrap();
    let descriptor = descriptor(&base_url, dir.path());
    let fetcher = HttpArchiveFetcher::new(&config(&base_url, 0), None).unwrap();

    let err = fetcher.fetch(&descriptor, false).await.unwrap_err();

    assert!(err.cause.is_retryable(), "{err}");
    assert!(!descriptor.raw_path.exists());
    assert!(!partial_path(&descriptor.raw_path).exists());
}

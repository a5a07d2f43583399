//! Integration tests for the per-link fetch.
//!
//! These tests verify restriction, collision handling and streaming against
//! mock HTTP servers.

use coursegrab_core::download::{
    FetchError, FetchOutcome, FilesystemError, HttpClient, StoreError, fetch_and_store,
};
use coursegrab_core::restrict::RestrictionFilter;
use std::time::Duration;

use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper to create a mock server with a file endpoint.
async fn setup_mock_file(path_str: &str, content: &[u8]) -> MockServer {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(path_str))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content.to_vec()))
        .mount(&mock_server)
        .await;

    mock_server
}

fn file_url(server: &MockServer, path: &str) -> Url {
    Url::parse(&format!("{}{path}", server.uri())).expect("mock URL is valid")
}

/// Serves one connection by hand: writes `head`, then each chunk with `gap`
/// between them, then closes the socket.
async fn serve_raw_once(
    head: &'static str,
    chunks: &'static [&'static [u8]],
    gap: Duration,
) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = [0u8; 4096];
        let _ = socket.read(&mut request).await;
        socket.write_all(head.as_bytes()).await.unwrap();
        for &chunk in chunks {
            tokio::time::sleep(gap).await;
            if socket.write_all(chunk).await.is_err() {
                return;
            }
            let _ = socket.flush().await;
        }
        let _ = socket.shutdown().await;
    });

    Url::parse(&format!("http://{addr}/_media/notes.pdf")).unwrap()
}

fn plenum() -> RestrictionFilter {
    RestrictionFilter::new(["plenum"]).expect("valid restriction")
}

#[tokio::test]
async fn test_fetch_writes_body_byte_for_byte() {
    let content: Vec<u8> = (0..=255u8).cycle().take(256 * 1024 + 17).collect();
    let mock_server = setup_mock_file("/_media/course/notes.pdf", &content).await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let client = HttpClient::new();
    let url = file_url(&mock_server, "/_media/course/notes.pdf");
    let outcome = fetch_and_store(&client, &url, temp_dir.path(), &plenum())
        .await
        .expect("download should succeed");

    let expected_path = temp_dir.path().join("notes.pdf");
    assert_eq!(
        outcome,
        FetchOutcome::Downloaded {
            path: expected_path.clone(),
            bytes: content.len() as u64,
        }
    );
    let written = std::fs::read(&expected_path).expect("should read file");
    assert_eq!(written.len(), content.len());
    assert_eq!(written, content, "downloaded content should match original");
}

#[tokio::test]
async fn test_restricted_file_is_skipped_without_request() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PDF".to_vec()))
        .expect(0)
        .mount(&mock_server)
        .await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let output_dir = temp_dir.path().join("downloads");

    let client = HttpClient::new();
    let url = file_url(&mock_server, "/_media/course/lf-plenum-2024.pdf");
    let outcome = fetch_and_store(&client, &url, &output_dir, &plenum())
        .await
        .expect("skip is not an error");

    assert_eq!(
        outcome,
        FetchOutcome::Skipped {
            filename: "lf-plenum-2024.pdf".to_string()
        }
    );
    assert!(!output_dir.exists(), "no directory should be created for a skip");
}

#[tokio::test]
async fn test_existing_file_gets_numeric_suffix() {
    let mock_server = setup_mock_file("/_media/notes.pdf", b"new content").await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    std::fs::write(temp_dir.path().join("notes.pdf"), b"old content").unwrap();

    let client = HttpClient::new();
    let url = file_url(&mock_server, "/_media/notes.pdf");
    let outcome = fetch_and_store(&client, &url, temp_dir.path(), &plenum())
        .await
        .expect("download should succeed");

    let path = match outcome {
        FetchOutcome::Downloaded { path, .. } => path,
        other => panic!("expected a download, got {other:?}"),
    };
    assert_eq!(path, temp_dir.path().join("notes_1.pdf"));
    assert_eq!(std::fs::read(&path).unwrap(), b"new content");
    assert_eq!(
        std::fs::read(temp_dir.path().join("notes.pdf")).unwrap(),
        b"old content",
        "existing file must not be overwritten"
    );
}

#[tokio::test]
async fn test_repeated_fetches_increment_suffix() {
    let mock_server = setup_mock_file("/_media/notes.pdf", b"content").await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let client = HttpClient::new();
    let url = file_url(&mock_server, "/_media/notes.pdf");
    let restrictions = RestrictionFilter::none();

    let mut paths = Vec::new();
    for _ in 0..3 {
        match fetch_and_store(&client, &url, temp_dir.path(), &restrictions).await {
            Ok(FetchOutcome::Downloaded { path, .. }) => paths.push(path),
            other => panic!("expected a download, got {other:?}"),
        }
    }

    assert_eq!(
        paths,
        [
            temp_dir.path().join("notes.pdf"),
            temp_dir.path().join("notes_1.pdf"),
            temp_dir.path().join("notes_2.pdf"),
        ]
    );
}

#[tokio::test]
async fn test_missing_output_dir_is_created() {
    let mock_server = setup_mock_file("/_media/ex1.pdf", b"exercise").await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let output_dir = temp_dir.path().join("nested").join("downloads");

    let client = HttpClient::new();
    let url = file_url(&mock_server, "/_media/ex1.pdf");
    let outcome = fetch_and_store(&client, &url, &output_dir, &plenum())
        .await
        .expect("download should succeed");

    assert!(matches!(outcome, FetchOutcome::Downloaded { .. }));
    assert_eq!(std::fs::read(output_dir.join("ex1.pdf")).unwrap(), b"exercise");
}

#[tokio::test]
async fn test_http_error_returns_fetch_error_and_writes_nothing() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/_media/missing.pdf"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let output_dir = temp_dir.path().join("downloads");

    let client = HttpClient::new();
    let url = file_url(&mock_server, "/_media/missing.pdf");
    let result = fetch_and_store(&client, &url, &output_dir, &plenum()).await;

    match result {
        Err(StoreError::Fetch(FetchError::HttpStatus { status, .. })) => assert_eq!(status, 404),
        other => panic!("expected HTTP 404 error, got {other:?}"),
    }
    assert!(!output_dir.exists(), "directory is only created after a successful response");
}

#[tokio::test]
async fn test_connection_refused_returns_network_error() {
    // Bind then drop to get a local port that is not listening.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let client = HttpClient::with_timeouts(2, 5);
    let url = Url::parse(&format!("http://127.0.0.1:{port}/_media/notes.pdf")).unwrap();
    let result = fetch_and_store(&client, &url, temp_dir.path(), &plenum()).await;

    assert!(
        matches!(
            result,
            Err(StoreError::Fetch(
                FetchError::Network { .. } | FetchError::Timeout { .. }
            ))
        ),
        "expected a network error, got {result:?}"
    );
}

#[tokio::test]
async fn test_output_dir_that_is_a_file_returns_filesystem_error() {
    let mock_server = setup_mock_file("/_media/notes.pdf", b"content").await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let blocker = temp_dir.path().join("downloads");
    std::fs::write(&blocker, b"not a directory").unwrap();

    let client = HttpClient::new();
    let url = file_url(&mock_server, "/_media/notes.pdf");
    let result = fetch_and_store(&client, &url, &blocker, &plenum()).await;

    assert!(
        matches!(
            result,
            Err(StoreError::Filesystem(FilesystemError::CreateDir { .. }))
        ),
        "expected a directory error, got {result:?}"
    );
}

#[tokio::test]
async fn test_trailing_slash_url_uses_fallback_name() {
    let mock_server = setup_mock_file("/_media/course/", b"index").await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let client = HttpClient::new();
    let url = file_url(&mock_server, "/_media/course/");
    let outcome = fetch_and_store(&client, &url, temp_dir.path(), &plenum())
        .await
        .expect("download should succeed");

    assert_eq!(
        outcome,
        FetchOutcome::Downloaded {
            path: temp_dir.path().join("downloaded_file"),
            bytes: 5,
        }
    );
}

#[tokio::test]
async fn test_slow_steady_body_outlasts_read_timeout() {
    let url = serve_raw_once(
        "HTTP/1.1 200 OK\r\nContent-Type: application/pdf\r\nContent-Length: 8\r\n\r\n",
        &[b"%", b"P", b"D", b"F", b"-", b"1", b".", b"7"],
        Duration::from_millis(400),
    )
    .await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    // Total transfer takes ~3.2s; no single read waits longer than 1s.
    let client = HttpClient::with_timeouts(1, 1);
    let outcome = fetch_and_store(&client, &url, temp_dir.path(), &plenum())
        .await
        .expect("a body that keeps arriving must not time out");

    let expected_path = temp_dir.path().join("notes.pdf");
    assert_eq!(
        outcome,
        FetchOutcome::Downloaded {
            path: expected_path.clone(),
            bytes: 8,
        }
    );
    assert_eq!(std::fs::read(&expected_path).unwrap(), b"%PDF-1.7");
}

#[tokio::test]
async fn test_stalled_body_times_out() {
    let url = serve_raw_once(
        "HTTP/1.1 200 OK\r\nContent-Type: application/pdf\r\nContent-Length: 8\r\n\r\n",
        &[b"%PDF", b"-1.7"],
        Duration::from_secs(3),
    )
    .await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let client = HttpClient::with_timeouts(1, 1);
    let result = fetch_and_store(&client, &url, temp_dir.path(), &plenum()).await;

    assert!(
        matches!(result, Err(StoreError::Fetch(FetchError::Timeout { .. }))),
        "expected a timeout, got {result:?}"
    );
    assert!(!temp_dir.path().join("notes.pdf").exists());
}

#[tokio::test]
async fn test_truncated_body_removes_partial_file() {
    let url = serve_raw_once(
        "HTTP/1.1 200 OK\r\nContent-Type: application/pdf\r\nContent-Length: 100\r\n\r\n",
        &[b"%PDF-1.7\n%"],
        Duration::ZERO,
    )
    .await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let output_dir = temp_dir.path().join("downloads");

    let client = HttpClient::new();
    let result = fetch_and_store(&client, &url, &output_dir, &plenum()).await;

    assert!(
        matches!(result, Err(StoreError::Fetch(_))),
        "expected a fetch error, got {result:?}"
    );
    assert!(!output_dir.join("notes.pdf").exists());
    assert!(!output_dir.join("notes_1.pdf").exists());
    if output_dir.exists() {
        let leftovers = std::fs::read_dir(&output_dir).unwrap().count();
        assert_eq!(leftovers, 0, "partial file should be removed");
    }
}

#[tokio::test]
async fn test_restriction_matches_percent_decoded_filename() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PDF".to_vec()))
        .expect(0)
        .mount(&mock_server)
        .await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let client = HttpClient::new();
    let url = file_url(&mock_server, "/_media/course/%6Fving_3.pdf");
    let oving = RestrictionFilter::new(["oving"]).expect("valid restriction");
    let outcome = fetch_and_store(&client, &url, temp_dir.path(), &oving)
        .await
        .expect("skip is not an error");

    assert_eq!(
        outcome,
        FetchOutcome::Skipped {
            filename: "oving_3.pdf".to_string(),
        }
    );
}

#[tokio::test]
async fn test_percent_encoded_space_is_decoded_on_disk() {
    let mock_server = setup_mock_file("/_media/course/lecture%201.pdf", b"lecture").await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let client = HttpClient::new();
    let url = file_url(&mock_server, "/_media/course/lecture%201.pdf");
    let outcome = fetch_and_store(&client, &url, temp_dir.path(), &plenum())
        .await
        .expect("download should succeed");

    assert_eq!(
        outcome,
        FetchOutcome::Downloaded {
            path: temp_dir.path().join("lecture 1.pdf"),
            bytes: 7,
        }
    );
}

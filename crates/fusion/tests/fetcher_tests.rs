//! Integration tests for the HTTP grid source against a local server.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use fusion::{FetchConfig, GridFetcher, GridSource, HttpGridSource};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use viewer_common::ViewerError;

/// Serve `response` to every connection, counting requests.
async fn serve(response: &'static str) -> (SocketAddr, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));

    let counter = hits.clone();
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::spawn(async move {
                // Read until the end of the request headers.
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (addr, hits)
}

fn source_for(addr: SocketAddr) -> HttpGridSource {
    HttpGridSource::new(FetchConfig {
        url_template: format!("http://{}/files/{{file_id}}", addr),
        request_timeout: Duration::from_secs(10),
        connect_timeout: Duration::from_secs(5),
        ..Default::default()
    })
    .unwrap()
}

const UNAVAILABLE: &str =
    "HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";

const HTML_PAGE: &str = "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 27\r\nConnection: close\r\n\r\n<html>quota exceeded</html>";

#[tokio::test]
async fn test_error_status_is_fetch_error() {
    let (addr, hits) = serve(UNAVAILABLE).await;
    let source = source_for(addr);

    let err = source.fetch("1AbC").await.unwrap_err();

    assert!(err.is_recoverable());
    match err {
        ViewerError::Fetch { file_id, message } => {
            assert_eq!(file_id, "1AbC");
            assert!(message.contains("503"), "message was: {}", message);
        }
        other => panic!("expected Fetch error, got {:?}", other),
    }
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_non_dataset_body_is_fetch_error() {
    let (addr, _) = serve(HTML_PAGE).await;
    let source = source_for(addr);

    let err = source.fetch("2DeF").await.unwrap_err();

    match err {
        ViewerError::Fetch { file_id, message } => {
            assert_eq!(file_id, "2DeF");
            assert!(message.contains("Not a valid dataset"), "message was: {}", message);
        }
        other => panic!("expected Fetch error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_failed_fetch_is_not_cached() {
    let (addr, hits) = serve(UNAVAILABLE).await;
    let fetcher = GridFetcher::new(Arc::new(source_for(addr)));

    assert!(fetcher.fetch("1AbC").await.is_err());
    assert!(fetcher.fetch("1AbC").await.is_err());

    assert_eq!(hits.load(Ordering::SeqCst), 2);
    assert!(!fetcher.cache().contains("1AbC"));
}

#[tokio::test]
async fn test_unreachable_host_is_fetch_error() {
    // Bind then drop to get a port nothing listens on.
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let source = source_for(addr);

    let err = source.fetch("1AbC").await.unwrap_err();

    assert!(matches!(err, ViewerError::Fetch { .. }));
}

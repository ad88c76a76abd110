//! Reachability probe against local listeners

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use storefront_e2e::preflight::{wait_for_storefront, PreflightConfig};
use storefront_e2e::E2eError;

fn quick() -> PreflightConfig {
    PreflightConfig {
        timeout: Duration::from_millis(600),
        request_timeout: Duration::from_millis(200),
        interval: Duration::from_millis(50),
    }
}

/// Answer every connection with `status_line`
async fn serve(status_line: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
                status_line
            );
            let _ = stream.write_all(response.as_bytes()).await;
        }
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_reachable_storefront() {
    let url = serve("200 OK").await;
    wait_for_storefront(&url, &quick()).await.unwrap();
}

#[tokio::test]
async fn test_forbidden_still_counts_as_reachable() {
    let url = serve("403 Forbidden").await;
    wait_for_storefront(&url, &quick()).await.unwrap();
}

#[tokio::test]
async fn test_server_errors_exhaust_the_probe() {
    let url = serve("503 Service Unavailable").await;

    let err = wait_for_storefront(&url, &quick()).await.unwrap_err();

    match err {
        E2eError::Preflight { url: probed, attempts } => {
            assert_eq!(probed, url);
            assert!(attempts > 1);
        }
        other => panic!("expected a preflight error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_storefront() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };

    let err = wait_for_storefront(&format!("http://{}", addr), &quick())
        .await
        .unwrap_err();

    assert!(matches!(err, E2eError::Preflight { .. }));
    assert!(err.is_environment());
}

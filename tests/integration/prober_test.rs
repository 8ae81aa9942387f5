use livegrab::core::{HttpProber, Liveness, LivenessProbe};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serve every connection with the given status line and an empty body
async fn serve_status(status_line: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 2048];
                let _ = socket.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 {}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
                    status_line
                );
                let _ = socket.write_all(response.as_bytes()).await;
            });
        }
    });

    format!("http://{}/live/1Y.flv", addr)
}

/// Accept connections and never answer
async fn serve_silence() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    format!("http://{}/live/1Y.flv", addr)
}

fn prober(timeout_ms: u64) -> HttpProber {
    HttpProber::new(Duration::from_millis(timeout_ms)).unwrap()
}

#[tokio::test]
async fn test_ok_status_is_live() {
    let url = serve_status("200 OK").await;
    assert_eq!(prober(2000).probe(&url).await, Liveness::Live);
}

#[tokio::test]
async fn test_not_found_is_offline() {
    let url = serve_status("404 Not Found").await;
    assert_eq!(prober(2000).probe(&url).await, Liveness::Offline);
}

#[tokio::test]
async fn test_other_status_is_not_live() {
    let url = serve_status("503 Service Unavailable").await;
    let liveness = prober(2000).probe(&url).await;
    assert_eq!(liveness, Liveness::Unexpected(503));
    assert!(!liveness.is_live());
}

#[tokio::test]
async fn test_hanging_server_times_out() {
    let url = serve_silence().await;

    let started = std::time::Instant::now();
    let liveness = prober(200).probe(&url).await;

    assert!(matches!(liveness, Liveness::Unreachable(_)));
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn test_refused_connection_is_unreachable() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let liveness = prober(1000).probe(&format!("http://{}/live/1.flv", addr)).await;
    assert!(matches!(liveness, Liveness::Unreachable(_)));
}

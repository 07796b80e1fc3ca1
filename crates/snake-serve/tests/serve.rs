//! End-to-end tests over a real socket

use snake_serve::{MimeProfile, Server, ServerConfig};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::oneshot;

struct Running {
    addr: SocketAddr,
    stop: oneshot::Sender<()>,
    task: tokio::task::JoinHandle<snake_serve::Result<()>>,
}

impl Running {
    async fn stop(self) {
        let _ = self.stop.send(());
        self.task.await.unwrap().unwrap();
    }
}

fn start(root: &Path, mime: MimeProfile) -> Running {
    let config = ServerConfig {
        hostname: "127.0.0.1".to_string(),
        port: 0,
        root: root.to_path_buf(),
        mime,
        ..Default::default()
    };

    let server = Server::bind(&config).unwrap();
    let addr = server.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();
    let task = tokio::spawn(server.run_until(async {
        let _ = stopped.await;
    }));

    Running { addr, stop, task }
}

/// Send one request with `Connection: close`, return (status, headers, body)
async fn request(addr: SocketAddr, method: &str, path: &str) -> (u16, String, Vec<u8>) {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let head = format!("{method} {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
    stream.write_all(head.as_bytes()).await.unwrap();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();

    let split = raw
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("response head");
    let head = String::from_utf8(raw[..split].to_vec()).unwrap();
    let body = raw[split + 4..].to_vec();
    let status = head
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap();

    (status, head.to_lowercase(), body)
}

fn site() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<canvas id=\"game-canvas\"></canvas>").unwrap();
    std::fs::create_dir(dir.path().join("pkg")).unwrap();
    std::fs::write(dir.path().join("pkg/snake_wasm_bg.wasm"), [0u8, 97, 115, 109, 1, 0, 0, 0]).unwrap();
    dir
}

#[tokio::test]
async fn serves_exact_bytes() {
    let dir = site();
    let server = start(dir.path(), MimeProfile::Extended);

    let (status, head, body) = request(server.addr, "GET", "/pkg/snake_wasm_bg.wasm").await;
    assert_eq!(status, 200);
    assert!(head.contains("content-type: application/wasm"));
    assert_eq!(body, vec![0u8, 97, 115, 109, 1, 0, 0, 0]);

    server.stop().await;
}

#[tokio::test]
async fn root_and_alias_serve_index() {
    let dir = site();
    let server = start(dir.path(), MimeProfile::Basic);

    for path in ["/", "/game"] {
        let (status, head, body) = request(server.addr, "GET", path).await;
        assert_eq!(status, 200, "{path}");
        assert!(head.contains("content-type: text/html"));
        assert_eq!(body, b"<canvas id=\"game-canvas\"></canvas>");
    }

    server.stop().await;
}

#[tokio::test]
async fn missing_file_is_404() {
    let dir = site();
    let server = start(dir.path(), MimeProfile::Full);

    let (status, _, body) = request(server.addr, "GET", "/js/missing.js?v=1").await;
    assert_eq!(status, 404);
    assert_eq!(body, b"404 Not Found");

    server.stop().await;
}

#[tokio::test]
async fn head_and_unsupported_methods() {
    let dir = site();
    let server = start(dir.path(), MimeProfile::Full);

    let (status, head, body) = request(server.addr, "HEAD", "/index.html").await;
    assert_eq!(status, 200);
    assert!(head.contains("content-type: text/html"));
    assert!(body.is_empty());

    let (status, _, _) = request(server.addr, "DELETE", "/index.html").await;
    assert_eq!(status, 405);

    server.stop().await;
}

/// Read one response off a kept-alive stream, return (head, body)
async fn read_response(stream: &mut TcpStream) -> (String, Vec<u8>) {
    let mut raw = Vec::new();
    let mut chunk = [0u8; 1024];

    loop {
        if let Some(split) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8(raw[..split].to_vec()).unwrap().to_lowercase();
            let length: usize = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .map(|v| v.trim().parse().unwrap())
                .unwrap_or(0);
            if raw.len() >= split + 4 + length {
                let body = raw[split + 4..split + 4 + length].to_vec();
                return (head, body);
            }
        }

        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed mid-response");
        raw.extend_from_slice(&chunk[..n]);
    }
}

#[tokio::test]
async fn shutdown_closes_idle_keep_alive() {
    let dir = site();
    let server = start(dir.path(), MimeProfile::Full);

    let mut stream = TcpStream::connect(server.addr).await.unwrap();
    stream
        .write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n")
        .await
        .unwrap();
    let (head, body) = read_response(&mut stream).await;
    assert!(head.starts_with("http/1.1 200"));
    assert_eq!(body, b"<canvas id=\"game-canvas\"></canvas>");

    // The connection is still open; shutdown must close it rather than
    // wait out the drain timeout
    tokio::time::timeout(Duration::from_secs(2), server.stop())
        .await
        .expect("shutdown finished before the drain timeout");

    let mut rest = Vec::new();
    let n = tokio::time::timeout(Duration::from_secs(1), stream.read_to_end(&mut rest))
        .await
        .expect("server closed the connection")
        .unwrap_or(0);
    assert_eq!(n, 0);
}

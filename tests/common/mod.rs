//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use fitflow_gateway::config::validation::validate_config;
use fitflow_gateway::{AppConfig, HttpServer, Shutdown};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// A running mock of the chat-completions API.
pub struct MockUpstream {
    pub addr: SocketAddr,
    calls: Arc<AtomicU32>,
    requests: Arc<Mutex<Vec<String>>>,
}

#[allow(dead_code)]
impl MockUpstream {
    /// Number of requests received so far.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Raw text (head and body) of every request received.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// Completion body whose first choice carries `content`.
#[allow(dead_code)]
pub fn completion(content: &str) -> String {
    serde_json::json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [
            { "index": 0, "message": { "role": "assistant", "content": content } }
        ]
    })
    .to_string()
}

/// Start a programmable upstream. `f` receives the 1-based call number and
/// returns the status and body to answer with.
pub async fn start_programmable_upstream<F>(f: F) -> MockUpstream
where
    F: Fn(u32) -> (u16, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let calls = Arc::new(AtomicU32::new(0));
    let requests = Arc::new(Mutex::new(Vec::new()));
    let f = Arc::new(f);

    let (task_calls, task_requests) = (calls.clone(), requests.clone());
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    let calls = task_calls.clone();
                    let requests = task_requests.clone();
                    tokio::spawn(async move {
                        let raw = read_request(&mut socket).await;
                        requests.lock().unwrap().push(raw);
                        let n = calls.fetch_add(1, Ordering::SeqCst) + 1;

                        let (status, body) = f(n);
                        let status = reqwest::StatusCode::from_u16(status).unwrap();
                        let status_text = format!(
                            "{} {}",
                            status.as_u16(),
                            status.canonical_reason().unwrap_or("Unknown")
                        );

                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    MockUpstream { addr, calls, requests }
}

/// Read one HTTP/1.1 request (head plus `Content-Length` body).
async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 8192];

    let head_end = loop {
        if let Some(pos) = find(&buf, b"\r\n\r\n") {
            break pos + 4;
        }
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return String::from_utf8_lossy(&buf).into_owned(),
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_ascii_lowercase();
    let content_length = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < head_end + content_length {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }

    String::from_utf8_lossy(&buf).into_owned()
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Config pointing at `upstream` with short backoff delays.
pub fn test_config(upstream: SocketAddr) -> AppConfig {
    let mut config = AppConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.upstream.base_url = format!("http://{}", upstream);
    config.upstream.api_key = "test-key".into();
    config.retries.max_attempts = 3;
    config.retries.base_delay_ms = 10;
    config.retries.max_delay_ms = 40;
    config.timeouts.upstream_secs = 5;
    config.timeouts.request_secs = 20;
    config
}

/// Start the gateway on an ephemeral port.
pub async fn start_gateway(config: AppConfig) -> (SocketAddr, Shutdown) {
    validate_config(&config).unwrap();
    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, shutdown.clone()).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let _ = server.run(listener).await;
    });

    (addr, shutdown)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

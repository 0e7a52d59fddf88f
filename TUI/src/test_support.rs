//! Test doubles: an in-process fake service and one-shot HTTP servers.

use std::io::ErrorKind;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::backend::{GenerationRequest, GenerationService, HealthResponse};
use crate::error::GenerationError;

/// In-process service returning a canned answer. A gated service holds
/// every request until the gate is notified.
pub struct FakeService {
    response: Result<Vec<u8>, GenerationError>,
    requests: Mutex<Vec<GenerationRequest>>,
    gate: Option<Arc<Notify>>,
}

impl FakeService {
    pub fn new(response: Result<Vec<u8>, GenerationError>) -> Self {
        Self {
            response,
            requests: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    pub fn gated(response: Result<Vec<u8>, GenerationError>, gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new(response)
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationService for FakeService {
    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<u8>, GenerationError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.response.clone()
    }

    async fn health(&self) -> Result<HealthResponse, GenerationError> {
        Ok(HealthResponse {
            status: "ok".into(),
            time: None,
        })
    }
}

pub struct MockResponse {
    status: &'static str,
    content_type: &'static str,
    body: Vec<u8>,
    declared_len: Option<usize>,
}

impl MockResponse {
    pub fn new(status: &'static str, content_type: &'static str, body: Vec<u8>) -> Self {
        Self {
            status,
            content_type,
            body,
            declared_len: None,
        }
    }

    pub fn json(status: &'static str, body: &str) -> Self {
        Self::new(status, "application/json", body.as_bytes().to_vec())
    }

    /// Advertise `declared_len` bytes but close after sending `body`.
    pub fn truncated(status: &'static str, body: &str, declared_len: usize) -> Self {
        Self {
            declared_len: Some(declared_len),
            ..Self::json(status, body)
        }
    }
}

pub struct MockServer {
    pub base_url: String,
    handle: JoinHandle<String>,
}

impl MockServer {
    /// The raw request the server received (head and body).
    pub async fn request(self) -> String {
        self.handle.await.unwrap_or_default()
    }
}

async fn bind_local() -> Option<TcpListener> {
    match TcpListener::bind("127.0.0.1:0").await {
        Ok(listener) => Some(listener),
        Err(err) if err.kind() == ErrorKind::PermissionDenied => {
            eprintln!("skipping test: sandbox does not permit local TCP listeners");
            None
        }
        Err(err) => panic!("failed to bind: {err}"),
    }
}

/// Serve `response` to the first connection, then close.
pub async fn spawn_single_response(response: MockResponse) -> Option<MockServer> {
    let listener = bind_local().await?;
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let raw = read_request(&mut socket).await;

        let head = format!(
            "HTTP/1.1 {}\r\nContent-Length: {}\r\nContent-Type: {}\r\nConnection: close\r\n\r\n",
            response.status,
            response.declared_len.unwrap_or(response.body.len()),
            response.content_type
        );
        let _ = socket.write_all(head.as_bytes()).await;
        let _ = socket.write_all(&response.body).await;
        let _ = socket.flush().await;
        let _ = socket.shutdown().await;

        raw
    });

    Some(MockServer {
        base_url: format!("http://{addr}"),
        handle,
    })
}

/// A base URL on which nothing is listening.
pub async fn unused_local_url() -> Option<String> {
    let listener = bind_local().await?;
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Some(format!("http://{addr}"))
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut raw = Vec::new();
    let mut buf = [0u8; 4096];

    loop {
        let n = match socket.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        raw.extend_from_slice(&buf[..n]);

        if let Some(head_end) = find_head_end(&raw) {
            let head = String::from_utf8_lossy(&raw[..head_end]).to_ascii_lowercase();
            let content_length = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if raw.len() >= head_end + 4 + content_length {
                break;
            }
        }
    }

    String::from_utf8_lossy(&raw).into_owned()
}

fn find_head_end(raw: &[u8]) -> Option<usize> {
    raw.windows(4).position(|w| w == b"\r\n\r\n")
}

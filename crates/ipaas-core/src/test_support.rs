//! Test helpers: loopback HTTP server, zip builders and in-memory fakes for the ports.

use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use zip::write::SimpleFileOptions;

use crate::domain::{
    ArtifactDescriptor, ArtifactError, ArtifactKey, CatalogEntry, IndexFetchError,
};
use crate::ports::{IndexClient, MetadataExtractor};

/// Serves canned responses keyed by request path (query string ignored).
/// Unknown paths get a 404. Every request line is recorded.
pub(crate) struct TestServer {
    pub url: String,
    requests: Arc<Mutex<Vec<String>>>,
    task: JoinHandle<()>,
}

impl TestServer {
    pub async fn start(routes: Vec<(&str, u16, Vec<u8>)>) -> Self {
        let routes: HashMap<String, (u16, Vec<u8>)> = routes
            .into_iter()
            .map(|(path, status, body)| (path.to_string(), (status, body)))
            .collect();
        let routes = Arc::new(routes);
        let requests = Arc::new(Mutex::new(Vec::new()));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let task = tokio::spawn({
            let requests = requests.clone();
            async move {
                loop {
                    let Ok((mut socket, _)) = listener.accept().await else {
                        break;
                    };
                    let routes = routes.clone();
                    let requests = requests.clone();
                    tokio::spawn(async move {
                        let request_line = read_request_line(&mut socket).await;
                        requests.lock().push(request_line.clone());

                        let path = request_line
                            .split_whitespace()
                            .nth(1)
                            .unwrap_or("/")
                            .split('?')
                            .next()
                            .unwrap_or("/")
                            .to_string();
                        let (status, body) = routes
                            .get(&path)
                            .cloned()
                            .unwrap_or((404, b"not found".to_vec()));

                        let head = format!(
                            "HTTP/1.1 {status} X\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                            body.len()
                        );
                        let _ = socket.write_all(head.as_bytes()).await;
                        let _ = socket.write_all(&body).await;
                        let _ = socket.shutdown().await;
                    });
                }
            }
        });

        Self {
            url: format!("http://{addr}"),
            requests,
            task,
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn read_request_line(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let Ok(n) = socket.read(&mut chunk).await else {
            break;
        };
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if buf.windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
    }
    String::from_utf8_lossy(&buf)
        .lines()
        .next()
        .unwrap_or_default()
        .to_string()
}

/// One-shot server; returns the base url and a handle resolving to the
/// first request line.
pub(crate) async fn serve_once(status: u16, body: Vec<u8>) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request_line = read_request_line(&mut socket).await;
        let head = format!(
            "HTTP/1.1 {status} X\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );
        socket.write_all(head.as_bytes()).await.unwrap();
        socket.write_all(&body).await.unwrap();
        let _ = socket.shutdown().await;
        request_line
    });
    (format!("http://{addr}"), handle)
}

/// Zip archive holding the given `(path, contents)` entries.
pub(crate) fn zip_with(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (path, contents) in entries {
        writer
            .start_file(*path, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(contents.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

pub(crate) fn connector_json(
    name: &str,
    artifact_id: &str,
    description: &str,
    labels: &[&str],
) -> String {
    serde_json::json!({
        "name": name,
        "description": description,
        "groupId": "org.acme",
        "artifactId": artifact_id,
        "version": "1.0",
        "labels": labels,
    })
    .to_string()
}

/// Index client answering from a script, one response per call.
/// `None` in the script fails that call; an exhausted script returns nothing.
pub(crate) struct FakeIndex {
    script: Mutex<std::collections::VecDeque<Option<Vec<ArtifactDescriptor>>>>,
    calls: AtomicUsize,
    /// Simulated network latency per call.
    latency: Duration,
    started: Mutex<Vec<tokio::time::Instant>>,
}

impl FakeIndex {
    pub fn new(script: Vec<Option<Vec<ArtifactDescriptor>>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
            latency: Duration::ZERO,
            started: Mutex::new(Vec::new()),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn started(&self) -> Vec<tokio::time::Instant> {
        self.started.lock().clone()
    }
}

#[async_trait]
impl IndexClient for FakeIndex {
    async fn fetch_candidates(
        &self,
        index_url: &str,
        _classifier: &str,
    ) -> Result<Vec<ArtifactDescriptor>, IndexFetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.started.lock().push(tokio::time::Instant::now());
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let next = self.script.lock().pop_front();
        match next {
            Some(Some(candidates)) => Ok(candidates),
            Some(None) => Err(IndexFetchError::Status {
                url: index_url.to_string(),
                status: 500,
            }),
            None => Ok(Vec::new()),
        }
    }
}

/// Extractor serving descriptors from memory, keyed by download link.
/// Unknown links fail; links in `hang` never complete.
#[derive(Default)]
pub(crate) struct FakeExtractor {
    entries: HashMap<String, CatalogEntry>,
    hang: Vec<String>,
    calls: Mutex<Vec<String>>,
}

impl FakeExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, link: &str, entry: CatalogEntry) -> Self {
        self.entries.insert(link.to_string(), entry);
        self
    }

    pub fn with_hang(mut self, link: &str) -> Self {
        self.hang.push(link.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl MetadataExtractor for FakeExtractor {
    async fn try_extract(
        &self,
        artifact: &ArtifactDescriptor,
    ) -> Result<CatalogEntry, ArtifactError> {
        let link = artifact.download_link().to_string();
        self.calls.lock().push(link.clone());
        if self.hang.contains(&link) {
            std::future::pending::<()>().await;
        }
        self.entries
            .get(&link)
            .cloned()
            .ok_or(ArtifactError::Status { link, status: 404 })
    }
}

pub(crate) fn descriptor(artifact_id: &str, link: &str) -> ArtifactDescriptor {
    ArtifactDescriptor::new(ArtifactKey::new("org.acme", artifact_id, "1.0"), link)
}

pub(crate) fn entry(
    name: &str,
    artifact_id: &str,
    description: &str,
    labels: &[&str],
) -> CatalogEntry {
    CatalogEntry::from_json(&connector_json(name, artifact_id, description, labels)).unwrap()
}

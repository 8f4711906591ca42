//! A throwaway HTTP file server for download tests.
//!
//! Serves files from a directory on `127.0.0.1` with a random port and counts
//! every request it receives, so tests can assert that a download was (or
//! was not) attempted. The server runs on its own thread with a
//! current-thread tokio runtime and shuts down when dropped.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use axum::extract::{Path as UrlPath, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::sync::oneshot;

#[derive(Default)]
struct ServerState {
    root: PathBuf,
    hits: AtomicUsize,
    requested: Mutex<Vec<String>>,
}

/// Local HTTP server exposing the files under a directory.
pub struct FileServer {
    addr: SocketAddr,
    state: Arc<ServerState>,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl FileServer {
    /// Start serving `root`. `GET /<name>` returns `root/<name>` or 404.
    pub fn start(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        listener.set_nonblocking(true)?;
        let addr = listener.local_addr()?;

        let state = Arc::new(ServerState {
            root: root.as_ref().to_path_buf(),
            ..Default::default()
        });
        let (tx, rx) = oneshot::channel::<()>();

        let app = Router::new()
            .route("/*path", get(serve_file))
            .with_state(state.clone());

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let handle = std::thread::spawn(move || {
            runtime.block_on(async move {
                let listener = match tokio::net::TcpListener::from_std(listener) {
                    Ok(l) => l,
                    Err(e) => {
                        eprintln!("test file server failed to start: {e}");
                        return;
                    }
                };
                let _ = axum::serve(listener, app)
                    .with_graceful_shutdown(async {
                        let _ = rx.await;
                    })
                    .await;
            });
        });

        Ok(Self {
            addr,
            state,
            shutdown: Some(tx),
            handle: Some(handle),
        })
    }

    /// Base URL without a trailing slash, e.g. `http://127.0.0.1:40123`.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Full URL for a path under the served directory.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url(), path.trim_start_matches('/'))
    }

    /// Number of requests received so far, including ones answered with 404.
    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    /// Paths requested so far, in arrival order.
    pub fn requested(&self) -> Vec<String> {
        self.state
            .requested
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

impl Drop for FileServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

async fn serve_file(State(state): State<Arc<ServerState>>, UrlPath(path): UrlPath<String>) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    if let Ok(mut requested) = state.requested.lock() {
        requested.push(path.clone());
    }

    if path.split('/').any(|seg| seg == "..") {
        return StatusCode::BAD_REQUEST.into_response();
    }

    match tokio::fs::read(state.root.join(&path)).await {
        Ok(bytes) => (StatusCode::OK, bytes).into_response(),
        Err(_) => StatusCode::NOT_FOUND.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_building() {
        let dir = tempfile::tempdir().unwrap();
        let server = FileServer::start(dir.path()).unwrap();
        assert!(server.base_url().starts_with("http://127.0.0.1:"));
        assert!(server.url("/a/b.nc").ends_with("/a/b.nc"));
        assert_eq!(server.hits(), 0);
    }
}

use std::sync::Arc;

use axum::Router;
use summerjob_db::SqliteDatabase;
use summerjob_store::{LocalStore, StoreConfig};
use tempfile::TempDir;
use tokio::net::TcpListener;

use crate::{app_state, build_router};

/// Build a test router with in-memory SQLite and a temporary upload root.
/// The returned directory must outlive the router.
pub async fn test_router() -> (Router, TempDir) {
    let db = Arc::new(SqliteDatabase::open_in_memory().unwrap());
    let root = tempfile::tempdir().unwrap();
    let store = Arc::new(LocalStore::new(&StoreConfig {
        upload_dir: None,
        root: Some(root.path().to_path_buf()),
    }));
    (build_router(app_state(db, store)), root)
}

/// A running test server with base_url and background task handle.
pub struct TestServer {
    pub base_url: String,
    /// Upload root of the server.
    pub upload_root: TempDir,
    _handle: tokio::task::JoinHandle<()>,
}

/// Spawn an axum test server on a random port. Returns the TestServer
/// with the `base_url` (e.g. "http://127.0.0.1:12345").
pub async fn spawn_test_server() -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{addr}");
    let (app, upload_root) = test_router().await;
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    TestServer {
        base_url,
        upload_root,
        _handle: handle,
    }
}

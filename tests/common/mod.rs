#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tokio::task::JoinHandle;

use fintrack_api::config::AppConfig;
use fintrack_api::database::{MemoryStore, TransactionStore};
use fintrack_api::server;

/// An HTTP server running inside the test's runtime; stopped on drop
pub struct TestServer {
    pub base_url: String,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Serve any router on an ephemeral local port
pub async fn serve(router: Router) -> Result<TestServer> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .context("failed to bind test listener")?;
    let addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    Ok(TestServer {
        base_url: format!("http://{}", addr),
        handle,
    })
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.server.route_prefix = "/transactions".to_string();
    config.api.enable_request_logging = false;
    config
}

pub async fn spawn_app(store: Arc<dyn TransactionStore>) -> Result<TestServer> {
    serve(server::app(store, &test_config())).await
}

/// The API backed by a fresh in-memory store
pub async fn spawn_memory_app() -> Result<TestServer> {
    spawn_app(Arc::new(MemoryStore::new())).await
}

//! Common test utilities for integration tests.

pub mod fixtures;

use pricing::compute::AppState;
use pricing::shutdown::ShutdownCoordinator;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

// Re-export common types
pub use fixtures::*;

/// Default body limit used by test servers.
pub const TEST_BODY_LIMIT: usize = 16 * 1024;

/// A server running on an ephemeral local port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    pub coordinator: ShutdownCoordinator,
    handle: JoinHandle<pricing::Result<()>>,
}

impl TestServer {
    /// Start serving `state` with the default body limit.
    pub async fn start(state: AppState) -> Self {
        Self::start_with_limit(state, TEST_BODY_LIMIT).await
    }

    /// Start serving `state` with a custom body limit.
    pub async fn start_with_limit(state: AppState, max_body_bytes: usize) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().unwrap();
        let coordinator = ShutdownCoordinator::with_timeout(Duration::from_secs(2));

        let handle = tokio::spawn(pricing::serve(
            listener,
            state,
            max_body_bytes,
            coordinator.clone(),
        ));

        Self {
            addr,
            client: reqwest::Client::new(),
            coordinator,
            handle,
        }
    }

    /// Absolute URL for a path on this server.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// POST a raw body to `/predict`.
    pub async fn predict_raw(&self, body: impl Into<reqwest::Body>) -> reqwest::Response {
        self.client
            .post(self.url("/predict"))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .expect("request should complete")
    }

    /// POST a JSON value to `/predict`, returning status and body.
    pub async fn predict(&self, body: serde_json::Value) -> (u16, serde_json::Value) {
        let response = self.predict_raw(body.to_string()).await;
        let status = response.status().as_u16();
        let json = response.json().await.expect("response body should be JSON");
        (status, json)
    }

    /// GET a path, returning status and JSON body.
    pub async fn get(&self, path: &str) -> (u16, serde_json::Value) {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("request should complete");
        let status = response.status().as_u16();
        let json = response.json().await.expect("response body should be JSON");
        (status, json)
    }

    /// Trigger shutdown and wait for the server task.
    pub async fn stop(self) -> pricing::Result<()> {
        self.coordinator.shutdown();
        tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("server should stop")
            .expect("server task should not panic")
    }
}

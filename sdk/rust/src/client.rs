use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Status code and text body of a demo endpoint response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub request_id: Option<String>,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub version: String,
    pub status: String,
    pub policies: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitBreakerStatus {
    pub name: String,
    pub state: String, // "CLOSED", "OPEN" or "HALF_OPEN"
    pub failure_rate: Option<f32>,
    pub buffered_calls: usize,
    pub failed_calls: usize,
    pub not_permitted_calls: u64,
}

pub struct DemoClient {
    client: Client,
    base_url: String,
}

impl DemoClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(
            Client::builder()
                .pool_max_idle_per_host(0)
                .no_proxy()
                .build()
                .unwrap_or_default(),
            base_url,
        )
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn test(&self) -> Result<Reply, reqwest::Error> {
        self.get_text("/api/test").await
    }

    pub async fn call(&self) -> Result<Reply, reqwest::Error> {
        self.get_text("/api/call").await
    }

    pub async fn call_sync(&self) -> Result<Reply, reqwest::Error> {
        self.get_text("/api/callSync").await
    }

    pub async fn call_async(&self) -> Result<Reply, reqwest::Error> {
        self.get_text("/api/callAsync").await
    }

    pub async fn callback(&self) -> Result<Reply, reqwest::Error> {
        self.get_text("/api/callback").await
    }

    pub async fn health(&self) -> Result<ServiceStatus, reqwest::Error> {
        self.client
            .get(format!("{}/health", self.base_url))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    pub async fn circuit_breakers(&self) -> Result<Vec<CircuitBreakerStatus>, reqwest::Error> {
        self.client
            .get(format!("{}/admin/circuit-breakers", self.base_url))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    async fn get_text(&self, path: &str) -> Result<Reply, reqwest::Error> {
        let resp = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await?;

        let status = resp.status().as_u16();
        let request_id = resp
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = resp.text().await?;

        Ok(Reply {
            status,
            request_id,
            body,
        })
    }
}

//! GCP Client
//!
//! Main client for interacting with GCP APIs, combining authentication,
//! HTTP functionality and endpoint configuration.

use super::auth::GcpCredentials;
use super::http::GcpHttpClient;
use anyhow::{Context, Result};
use serde_json::Value;
use std::time::{Duration, Instant};

/// Default Compute Engine v1 endpoint
pub const COMPUTE_ENDPOINT: &str = "https://compute.googleapis.com/compute/v1";

/// Default Recommender endpoint
pub const RECOMMENDER_ENDPOINT: &str = "https://recommender.googleapis.com";

/// API base URLs, overridable for testing or private endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub compute: String,
    pub recommender: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            compute: COMPUTE_ENDPOINT.to_string(),
            recommender: RECOMMENDER_ENDPOINT.to_string(),
        }
    }
}

/// How long-running Compute operations are awaited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationPolling {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for OperationPolling {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            timeout: Duration::from_secs(600),
        }
    }
}

/// Status of a Compute Engine operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationStatus {
    Running,
    Done,
    Failed(String),
    Unknown(String),
}

impl OperationStatus {
    /// Read the status of a `compute#operation` resource
    pub fn from_operation(operation: &Value) -> Self {
        let status = operation
            .get("status")
            .and_then(|v| v.as_str())
            .unwrap_or_default();

        match status {
            "PENDING" | "RUNNING" => Self::Running,
            "DONE" => match operation_error(operation) {
                Some(error) => Self::Failed(error),
                None => Self::Done,
            },
            other => Self::Unknown(other.to_string()),
        }
    }
}

/// Messages under `error.errors`, joined
fn operation_error(operation: &Value) -> Option<String> {
    let errors = operation.pointer("/error/errors")?.as_array()?;
    if errors.is_empty() {
        return None;
    }

    let messages: Vec<String> = errors
        .iter()
        .map(|e| {
            let code = e.get("code").and_then(|v| v.as_str()).unwrap_or("ERROR");
            let message = e.get("message").and_then(|v| v.as_str()).unwrap_or("-");
            format!("{}: {}", code, message)
        })
        .collect();
    Some(messages.join("; "))
}

/// Main GCP client
#[derive(Clone)]
pub struct GcpClient {
    pub credentials: GcpCredentials,
    pub http: GcpHttpClient,
    pub endpoints: Endpoints,
    pub polling: OperationPolling,
}

impl GcpClient {
    /// Create a new client using Application Default Credentials
    pub async fn new() -> Result<Self> {
        let credentials = GcpCredentials::new()
            .await
            .context("Failed to initialize GCP credentials")?;

        Self::with_credentials(credentials)
    }

    pub fn with_credentials(credentials: GcpCredentials) -> Result<Self> {
        Ok(Self {
            credentials,
            http: GcpHttpClient::new()?,
            endpoints: Endpoints::default(),
            polling: OperationPolling::default(),
        })
    }

    pub fn endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn polling(mut self, polling: OperationPolling) -> Self {
        self.polling = polling;
        self
    }

    pub async fn get_token(&self) -> Result<String> {
        self.credentials.get_token().await
    }

    pub async fn get(&self, url: &str) -> Result<Value> {
        let token = self.get_token().await?;
        self.http.get(url, &token).await
    }

    pub async fn post(&self, url: &str, body: Option<&Value>) -> Result<Value> {
        let token = self.get_token().await?;
        self.http.post(url, &token, body).await
    }

    pub async fn delete(&self, url: &str) -> Result<Value> {
        let token = self.get_token().await?;
        self.http.delete(url, &token).await
    }

    // =========================================================================
    // Compute Engine API helpers
    // =========================================================================

    /// Build zonal Compute Engine API URL
    pub fn compute_zonal_url(&self, project: &str, zone: &str, resource: &str) -> String {
        format!(
            "{}/projects/{}/zones/{}/{}",
            self.endpoints.compute.trim_end_matches('/'),
            project,
            zone,
            resource
        )
    }

    /// Fetch the current state of a zonal operation
    pub async fn poll_operation(&self, project: &str, zone: &str, name: &str) -> Result<OperationStatus> {
        let url = self.compute_zonal_url(project, zone, &format!("operations/{}", name));
        let operation = self.get(&url).await?;
        Ok(OperationStatus::from_operation(&operation))
    }

    /// Wait until a zonal operation returned by a mutation is `DONE`.
    /// A finished operation carrying errors is an error.
    pub async fn wait_for_operation(&self, project: &str, zone: &str, operation: &Value) -> Result<()> {
        let name = operation
            .get("name")
            .and_then(|v| v.as_str())
            .context("Compute response is not an operation")?
            .to_string();

        let deadline = Instant::now() + self.polling.timeout;
        let mut status = OperationStatus::from_operation(operation);

        loop {
            match status {
                OperationStatus::Done => {
                    tracing::debug!("operation {} done", name);
                    return Ok(());
                }
                OperationStatus::Failed(error) => {
                    return Err(anyhow::anyhow!("operation {} failed: {}", name, error));
                }
                OperationStatus::Unknown(s) => {
                    tracing::warn!("Unknown operation status for {}: {}", name, s);
                }
                OperationStatus::Running => {}
            }

            if Instant::now() >= deadline {
                return Err(anyhow::anyhow!(
                    "operation {} did not finish within {}s",
                    name,
                    self.polling.timeout.as_secs()
                ));
            }

            tokio::time::sleep(self.polling.interval).await;
            status = self.poll_operation(project, zone, &name).await?;
        }
    }

    // =========================================================================
    // Recommender API helpers
    // =========================================================================

    /// Build a Recommender v1 URL for a resource path such as
    /// `projects/p/locations/l/recommenders/r/recommendations`
    pub fn recommender_url(&self, path: &str) -> String {
        format!(
            "{}/v1/{}",
            self.endpoints.recommender.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Format a GCP API error for display
pub fn format_gcp_error(error: &anyhow::Error) -> String {
    super::http::format_gcp_error(error)
}

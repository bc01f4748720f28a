//! Configuration Management
//!
//! Handles persistent configuration storage for recapply.

use crate::gcp::client::{Endpoints, OperationPolling, COMPUTE_ENDPOINT, RECOMMENDER_ENDPOINT};
use crate::gcp::recommender::SUPPORTED_RECOMMENDERS;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

fn default_recommenders() -> Vec<String> {
    SUPPORTED_RECOMMENDERS.iter().map(|r| r.to_string()).collect()
}

fn default_poll_interval_ms() -> u64 {
    2000
}

fn default_operation_timeout_secs() -> u64 {
    600
}

fn default_compute_endpoint() -> String {
    COMPUTE_ENDPOINT.to_string()
}

fn default_recommender_endpoint() -> String {
    RECOMMENDER_ENDPOINT.to_string()
}

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Project whose recommendations are listed
    #[serde(default)]
    pub project_id: Option<String>,
    /// Recommender location (a zone for the compute recommenders)
    #[serde(default)]
    pub location: Option<String>,
    /// Recommenders queried by `list`
    #[serde(default = "default_recommenders")]
    pub recommenders: Vec<String>,
    #[serde(default = "default_poll_interval_ms")]
    pub operation_poll_interval_ms: u64,
    #[serde(default = "default_operation_timeout_secs")]
    pub operation_timeout_secs: u64,
    #[serde(default = "default_compute_endpoint")]
    pub compute_endpoint: String,
    #[serde(default = "default_recommender_endpoint")]
    pub recommender_endpoint: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_id: None,
            location: None,
            recommenders: default_recommenders(),
            operation_poll_interval_ms: default_poll_interval_ms(),
            operation_timeout_secs: default_operation_timeout_secs(),
            compute_endpoint: default_compute_endpoint(),
            recommender_endpoint: default_recommender_endpoint(),
        }
    }
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("recapply").join("config.json"))
    }

    /// Load configuration from the default path, falling back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load configuration from `path`; a missing or malformed file yields defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed config {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Get effective project (CLI > config > gcloud default)
    pub fn effective_project(&self) -> Option<String> {
        self.project_id
            .clone()
            .or_else(crate::gcp::auth::get_default_project)
    }

    /// Get effective location (CLI > config > gcloud default zone)
    pub fn effective_location(&self) -> String {
        self.location
            .clone()
            .or_else(crate::gcp::auth::get_default_zone)
            .unwrap_or_else(|| "us-central1-a".to_string())
    }

    /// Validated API endpoints
    pub fn endpoints(&self) -> Result<Endpoints> {
        for endpoint in [&self.compute_endpoint, &self.recommender_endpoint] {
            let url = url::Url::parse(endpoint)
                .with_context(|| format!("Invalid endpoint URL: {}", endpoint))?;
            if !matches!(url.scheme(), "http" | "https") {
                anyhow::bail!("Endpoint must be http(s): {}", endpoint);
            }
        }

        Ok(Endpoints {
            compute: self.compute_endpoint.clone(),
            recommender: self.recommender_endpoint.clone(),
        })
    }

    pub fn polling(&self) -> OperationPolling {
        OperationPolling {
            interval: Duration::from_millis(self.operation_poll_interval_ms),
            timeout: Duration::from_secs(self.operation_timeout_secs),
        }
    }
}

//! Cloud capability interface
//!
//! Everything the engine needs from the cloud, and nothing more. The GCP
//! backend in [`crate::gcp::service`] implements it over REST; tests use
//! recording doubles.

use anyhow::Result;
use async_trait::async_trait;

/// Fields of a Compute Engine instance read by test operations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceSnapshot {
    pub machine_type: String,
    pub status: String,
}

#[async_trait]
pub trait CloudService: Send + Sync {
    async fn get_instance(&self, project: &str, zone: &str, name: &str) -> Result<InstanceSnapshot>;

    async fn stop_instance(&self, project: &str, zone: &str, name: &str) -> Result<()>;

    async fn start_instance(&self, project: &str, zone: &str, name: &str) -> Result<()>;

    async fn change_machine_type(
        &self,
        project: &str,
        zone: &str,
        name: &str,
        machine_type: &str,
    ) -> Result<()>;

    /// Snapshot `disk`. The name is only a hint; backends may substitute
    /// their own.
    async fn create_snapshot(
        &self,
        project: &str,
        zone: &str,
        disk: &str,
        snapshot_name_hint: &str,
    ) -> Result<()>;

    async fn delete_disk(&self, project: &str, zone: &str, disk: &str) -> Result<()>;

    async fn mark_recommendation_claimed(&self, name: &str, etag: &str) -> Result<()>;

    async fn mark_recommendation_succeeded(&self, name: &str, etag: &str) -> Result<()>;

    async fn mark_recommendation_failed(&self, name: &str, etag: &str) -> Result<()>;
}

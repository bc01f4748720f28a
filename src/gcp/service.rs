//! [`CloudService`] backed by the Compute Engine and Recommender REST APIs

use super::client::GcpClient;
use super::{compute, recommender};
use super::recommender::Transition;
use crate::recommendation::{CloudService, InstanceSnapshot};
use anyhow::Result;
use async_trait::async_trait;

#[derive(Clone)]
pub struct GcpService {
    client: GcpClient,
}

impl GcpService {
    pub fn new(client: GcpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CloudService for GcpService {
    async fn get_instance(&self, project: &str, zone: &str, name: &str) -> Result<InstanceSnapshot> {
        compute::get_instance(&self.client, project, zone, name).await
    }

    async fn stop_instance(&self, project: &str, zone: &str, name: &str) -> Result<()> {
        compute::stop_instance(&self.client, project, zone, name).await
    }

    async fn start_instance(&self, project: &str, zone: &str, name: &str) -> Result<()> {
        compute::start_instance(&self.client, project, zone, name).await
    }

    async fn change_machine_type(
        &self,
        project: &str,
        zone: &str,
        name: &str,
        machine_type: &str,
    ) -> Result<()> {
        compute::set_machine_type(&self.client, project, zone, name, machine_type).await
    }

    async fn create_snapshot(
        &self,
        project: &str,
        zone: &str,
        disk: &str,
        snapshot_name_hint: &str,
    ) -> Result<()> {
        let name = compute::snapshot_name(snapshot_name_hint, disk);
        if name != snapshot_name_hint {
            tracing::info!("snapshot name hint {:?} replaced by {}", snapshot_name_hint, name);
        }
        compute::create_snapshot(&self.client, project, zone, disk, &name).await
    }

    async fn delete_disk(&self, project: &str, zone: &str, disk: &str) -> Result<()> {
        compute::delete_disk(&self.client, project, zone, disk).await
    }

    async fn mark_recommendation_claimed(&self, name: &str, etag: &str) -> Result<()> {
        recommender::mark(&self.client, name, etag, Transition::Claimed).await?;
        Ok(())
    }

    async fn mark_recommendation_succeeded(&self, name: &str, etag: &str) -> Result<()> {
        recommender::mark(&self.client, name, etag, Transition::Succeeded).await?;
        Ok(())
    }

    async fn mark_recommendation_failed(&self, name: &str, etag: &str) -> Result<()> {
        recommender::mark(&self.client, name, etag, Transition::Failed).await?;
        Ok(())
    }
}

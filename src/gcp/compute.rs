//! Compute Engine calls
//!
//! Instance and disk mutations used when applying recommendations. Every
//! mutation waits for its zonal operation to finish, so the next call sees
//! its effect.

use super::client::GcpClient;
use crate::recommendation::InstanceSnapshot;
use anyhow::{Context, Result};
use regex::Regex;
use serde_json::{json, Value};
use std::sync::OnceLock;

/// Maximum length of a Compute Engine resource name
const MAX_NAME_LENGTH: usize = 63;

/// Room left for the generated suffix of a snapshot name
const SNAPSHOT_PREFIX_LENGTH: usize = 40;

impl From<&Value> for InstanceSnapshot {
    fn from(value: &Value) -> Self {
        Self {
            machine_type: value
                .get("machineType")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
            status: value
                .get("status")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
        }
    }
}

pub async fn get_instance(client: &GcpClient, project: &str, zone: &str, name: &str) -> Result<InstanceSnapshot> {
    let url = client.compute_zonal_url(project, zone, &format!("instances/{}", name));
    let instance = client
        .get(&url)
        .await
        .with_context(|| format!("Failed to get instance {}", name))?;
    Ok(InstanceSnapshot::from(&instance))
}

pub async fn stop_instance(client: &GcpClient, project: &str, zone: &str, name: &str) -> Result<()> {
    let url = client.compute_zonal_url(project, zone, &format!("instances/{}/stop", name));
    run(client, project, zone, &url, None)
        .await
        .with_context(|| format!("Failed to stop instance {}", name))
}

pub async fn start_instance(client: &GcpClient, project: &str, zone: &str, name: &str) -> Result<()> {
    let url = client.compute_zonal_url(project, zone, &format!("instances/{}/start", name));
    run(client, project, zone, &url, None)
        .await
        .with_context(|| format!("Failed to start instance {}", name))
}

pub async fn set_machine_type(
    client: &GcpClient,
    project: &str,
    zone: &str,
    name: &str,
    machine_type: &str,
) -> Result<()> {
    let url = client.compute_zonal_url(project, zone, &format!("instances/{}/setMachineType", name));
    let body = json!({ "machineType": format!("zones/{}/machineTypes/{}", zone, machine_type) });
    run(client, project, zone, &url, Some(&body))
        .await
        .with_context(|| format!("Failed to set machine type of {} to {}", name, machine_type))
}

pub async fn create_snapshot(
    client: &GcpClient,
    project: &str,
    zone: &str,
    disk: &str,
    snapshot_name: &str,
) -> Result<()> {
    let url = client.compute_zonal_url(project, zone, &format!("disks/{}/createSnapshot", disk));
    let body = json!({ "name": snapshot_name });
    run(client, project, zone, &url, Some(&body))
        .await
        .with_context(|| format!("Failed to snapshot disk {}", disk))
}

pub async fn delete_disk(client: &GcpClient, project: &str, zone: &str, disk: &str) -> Result<()> {
    let url = client.compute_zonal_url(project, zone, &format!("disks/{}", disk));
    run_delete(client, project, zone, &url)
        .await
        .with_context(|| format!("Failed to delete disk {}", disk))
}

/// POST a mutation and wait for its operation
async fn run(client: &GcpClient, project: &str, zone: &str, url: &str, body: Option<&Value>) -> Result<()> {
    let operation = client.post(url, body).await?;
    client.wait_for_operation(project, zone, &operation).await
}

/// DELETE a resource and wait for its operation
async fn run_delete(client: &GcpClient, project: &str, zone: &str, url: &str) -> Result<()> {
    let operation = client.delete(url).await?;
    client.wait_for_operation(project, zone, &operation).await
}

fn resource_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[a-z]([-a-z0-9]*[a-z0-9])?$").expect("resource name pattern is valid")
    })
}

/// Whether `name` is a valid Compute Engine resource name
pub fn is_valid_resource_name(name: &str) -> bool {
    name.len() <= MAX_NAME_LENGTH && resource_name_regex().is_match(name)
}

/// Pick the snapshot name: the hint when usable, otherwise one derived from
/// the disk name, the current time and a random suffix.
pub fn snapshot_name(hint: &str, disk: &str) -> String {
    if is_valid_resource_name(hint) {
        return hint.to_string();
    }

    let prefix: String = disk.chars().take(SNAPSHOT_PREFIX_LENGTH).collect();
    let prefix = prefix.trim_end_matches('-');
    let timestamp = chrono::Utc::now().format("%Y%m%d%H%M%S");
    let suffix: String = uuid::Uuid::new_v4().simple().to_string().chars().take(6).collect();

    format!("{}-{}-{}", prefix, timestamp, suffix)
}

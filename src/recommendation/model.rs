//! Recommendation documents
//!
//! Serde types for the Recommender v1 `Recommendation` resource. Only the
//! fields the engine or the CLI read are modelled; everything else in the
//! API response is ignored.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A recommendation as returned by the Recommender API
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub name: String,
    /// Optimistic-concurrency token, required on every state transition
    #[serde(default)]
    pub etag: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub recommender_subtype: Option<String>,
    #[serde(default)]
    pub last_refresh_time: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub primary_impact: Option<Impact>,
    #[serde(default)]
    pub state_info: StateInfo,
    #[serde(default)]
    pub content: Content,
}

impl Recommendation {
    /// Whether the recommendation is in the Active state (case-insensitive)
    pub fn is_active(&self) -> bool {
        self.state_info.state.eq_ignore_ascii_case("active")
    }

    /// Iterate every operation in document order
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.content
            .operation_groups
            .iter()
            .flat_map(|group| group.operations.iter())
    }

    /// Short id: the last path segment of the name
    pub fn short_id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    /// Recommender id, e.g. `google.compute.instance.MachineTypeRecommender`
    pub fn recommender(&self) -> Option<&str> {
        let mut parts = self.name.split('/');
        while let Some(part) = parts.next() {
            if part == "recommenders" {
                return parts.next();
            }
        }
        None
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateInfo {
    #[serde(default)]
    pub state: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Impact {
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    #[serde(default)]
    pub operation_groups: Vec<OperationGroup>,
}

/// Operations that together make up one change
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationGroup {
    #[serde(default)]
    pub operations: Vec<Operation>,
}

/// A single patch-style step
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub resource: String,
    #[serde(default)]
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_matcher: Option<ValueMatcher>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueMatcher {
    #[serde(default)]
    pub matches_pattern: String,
}

/// Payload of an `add` operation on a snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotPayload {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub source_disk: Option<String>,
    #[serde(default)]
    pub storage_locations: Vec<String>,
}

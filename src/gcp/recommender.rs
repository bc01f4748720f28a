//! Recommender API
//!
//! Listing recommendations and moving them between lifecycle states.

use super::client::GcpClient;
use crate::recommendation::Recommendation;
use anyhow::{Context, Result};
use serde_json::{json, Value};

/// Recommenders whose operations the engine knows how to apply
pub const SUPPORTED_RECOMMENDERS: &[&str] = &[
    "google.compute.instance.MachineTypeRecommender",
    "google.compute.instance.IdleResourceRecommender",
    "google.compute.disk.IdleResourceRecommender",
];

/// State transitions the engine requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Claimed,
    Succeeded,
    Failed,
}

impl Transition {
    fn method(self) -> &'static str {
        match self {
            Self::Claimed => "markClaimed",
            Self::Succeeded => "markSucceeded",
            Self::Failed => "markFailed",
        }
    }
}

/// Result of one page of a list call
pub struct PaginatedResult {
    pub items: Vec<Recommendation>,
    pub next_token: Option<String>,
}

/// Fetch every recommendation of one recommender (auto-paginate)
pub async fn list_recommendations(
    client: &GcpClient,
    project: &str,
    location: &str,
    recommender: &str,
    filter: Option<&str>,
) -> Result<Vec<Recommendation>> {
    let mut all_items = Vec::new();
    let mut page_token: Option<String> = None;

    loop {
        let result = list_recommendations_paginated(
            client,
            project,
            location,
            recommender,
            filter,
            page_token.as_deref(),
        )
        .await?;
        all_items.extend(result.items);

        if result.next_token.is_none() {
            break;
        }
        page_token = result.next_token;
    }

    Ok(all_items)
}

/// Fetch one page of recommendations
pub async fn list_recommendations_paginated(
    client: &GcpClient,
    project: &str,
    location: &str,
    recommender: &str,
    filter: Option<&str>,
    page_token: Option<&str>,
) -> Result<PaginatedResult> {
    let path = format!(
        "projects/{}/locations/{}/recommenders/{}/recommendations",
        project, location, recommender
    );

    let mut query: Vec<String> = Vec::new();
    if let Some(filter) = filter {
        query.push(format!("filter={}", urlencoding::encode(filter)));
    }
    if let Some(token) = page_token {
        query.push(format!("pageToken={}", urlencoding::encode(token)));
    }

    let mut url = client.recommender_url(&path);
    if !query.is_empty() {
        url = format!("{}?{}", url, query.join("&"));
    }

    let response = client
        .get(&url)
        .await
        .with_context(|| format!("Failed to list recommendations of {}", recommender))?;

    let items = match response.get("recommendations") {
        Some(items) => serde_json::from_value(items.clone())
            .context("Failed to parse recommendations")?,
        None => Vec::new(),
    };

    let next_token = response
        .get("nextPageToken")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string());

    Ok(PaginatedResult { items, next_token })
}

/// Fetch a single recommendation by its full name
pub async fn get_recommendation(client: &GcpClient, name: &str) -> Result<Recommendation> {
    let response = client
        .get(&client.recommender_url(name))
        .await
        .with_context(|| format!("Failed to get recommendation {}", name))?;
    parse_recommendation(response)
}

/// Request a state transition of a recommendation
pub async fn mark(client: &GcpClient, name: &str, etag: &str, transition: Transition) -> Result<Recommendation> {
    let url = client.recommender_url(&format!("{}:{}", name, transition.method()));
    let body = json!({ "etag": etag });

    tracing::info!("{} {}", transition.method(), name);

    let response = client
        .post(&url, Some(&body))
        .await
        .with_context(|| format!("Failed to {} {}", transition.method(), name))?;
    parse_recommendation(response)
}

fn parse_recommendation(value: Value) -> Result<Recommendation> {
    serde_json::from_value(value).context("Failed to parse recommendation")
}

//! Recommendation Orchestrator
//!
//! Claims a recommendation, runs each of its operations in document order
//! and records the outcome. The first failure stops the run; operations
//! that already ran are left in place.

use super::dispatch::{self, Step};
use super::error::{ApplyError, Result};
use super::model::Recommendation;
use super::service::CloudService;

/// Outcome of a successful apply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyReport {
    pub name: String,
    pub operations: usize,
}

/// Apply every operation of `recommendation` through `service`.
pub async fn apply<S>(service: &S, recommendation: &Recommendation) -> Result<ApplyReport>
where
    S: CloudService + ?Sized,
{
    ensure_active(recommendation)?;

    let name = recommendation.name.as_str();
    let etag = recommendation.etag.as_str();

    service.mark_recommendation_claimed(name, etag).await?;
    tracing::info!("claimed recommendation {}", name);

    let mut executed = 0;
    for (index, operation) in recommendation.operations().enumerate() {
        tracing::debug!(
            "operation {}: {} {} on {}",
            index,
            operation.action,
            operation.path,
            operation.resource
        );

        if let Err(err) = dispatch::dispatch(service, operation).await {
            tracing::error!("operation {} of {} failed: {}", index, name, err);
            if let Err(mark_err) = service.mark_recommendation_failed(name, etag).await {
                tracing::warn!("failed to mark {} as failed: {:#}", name, mark_err);
            }
            return Err(err);
        }
        executed += 1;
    }

    service.mark_recommendation_succeeded(name, etag).await?;
    tracing::info!("recommendation {} succeeded ({} operations)", name, executed);

    Ok(ApplyReport {
        name: name.to_string(),
        operations: executed,
    })
}

/// Resolve every operation without calling the cloud
pub fn plan(recommendation: &Recommendation) -> Result<Vec<Step>> {
    ensure_active(recommendation)?;
    recommendation.operations().map(dispatch::plan).collect()
}

fn ensure_active(recommendation: &Recommendation) -> Result<()> {
    if recommendation.is_active() {
        return Ok(());
    }
    Err(ApplyError::NotActive {
        state: recommendation.state_info.state.clone(),
    })
}

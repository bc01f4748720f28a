//! GCP API interaction module
//!
//! The production backend of the engine: authentication, HTTP, Compute
//! Engine mutations and Recommender state transitions.
//!
//! # Module Structure
//!
//! - [`auth`] - GCP authentication using Application Default Credentials
//! - [`client`] - Main GCP client, endpoints and operation polling
//! - [`http`] - HTTP utilities for REST API calls
//! - [`compute`] - Instance and disk calls
//! - [`recommender`] - Recommendation listing and state transitions
//! - [`service`] - [`crate::recommendation::CloudService`] implementation
//!
//! # Example
//!
//! ```ignore
//! use recapply::gcp::{client::GcpClient, service::GcpService};
//!
//! async fn example(rec: &recapply::recommendation::Recommendation) -> anyhow::Result<()> {
//!     let service = GcpService::new(GcpClient::new().await?);
//!     recapply::recommendation::apply(&service, rec).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod compute;
pub mod http;
pub mod recommender;
pub mod service;

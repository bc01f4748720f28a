//! Recommendation application engine
//!
//! Turns the patch-style operations of a Recommender recommendation into
//! Compute Engine calls, and moves the recommendation through
//! Active -> Claimed -> Succeeded | Failed.
//!
//! # Module Structure
//!
//! - [`model`] - serde types for recommendation documents
//! - [`locator`] - resource string parsing
//! - [`matcher`] - conditions of test operations
//! - [`service`] - the cloud capability trait the engine calls
//! - [`dispatch`] - per-operation routing
//! - [`apply`] - recommendation-level orchestration
//!
//! # Example
//!
//! ```ignore
//! use recapply::recommendation::{apply, Recommendation};
//!
//! async fn run(service: &impl recapply::recommendation::CloudService, rec: &Recommendation) {
//!     match apply(service, rec).await {
//!         Ok(report) => println!("applied {} operations", report.operations),
//!         Err(err) => eprintln!("{}", err),
//!     }
//! }
//! ```

pub mod apply;
pub mod dispatch;
pub mod error;
pub mod locator;
pub mod matcher;
pub mod model;
pub mod service;

pub use apply::{apply, plan, ApplyReport};
pub use dispatch::{dispatch, Step};
pub use error::{ApplyError, ParseError};
pub use model::{Operation, OperationGroup, Recommendation};
pub use service::{CloudService, InstanceSnapshot};

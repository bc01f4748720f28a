//! recapply
//!
//! Applies Google Cloud Recommender recommendations to Compute Engine
//! resources.
//!
//! - [`recommendation`] - the application engine (dispatch, matching, orchestration)
//! - [`gcp`] - REST backend implementing [`recommendation::CloudService`]
//! - [`config`] - persistent configuration

pub mod config;
pub mod gcp;
pub mod recommendation;

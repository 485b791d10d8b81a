//! beanflow Cloud Gateways
//!
//! This crate defines the remote collaborators the deployment pipeline talks
//! to, independent of any concrete cloud SDK.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                 beanflow-deploy                  │
//! │        (assemble → upload → register →           │
//! │                   promote)                       │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                 beanflow-cloud                   │
//! │  ┌──────────────────┐  ┌─────────────────────┐  │
//! │  │  ObjectStorage   │  │  DeploymentService  │  │
//! │  └──────────────────┘  └─────────────────────┘  │
//! └───────┬─────────────────────────┬───────────────┘
//!         │                         │
//! ┌───────▼───────┐         ┌───────▼──────────────┐
//! │      S3       │         │  Elastic Beanstalk   │
//! └───────────────┘         └──────────────────────┘
//!       (beanflow-cloud-aws)
//! ```

pub mod error;
pub mod gateway;
pub mod request;

// Re-exports
pub use error::{CloudError, Result};
pub use gateway::{DeploymentService, ObjectStorage};
pub use request::{
    EnvironmentInfo, ObjectLocation, PromotionRequest, VersionInfo, VersionRequest,
};

//! Gateway trait definitions

use crate::error::Result;
use crate::request::{EnvironmentInfo, PromotionRequest, VersionInfo, VersionRequest};
use async_trait::async_trait;

/// Object storage abstraction
///
/// Implementations upload a complete object in one call. No retries are
/// performed at this layer beyond what the underlying client does itself.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Returns the backend name for logging (e.g., "s3")
    fn name(&self) -> &str;

    /// Upload `body` to `bucket` under `key`, replacing any existing object
    async fn put(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<()>;
}

/// Deployment service abstraction
///
/// Registration and promotion are separate calls; promotion assumes the
/// version was registered earlier and never registers it itself.
#[async_trait]
pub trait DeploymentService: Send + Sync {
    /// Returns the backend name for logging (e.g., "elastic-beanstalk")
    fn name(&self) -> &str;

    /// Register a new application version
    ///
    /// The application must already exist. Implementations must not create
    /// it implicitly and report [`CloudError::ApplicationNotFound`] instead.
    ///
    /// [`CloudError::ApplicationNotFound`]: crate::CloudError::ApplicationNotFound
    async fn create_version(&self, request: &VersionRequest) -> Result<VersionInfo>;

    /// Point an environment at an already registered version
    async fn promote(&self, request: &PromotionRequest) -> Result<EnvironmentInfo>;
}

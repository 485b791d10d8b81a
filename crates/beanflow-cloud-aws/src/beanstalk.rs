//! Elastic Beanstalk deployment gateway

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_elasticbeanstalk::Client;
use aws_sdk_elasticbeanstalk::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_elasticbeanstalk::types::S3Location;
use beanflow_cloud::{
    CloudError, DeploymentService, EnvironmentInfo, PromotionRequest, Result, VersionInfo,
    VersionRequest,
};

/// Registers versions and updates environments on Elastic Beanstalk
pub struct BeanstalkService {
    client: Client,
}

impl BeanstalkService {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }

    /// Wrap an already configured client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DeploymentService for BeanstalkService {
    fn name(&self) -> &str {
        "elastic-beanstalk"
    }

    async fn create_version(&self, request: &VersionRequest) -> Result<VersionInfo> {
        tracing::debug!(
            application = %request.application_name,
            version = %request.version_label,
            source = %request.source,
            "Creating application version"
        );

        let source_bundle = S3Location::builder()
            .s3_bucket(&request.source.bucket)
            .s3_key(&request.source.key)
            .build();

        let output = self
            .client
            .create_application_version()
            .application_name(&request.application_name)
            .version_label(&request.version_label)
            .set_description(request.description.clone())
            .source_bundle(source_bundle)
            .auto_create_application(false)
            .send()
            .await
            .map_err(|e| {
                if is_missing_application(e.message()) {
                    CloudError::ApplicationNotFound(request.application_name.clone())
                } else {
                    CloudError::Deployment(DisplayErrorContext(&e).to_string())
                }
            })?;

        let description = output.application_version();
        Ok(VersionInfo {
            application_name: request.application_name.clone(),
            version_label: request.version_label.clone(),
            version_id: description
                .and_then(|d| d.application_version_arn())
                .map(str::to_string),
            status: description
                .and_then(|d| d.status())
                .map(|s| s.as_str().to_string()),
        })
    }

    async fn promote(&self, request: &PromotionRequest) -> Result<EnvironmentInfo> {
        tracing::debug!(
            environment = %request.environment_name,
            version = %request.version_label,
            "Updating environment"
        );

        let output = self
            .client
            .update_environment()
            .application_name(&request.application_name)
            .environment_name(&request.environment_name)
            .version_label(&request.version_label)
            .send()
            .await
            .map_err(|e| CloudError::Deployment(DisplayErrorContext(&e).to_string()))?;

        Ok(EnvironmentInfo {
            environment_name: output
                .environment_name()
                .unwrap_or(request.environment_name.as_str())
                .to_string(),
            environment_id: output.environment_id().map(str::to_string),
            version_label: output.version_label().map(str::to_string),
            status: output.status().map(|s| s.as_str().to_string()),
        })
    }
}

/// Elastic Beanstalk reports an unknown application as a parameter error
/// ("No Application named 'x' found.")
fn is_missing_application(message: Option<&str>) -> bool {
    message.is_some_and(|m| m.contains("No Application named"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_missing_application() {
        assert!(is_missing_application(Some(
            "No Application named 'shop' found."
        )));
        assert!(!is_missing_application(Some(
            "Application Version v1 already exists."
        )));
        assert!(!is_missing_application(None));
    }
}

//! SDK configuration and credential resolution

use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_s3::config::Credentials as StaticCredentials;
use beanflow_cloud::{CloudError, Result};
use beanflow_core::Credentials;

const PROVIDER_NAME: &str = "beanflow";

/// Build the shared SDK configuration
///
/// Explicit fields override ambient discovery; anything left unset falls back
/// to the default chain (environment, profile, instance metadata, ...).
pub async fn load_sdk_config(credentials: Option<&Credentials>) -> Result<SdkConfig> {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());

    if let Some(region) = credentials.and_then(|c| c.region.clone()) {
        tracing::debug!(region = %region, "Using explicit region");
        loader = loader.region(Region::new(region));
    }

    if let Some(static_credentials) = static_credentials(credentials)? {
        tracing::debug!("Using explicit access key");
        loader = loader.credentials_provider(static_credentials);
    }

    Ok(loader.load().await)
}

/// Static credentials from an explicit key pair, if one was given
///
/// A key id without a secret (or the reverse) is rejected rather than
/// silently mixed with ambient credentials.
fn static_credentials(credentials: Option<&Credentials>) -> Result<Option<StaticCredentials>> {
    let Some(credentials) = credentials else {
        return Ok(None);
    };

    match (&credentials.access_key_id, &credentials.secret_access_key) {
        (Some(id), Some(secret)) => Ok(Some(StaticCredentials::new(
            id.clone(),
            secret.clone(),
            None,
            None,
            PROVIDER_NAME,
        ))),
        (None, None) => Ok(None),
        (Some(_), None) => Err(CloudError::Credentials(
            "access-key-id was given without secret-access-key".to_string(),
        )),
        (None, Some(_)) => Err(CloudError::Credentials(
            "secret-access-key was given without access-key-id".to_string(),
        )),
    }
}

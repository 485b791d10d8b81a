//! S3 object storage gateway

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use beanflow_cloud::{CloudError, ObjectStorage, Result};

/// Uploads archives to S3
pub struct S3Storage {
    client: Client,
}

impl S3Storage {
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
impl ObjectStorage for S3Storage {
    fn name(&self) -> &str {
        "s3"
    }

    async fn put(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<()> {
        let size = body.len();
        tracing::debug!(bucket, key, size, "Uploading object");

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| CloudError::Storage(DisplayErrorContext(&e).to_string()))?;

        tracing::info!(bucket, key, size, "Object uploaded");
        Ok(())
    }
}

//! S3-backed bucket client.

use crate::client::ObjectStoreClient;
use crate::error::StoreError;
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;

/// Content type recorded on uploaded changelogs.
const CHANGELOG_CONTENT_TYPE: &str = "application/yaml";

/// Object store configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSettings {
    /// AWS region. Required.
    pub region: Option<String>,
    /// Bucket name. Required.
    pub bucket: Option<String>,
    /// Prefix placed in front of every object key.
    pub prefix: String,
    /// Custom endpoint for S3-compatible stores.
    pub endpoint: Option<String>,
    /// Use path-style addressing (`endpoint/bucket/key`).
    pub force_path_style: bool,
}

impl StoreSettings {
    fn required(value: &Option<String>) -> Option<String> {
        value.clone().filter(|v| !v.trim().is_empty())
    }
}

/// Talks to a real bucket through `aws-sdk-s3`.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    /// Builds a client from the default AWS credential chain.
    ///
    /// Returns `None` when region or bucket is missing; the gateway then
    /// reports [`StoreError::NotConfigured`] on every call.
    pub async fn connect(settings: &StoreSettings) -> Option<Self> {
        let region = StoreSettings::required(&settings.region)?;
        let bucket = StoreSettings::required(&settings.bucket)?;

        let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region));
        if let Some(endpoint) = StoreSettings::required(&settings.endpoint) {
            loader = loader.endpoint_url(endpoint);
        }
        let shared_config = loader.load().await;

        let mut s3_builder = aws_sdk_s3::config::Builder::from(&shared_config);
        if settings.force_path_style {
            s3_builder = s3_builder.force_path_style(true);
        }

        tracing::info!(%bucket, "configured S3 object store");
        Some(Self {
            client: Client::from_conf(s3_builder.build()),
            bucket,
        })
    }
}

#[async_trait]
impl ObjectStoreClient for S3ObjectStore {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(CHANGELOG_CONTENT_TYPE)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|err| StoreError::Transport {
                key: key.to_string(),
                message: DisplayErrorContext(&err).to_string(),
            })?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| StoreError::Transport {
                key: key.to_string(),
                message: DisplayErrorContext(&err).to_string(),
            })?;

        let data = output
            .body
            .collect()
            .await
            .map_err(|err| StoreError::Transport {
                key: key.to_string(),
                message: err.to_string(),
            })?;
        Ok(data.into_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_region_or_bucket_yields_no_client() {
        let settings = StoreSettings {
            region: Some("eu-west-1".to_string()),
            ..StoreSettings::default()
        };
        assert!(S3ObjectStore::connect(&settings).await.is_none());

        let settings = StoreSettings {
            region: Some(" ".to_string()),
            bucket: Some("backups".to_string()),
            ..StoreSettings::default()
        };
        assert!(S3ObjectStore::connect(&settings).await.is_none());
    }
}

//! Spaces client implementation.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{Builder, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};

/// Object store used by the pipeline for generated media.
///
/// Uploading returns a permanent, publicly retrievable URL.
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn upload_bytes(
        &self,
        data: Vec<u8>,
        key: &str,
        content_type: &str,
    ) -> StorageResult<String>;
}

/// Configuration for the Spaces client.
#[derive(Debug, Clone)]
pub struct SpacesConfig {
    /// Spaces endpoint URL (S3 API endpoint)
    pub endpoint_url: String,
    /// Access key ID
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// Bucket name
    pub bucket_name: String,
    /// Region (e.g. "nyc3")
    pub region: String,
    /// Public base URL for uploaded objects; falls back to the
    /// endpoint/bucket path when unset (e.g. a CDN edge URL)
    pub public_base_url: Option<String>,
}

impl SpacesConfig {
    /// Create config from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        Ok(Self {
            endpoint_url: std::env::var("SPACES_ENDPOINT_URL")
                .map_err(|_| StorageError::config_error("SPACES_ENDPOINT_URL not set"))?,
            access_key_id: std::env::var("SPACES_ACCESS_KEY_ID")
                .map_err(|_| StorageError::config_error("SPACES_ACCESS_KEY_ID not set"))?,
            secret_access_key: std::env::var("SPACES_SECRET_ACCESS_KEY")
                .map_err(|_| StorageError::config_error("SPACES_SECRET_ACCESS_KEY not set"))?,
            bucket_name: std::env::var("SPACES_BUCKET_NAME")
                .map_err(|_| StorageError::config_error("SPACES_BUCKET_NAME not set"))?,
            region: std::env::var("SPACES_REGION").unwrap_or_else(|_| "nyc3".to_string()),
            public_base_url: std::env::var("SPACES_PUBLIC_BASE_URL").ok(),
        })
    }
}

/// Digital Ocean Spaces storage client.
#[derive(Clone)]
pub struct SpacesClient {
    client: Client,
    bucket: String,
    endpoint_url: String,
    public_base_url: Option<String>,
}

impl SpacesClient {
    /// Create a new Spaces client from configuration.
    pub fn new(config: SpacesConfig) -> Self {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "spaces",
        );

        let sdk_config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint_url)
            .region(Region::new(config.region))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Self {
            client: Client::from_conf(sdk_config),
            bucket: config.bucket_name,
            endpoint_url: config.endpoint_url.trim_end_matches('/').to_string(),
            public_base_url: config
                .public_base_url
                .map(|u| u.trim_end_matches('/').to_string()),
        }
    }

    /// Create from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        Ok(Self::new(SpacesConfig::from_env()?))
    }

    /// Permanent public URL for a stored object.
    pub fn public_url(&self, key: &str) -> String {
        match &self.public_base_url {
            Some(base) => format!("{}/{}", base, key),
            None => format!("{}/{}/{}", self.endpoint_url, self.bucket, key),
        }
    }

    /// Check if an object exists.
    pub async fn exists(&self, key: &str) -> StorageResult<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) => {
                if e.to_string().contains("NotFound") || e.to_string().contains("NoSuchKey") {
                    Ok(false)
                } else {
                    Err(StorageError::AwsSdk(e.to_string()))
                }
            }
        }
    }

    /// Check connectivity by performing a head bucket operation.
    pub async fn check_connectivity(&self) -> StorageResult<()> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| StorageError::AwsSdk(format!("Spaces connectivity check failed: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl MediaStore for SpacesClient {
    /// Upload bytes and return the permanent public URL.
    async fn upload_bytes(
        &self,
        data: Vec<u8>,
        key: &str,
        content_type: &str,
    ) -> StorageResult<String> {
        if key.is_empty() || key.starts_with('/') {
            return Err(StorageError::invalid_key(key));
        }

        debug!("Uploading {} bytes to {}", data.len(), key);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .acl(aws_sdk_s3::types::ObjectCannedAcl::PublicRead)
            .send()
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;

        let url = self.public_url(key);
        info!("Uploaded {} ({})", key, url);
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SpacesConfig {
        SpacesConfig {
            endpoint_url: "https://nyc3.digitaloceanspaces.com".to_string(),
            access_key_id: "key".to_string(),
            secret_access_key: "secret".to_string(),
            bucket_name: "viralforge".to_string(),
            region: "nyc3".to_string(),
            public_base_url: None,
        }
    }

    #[test]
    fn test_public_url_from_endpoint() {
        let client = SpacesClient::new(config());
        assert_eq!(
            client.public_url("videos/v1/image_0.png"),
            "https://nyc3.digitaloceanspaces.com/viralforge/videos/v1/image_0.png"
        );
    }

    #[test]
    fn test_public_url_prefers_cdn_base() {
        let mut cfg = config();
        cfg.public_base_url = Some("https://cdn.example.com/".to_string());
        let client = SpacesClient::new(cfg);
        assert_eq!(
            client.public_url("videos/v1/image_0.png"),
            "https://cdn.example.com/videos/v1/image_0.png"
        );
    }
}

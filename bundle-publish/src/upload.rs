#![doc = "Object-store integration for the CLI: implements the core `ObjectStore` contract on top of the AWS S3 SDK."]
//
//! # S3 gateway (CLI <-> Core)
//!
//! This module bridges the [`ObjectStore`] trait from `bundle-publish-core` to any
//! S3-compatible store. It is constructed once at process start and passed by reference
//! into the publish workflow.
//!
//! ## Client Usage
//!
//! - Credentials come from the AWS default provider chain (env, profile, SSO, IMDS).
//! - [`StoreSettings`] can pin a region and a custom endpoint. A custom endpoint switches
//!   to path-style addressing, which MinIO and LocalStack require.
//! - Uploads use the `public-read` canned ACL and overwrite existing keys.

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client;

use bundle_publish_core::contract::{ObjectStore, StoreError};

/// Connection settings for the object store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSettings {
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
}

pub struct S3Store {
    client: Client,
}

impl S3Store {
    pub async fn new(settings: &StoreSettings) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &settings.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(endpoint_url) = &settings.endpoint_url {
            tracing::info!(endpoint_url = %endpoint_url, "Using custom object store endpoint");
            loader = loader.endpoint_url(endpoint_url);
        }
        let sdk_config = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(settings.endpoint_url.is_some())
            .build();
        tracing::info!(
            region = ?sdk_config.region(),
            custom_endpoint = settings.endpoint_url.is_some(),
            "Initialized S3 client"
        );
        S3Store {
            client: Client::from_conf(s3_config),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn exists(&self, bucket: &str, prefix: &str) -> Result<bool, StoreError> {
        tracing::debug!(bucket, prefix, "Listing objects by prefix");
        let response = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .prefix(prefix)
            .max_keys(1)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %DisplayErrorContext(&e), bucket, prefix, "S3 error listing objects");
                format!(
                    "listing s3://{bucket}/{prefix} failed: {}",
                    DisplayErrorContext(&e)
                )
            })?;
        Ok(!response.contents().is_empty())
    }

    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StoreError> {
        let size = body.len();
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .acl(ObjectCannedAcl::PublicRead)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %DisplayErrorContext(&e), bucket, key, "S3 error uploading object");
                format!("uploading s3://{bucket}/{key} failed: {}", DisplayErrorContext(&e))
            })?;
        tracing::info!(bucket, key, content_type, size, "Successfully uploaded object");
        Ok(())
    }
}

//! AWS clients behind the storage and invalidation traits: S3 for objects,
//! CloudFront for cache invalidation.
//!
//! # AWS Integration
//!
//! Bridges the [`StorageClient`] and [`CacheInvalidator`] abstractions to the
//! AWS SDK. Both clients are built from one shared `aws-config` load, so they
//! pick up credentials and region from the standard provider chain
//! (environment, profile, instance metadata).
//!
//! - [`S3Storage`] also works against S3-compatible stores when an
//!   `endpoint_url` is configured; requests then use path-style addressing.
//! - [`CloudFrontInvalidator`] always talks to CloudFront itself.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_cloudfront::types::{InvalidationBatch, Paths};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{Delete, ObjectCannedAcl, ObjectIdentifier, StorageClass};
use serde::Deserialize;
use tracing::{debug, error, info};

use crate::contract::{
    BoxError, CacheInvalidator, DeleteObjectsRequest, InvalidationRequest, ListObjectsRequest,
    ObjectPage, PutObjectRequest, StorageClient,
};

/// Optional overrides for the AWS clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AwsSettings {
    #[serde(default)]
    pub region: Option<String>,
    /// Custom S3 endpoint, e.g. a MinIO or RustFS instance.
    #[serde(default)]
    pub endpoint_url: Option<String>,
}

/// Load the shared SDK configuration.
pub async fn load_sdk_config(settings: &AwsSettings) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = &settings.region {
        loader = loader.region(Region::new(region.clone()));
    }
    let sdk_config = loader.load().await;
    info!(
        region = ?sdk_config.region().map(|r| r.as_ref().to_string()),
        endpoint_url = ?settings.endpoint_url,
        "Loaded AWS configuration"
    );
    sdk_config
}

pub struct S3Storage {
    client: aws_sdk_s3::Client,
}

impl S3Storage {
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }

    pub fn from_sdk_config(sdk_config: &SdkConfig, settings: &AwsSettings) -> Self {
        let mut builder = aws_sdk_s3::config::Builder::from(sdk_config);
        if let Some(endpoint) = &settings.endpoint_url {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }
        Self::new(aws_sdk_s3::Client::from_conf(builder.build()))
    }
}

#[async_trait]
impl StorageClient for S3Storage {
    async fn put_object(&self, req: PutObjectRequest) -> Result<(), BoxError> {
        let props = req.properties;
        let metadata: Option<HashMap<String, String>> = if props.metadata.is_empty() {
            None
        } else {
            Some(props.metadata.into_iter().collect())
        };

        self.client
            .put_object()
            .bucket(&req.bucket)
            .key(&req.key)
            .body(ByteStream::from(req.body))
            .set_content_type(props.content_type)
            .set_cache_control(props.cache_control)
            .set_content_encoding(props.content_encoding)
            .set_content_disposition(props.content_disposition)
            .set_content_language(props.content_language)
            .set_storage_class(props.storage_class.as_deref().map(StorageClass::from))
            .set_acl(props.acl.as_deref().map(ObjectCannedAcl::from))
            .set_metadata(metadata)
            .send()
            .await
            .map_err(|e| {
                error!(bucket = %req.bucket, key = %req.key, error = ?e, "S3 put_object failed");
                Box::new(e) as BoxError
            })?;
        Ok(())
    }

    async fn list_objects(&self, req: ListObjectsRequest) -> Result<ObjectPage, BoxError> {
        let out = self
            .client
            .list_objects_v2()
            .bucket(&req.bucket)
            .prefix(&req.prefix)
            .set_continuation_token(req.continuation_token)
            .send()
            .await
            .map_err(|e| {
                error!(
                    bucket = %req.bucket,
                    prefix = %req.prefix,
                    error = ?e,
                    "S3 list_objects_v2 failed",
                );
                Box::new(e) as BoxError
            })?;

        let keys: Vec<String> = out
            .contents()
            .iter()
            .filter_map(|o| o.key().map(str::to_string))
            .collect();
        let next_continuation_token = if out.is_truncated().unwrap_or(false) {
            out.next_continuation_token().map(str::to_string)
        } else {
            None
        };
        debug!(bucket = %req.bucket, prefix = %req.prefix, keys = keys.len(), "Listed S3 objects");
        Ok(ObjectPage {
            keys,
            next_continuation_token,
        })
    }

    async fn delete_objects(&self, req: DeleteObjectsRequest) -> Result<(), BoxError> {
        let objects = req
            .keys
            .iter()
            .map(|k| ObjectIdentifier::builder().key(k).build())
            .collect::<Result<Vec<_>, _>>()?;
        let delete = Delete::builder()
            .set_objects(Some(objects))
            .quiet(true)
            .build()?;

        let out = self
            .client
            .delete_objects()
            .bucket(&req.bucket)
            .delete(delete)
            .send()
            .await
            .map_err(|e| {
                error!(
                    bucket = %req.bucket,
                    count = req.keys.len(),
                    error = ?e,
                    "S3 delete_objects failed",
                );
                Box::new(e) as BoxError
            })?;

        // Quiet mode only reports keys that could not be deleted.
        let failures: Vec<String> = out
            .errors()
            .iter()
            .map(|e| {
                format!(
                    "{}: {}",
                    e.key().unwrap_or("<unknown>"),
                    e.message().or(e.code()).unwrap_or("unknown error")
                )
            })
            .collect();
        if !failures.is_empty() {
            error!(
                bucket = %req.bucket,
                failed = failures.len(),
                "S3 delete_objects reported per-key errors",
            );
            return Err(format!("could not delete {}", failures.join(", ")).into());
        }
        debug!(bucket = %req.bucket, count = req.keys.len(), "Deleted S3 objects");
        Ok(())
    }
}

pub struct CloudFrontInvalidator {
    client: aws_sdk_cloudfront::Client,
}

impl CloudFrontInvalidator {
    pub fn new(client: aws_sdk_cloudfront::Client) -> Self {
        Self { client }
    }

    pub fn from_sdk_config(sdk_config: &SdkConfig) -> Self {
        Self::new(aws_sdk_cloudfront::Client::new(sdk_config))
    }
}

#[async_trait]
impl CacheInvalidator for CloudFrontInvalidator {
    async fn create_invalidation(&self, req: InvalidationRequest) -> Result<String, BoxError> {
        let paths = Paths::builder()
            .quantity(i32::try_from(req.paths.len())?)
            .set_items(Some(req.paths.clone()))
            .build()?;
        let batch = InvalidationBatch::builder()
            .paths(paths)
            .caller_reference(&req.caller_reference)
            .build()?;

        let out = self
            .client
            .create_invalidation()
            .distribution_id(&req.distribution_id)
            .invalidation_batch(batch)
            .send()
            .await
            .map_err(|e| {
                error!(
                    distribution_id = %req.distribution_id,
                    error = ?e,
                    "CloudFront create_invalidation failed",
                );
                Box::new(e) as BoxError
            })?;

        let id = out
            .invalidation()
            .map(|i| i.id().to_string())
            .unwrap_or_default();
        info!(
            distribution_id = %req.distribution_id,
            invalidation_id = %id,
            "CloudFront invalidation created",
        );
        Ok(id)
    }
}

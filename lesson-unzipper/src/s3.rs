#![doc = "S3 integration: implements the core fetch/publish traits on top of the AWS SDK."]
//
//! # S3 store
//!
//! Bridges [`lesson_unzipper_core::contract::ObjectFetcher`] and
//! [`lesson_unzipper_core::contract::ObjectPublisher`] to `aws-sdk-s3`.
//!
//! - Construct [`S3Store`] once per process with [`S3Store::from_env`], which
//!   uses the Lambda execution role credentials via `aws-config` defaults.
//! - SDK errors (NoSuchKey, AccessDenied, throttling) are converted to boxed
//!   errors carrying the SDK's display text; the core adds the stage prefix.

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client;
use lesson_unzipper_core::contract::{
    AccessPolicy, ObjectFetcher, ObjectPublisher, PutObjectRequest, StoreError,
};

pub struct S3Store {
    client: Client,
}

impl S3Store {
    pub async fn from_env() -> Self {
        let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        tracing::info!(
            region = sdk_config.region().map(|r| r.as_ref()).unwrap_or("<default>"),
            "Initialized S3 client from environment"
        );
        Self::new(Client::new(&sdk_config))
    }

    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn canned_acl(policy: AccessPolicy) -> ObjectCannedAcl {
    match policy {
        AccessPolicy::Private => ObjectCannedAcl::Private,
    }
}

#[async_trait]
impl ObjectFetcher for S3Store {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        tracing::info!(bucket, key, "Fetching object");
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let e = aws_sdk_s3::error::DisplayErrorContext(e);
                tracing::error!(bucket, key, error = %e, "S3 GetObject failed");
                format!("{e}")
            })?;

        let body = output.body.collect().await.map_err(|e| {
            tracing::error!(bucket, key, error = %e, "Failed to read S3 object body");
            Box::new(e) as StoreError
        })?;
        Ok(body.into_bytes().to_vec())
    }
}

#[async_trait]
impl ObjectPublisher for S3Store {
    async fn put_object(&self, req: PutObjectRequest) -> Result<(), StoreError> {
        tracing::debug!(
            bucket = %req.bucket,
            key = %req.key,
            content_type = req.content_type.as_deref().unwrap_or("<none>"),
            size = req.body.len(),
            "Putting object"
        );
        self.client
            .put_object()
            .bucket(&req.bucket)
            .key(&req.key)
            .body(ByteStream::from(req.body))
            .set_content_type(req.content_type)
            .acl(canned_acl(req.access_policy))
            .content_disposition(req.content_disposition.as_str())
            .send()
            .await
            .map_err(|e| {
                let e = aws_sdk_s3::error::DisplayErrorContext(e);
                tracing::error!(
                    bucket = %req.bucket,
                    key = %req.key,
                    error = %e,
                    "S3 PutObject failed"
                );
                format!("{e}")
            })?;
        Ok(())
    }
}

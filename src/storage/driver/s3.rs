//! aws-sdk-s3 driver for any S3-compatible server (MinIO included).
//!
//! Credentials come from the environment; the endpoint is overridable so a
//! local MinIO works out of the box. Store faults are classified through the
//! SDK's typed service errors, never by inspecting message text.

use aws_config::Region;
use aws_config::timeout::TimeoutConfig;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{Delete, ObjectIdentifier};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::config::Config;
use crate::error::{DeleteFailure, StoreError};
use crate::storage::{ObjectInfo, ObjectReader, ObjectStore};

/// `x-amz-copy-source` is sent as a header verbatim, so the key must be
/// percent-encoded by the caller. Unreserved characters and the `/`
/// separators stay literal, everything else is escaped.
const COPY_SOURCE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

fn copy_source(bucket: &str, key: &str) -> String {
    format!("{}/{}", bucket, utf8_percent_encode(key, COPY_SOURCE_SET))
}

pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    /// Connects to the store and makes sure the shared bucket exists,
    /// creating it on first run.
    pub async fn connect(config: &Config) -> Result<Self, StoreError> {
        let sdk_config = aws_config::ConfigLoader::default()
            .credentials_provider(
                aws_config::environment::EnvironmentVariableCredentialsProvider::new(),
            )
            .region(Region::new(config.region.clone()))
            .endpoint_url(config.endpoint_url.clone())
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(config.timeout)
                    .build(),
            )
            .load()
            .await;
        let client = Client::new(&sdk_config);

        let store = Self {
            client,
            bucket: config.bucket.clone(),
        };
        store.ensure_bucket().await?;
        Ok(store)
    }

    async fn ensure_bucket(&self) -> Result<(), StoreError> {
        match self.client.head_bucket().bucket(&self.bucket).send().await {
            Ok(_) => Ok(()),
            Err(err) => {
                let service_err = err.into_service_error();
                if !service_err.is_not_found() {
                    return Err(StoreError::operation(service_err));
                }
                tracing::info!(bucket = %self.bucket, "creating root bucket");
                self.client
                    .create_bucket()
                    .bucket(&self.bucket)
                    .send()
                    .await
                    .map_err(|e| StoreError::operation(e.into_service_error()))?;
                Ok(())
            }
        }
    }
}

#[async_trait::async_trait]
impl ObjectStore for S3Store {
    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        match self.stat(key).await {
            Ok(_) => Ok(true),
            Err(StoreError::NotFound(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }

    async fn stat(&self, key: &str) -> Result<ObjectInfo, StoreError> {
        let response = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| {
                let service_err = err.into_service_error();
                if service_err.is_not_found() {
                    StoreError::NotFound(key.to_string())
                } else {
                    StoreError::operation(service_err)
                }
            })?;

        let name = key
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(key)
            .to_string();
        Ok(ObjectInfo {
            name,
            size: response.content_length().unwrap_or(0).max(0) as u64,
            last_modified: response
                .last_modified()
                .map(to_chrono)
                .unwrap_or_else(Utc::now),
        })
    }

    async fn list(&self, prefix: &str, recursive: bool) -> Result<Vec<String>, StoreError> {
        let mut request = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix);
        if !recursive {
            request = request.delimiter("/");
        }

        let mut keys = Vec::new();
        let mut pages = request.into_paginator().send();
        while let Some(page) = pages
            .try_next()
            .await
            .map_err(|e| StoreError::operation(e.into_service_error()))?
        {
            for object in page.contents() {
                if let Some(key) = object.key() {
                    keys.push(key.to_string());
                }
            }
            // With a delimiter, nested subtrees surface as common prefixes,
            // which are exactly the folder-shaped child keys.
            for common in page.common_prefixes() {
                if let Some(p) = common.prefix() {
                    keys.push(p.to_string());
                }
            }
        }
        keys.sort();
        keys.dedup();
        Ok(keys)
    }

    async fn put(&self, key: &str, content: Bytes) -> Result<(), StoreError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(content))
            .send()
            .await
            .map_err(|e| StoreError::operation(e.into_service_error()))?;
        Ok(())
    }

    async fn copy(&self, src: &str, dst: &str) -> Result<(), StoreError> {
        self.client
            .copy_object()
            .bucket(&self.bucket)
            .copy_source(copy_source(&self.bucket, src))
            .key(dst)
            .send()
            .await
            .map_err(|e| StoreError::operation(e.into_service_error()))?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StoreError::operation(e.into_service_error()))?;
        Ok(())
    }

    async fn batch_delete(&self, keys: &[String]) -> Result<Vec<DeleteFailure>, StoreError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut identifiers = Vec::with_capacity(keys.len());
        for key in keys {
            identifiers.push(
                ObjectIdentifier::builder()
                    .key(key)
                    .build()
                    .map_err(StoreError::operation)?,
            );
        }
        let delete = Delete::builder()
            .set_objects(Some(identifiers))
            .build()
            .map_err(StoreError::operation)?;

        let response = self
            .client
            .delete_objects()
            .bucket(&self.bucket)
            .delete(delete)
            .send()
            .await
            .map_err(|e| StoreError::operation(e.into_service_error()))?;

        let failures = response
            .errors()
            .iter()
            .map(|err| DeleteFailure {
                key: err.key().unwrap_or_default().to_string(),
                cause: format!(
                    "{}: {}",
                    err.code().unwrap_or("unknown"),
                    err.message().unwrap_or("")
                ),
            })
            .collect();
        Ok(failures)
    }

    async fn get_stream(&self, key: &str) -> Result<ObjectReader, StoreError> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| {
                let service_err = err.into_service_error();
                if service_err.is_no_such_key() {
                    StoreError::NotFound(key.to_string())
                } else {
                    StoreError::operation(service_err)
                }
            })?;
        Ok(Box::pin(response.body.into_async_read()))
    }
}

fn to_chrono(dt: &aws_sdk_s3::primitives::DateTime) -> DateTime<Utc> {
    DateTime::from_timestamp(dt.secs(), dt.subsec_nanos()).unwrap_or_default()
}

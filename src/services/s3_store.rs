//! src/services/s3_store.rs
//!
//! S3Store — any S3-compatible bucket (AWS S3, Cloudflare R2, MinIO, ...)
//! through `aws-sdk-s3`. Slices are requested from the store with a `Range`
//! header and the response body is forwarded as it arrives.

use crate::{
    models::image::ImageObject,
    services::{
        range_resolver::ResolvedRange,
        store::{ByteStream, ObjectBody, ObjectStore, StoreError, StoreResult, validate_key},
    },
};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::{
    Client,
    error::{DisplayErrorContext, SdkError},
    primitives::DateTime as S3DateTime,
};
use chrono::{DateTime, Utc};
use tokio_util::io::ReaderStream;
use tracing::debug;

/// Connection settings for an S3-compatible bucket.
#[derive(Debug, Clone)]
pub struct S3Settings {
    pub bucket: String,
    /// Custom endpoint, e.g. `https://<account>.r2.cloudflarestorage.com`.
    pub endpoint: Option<String>,
    pub region: String,
}

#[derive(Clone, Debug)]
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    /// Build a client from the standard AWS credential chain and `settings`.
    pub async fn connect(settings: S3Settings) -> Self {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(settings.region));
        if let Some(endpoint) = settings.endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        let shared = loader.load().await;

        let client = Client::from_conf(
            aws_sdk_s3::config::Builder::from(&shared)
                .force_path_style(true)
                .build(),
        );

        Self {
            client,
            bucket: settings.bucket,
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    /// Pages through ListObjectsV2 and keeps the order the bucket returns.
    async fn list_objects(&self, prefix: Option<&str>) -> StoreResult<Vec<ImageObject>> {
        let mut objects = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let mut request = self.client.list_objects_v2().bucket(&self.bucket);
            if let Some(prefix) = prefix {
                request = request.prefix(prefix);
            }
            if let Some(token) = continuation.take() {
                request = request.continuation_token(token);
            }

            let page = request.send().await.map_err(unavailable)?;
            for object in page.contents() {
                let Some(key) = object.key() else { continue };
                if validate_key(key).is_err() {
                    debug!(key, "skipping key outside the flat namespace");
                    continue;
                }
                objects.push(ImageObject {
                    key: key.to_string(),
                    size: object.size().unwrap_or(0).max(0) as u64,
                    uploaded_at: to_utc(object.last_modified()),
                });
            }

            match page.next_continuation_token() {
                Some(token) if page.is_truncated().unwrap_or(false) => {
                    continuation = Some(token.to_string());
                }
                _ => break,
            }
        }

        debug!(bucket = %self.bucket, count = objects.len(), "listed bucket");
        Ok(objects)
    }

    /// One single-key page is enough to prove the bucket is reachable.
    async fn check_ready(&self) -> StoreResult<()> {
        self.client
            .list_objects_v2()
            .bucket(&self.bucket)
            .max_keys(1)
            .send()
            .await
            .map_err(unavailable)?;
        Ok(())
    }

    async fn get_object_metadata(&self, key: &str) -> StoreResult<ImageObject> {
        validate_key(key)?;
        let head = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| match err {
                SdkError::ServiceError(ctx) if ctx.err().is_not_found() => {
                    StoreError::NotFound(key.to_string())
                }
                other => unavailable(other),
            })?;

        Ok(ImageObject {
            key: key.to_string(),
            size: head.content_length().unwrap_or(0).max(0) as u64,
            uploaded_at: to_utc(head.last_modified()),
        })
    }

    async fn open_object_stream(
        &self,
        key: &str,
        range: Option<ResolvedRange>,
    ) -> StoreResult<ObjectBody> {
        validate_key(key)?;
        let mut request = self.client.get_object().bucket(&self.bucket).key(key);
        if let Some(range) = range {
            request = request.range(format!("bytes={}-{}", range.start, range.end));
        }

        let output = request.send().await.map_err(|err| match err {
            SdkError::ServiceError(ctx) if ctx.err().is_no_such_key() => {
                StoreError::NotFound(key.to_string())
            }
            other => unavailable(other),
        })?;

        let content_length = output.content_length().unwrap_or(0).max(0) as u64;
        let total_size = output
            .content_range()
            .and_then(total_from_content_range)
            .unwrap_or(content_length);

        let stream: ByteStream = Box::pin(ReaderStream::new(output.body.into_async_read()));
        Ok(ObjectBody { stream, total_size })
    }
}

fn unavailable<E, R>(err: SdkError<E, R>) -> StoreError
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    StoreError::Unavailable(DisplayErrorContext(&err).to_string())
}

fn to_utc(value: Option<&S3DateTime>) -> DateTime<Utc> {
    value
        .and_then(|dt| DateTime::from_timestamp(dt.secs(), dt.subsec_nanos()))
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Total size from a `bytes a-b/total` header; `*` totals yield `None`.
fn total_from_content_range(value: &str) -> Option<u64> {
    value.rsplit_once('/')?.1.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_total_from_content_range() {
        assert_eq!(total_from_content_range("bytes 0-99/1000"), Some(1000));
        assert_eq!(total_from_content_range("bytes 0-99/*"), None);
        assert_eq!(total_from_content_range("garbage"), None);
    }

    #[test]
    fn converts_store_timestamps() {
        let dt = S3DateTime::from_secs(1_700_000_000);
        assert_eq!(to_utc(Some(&dt)).timestamp(), 1_700_000_000);
        assert_eq!(to_utc(None), DateTime::<Utc>::UNIX_EPOCH);
    }
}

//! src/services/local_store.rs
//!
//! LocalStore — a flat directory of image files served as an object store.
//! Each regular file directly under `base_path` is one object, keyed by its
//! file name. Range reads seek and then stream a bounded slice, so no object
//! is ever read into memory whole.

use crate::{
    models::image::ImageObject,
    services::{
        range_resolver::ResolvedRange,
        store::{ByteStream, ObjectBody, ObjectStore, StoreError, StoreResult, validate_key},
    },
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::{
    io::{self, SeekFrom},
    path::PathBuf,
};
use tokio::{
    fs::{self, File},
    io::{AsyncReadExt, AsyncSeekExt},
};
use tokio_util::io::ReaderStream;
use tracing::debug;

#[derive(Clone, Debug)]
pub struct LocalStore {
    /// Directory holding the objects.
    pub base_path: PathBuf,
}

impl LocalStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Resolve a validated key to its file path.
    fn object_path(&self, key: &str) -> StoreResult<PathBuf> {
        validate_key(key)?;
        Ok(self.base_path.join(key))
    }

    async fn stat(&self, key: &str) -> StoreResult<ImageObject> {
        let path = self.object_path(key)?;
        let meta = fs::metadata(&path)
            .await
            .map_err(|err| map_io_error(key, err))?;
        if !meta.is_file() {
            return Err(StoreError::NotFound(key.to_string()));
        }
        Ok(ImageObject {
            key: key.to_string(),
            size: meta.len(),
            uploaded_at: modified_at(&meta),
        })
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    /// Lists regular, non-hidden files in lexicographic key order.
    async fn list_objects(&self, prefix: Option<&str>) -> StoreResult<Vec<ImageObject>> {
        let mut dir = fs::read_dir(&self.base_path).await.map_err(|err| {
            StoreError::Unavailable(format!(
                "cannot read {}: {}",
                self.base_path.display(),
                err
            ))
        })?;

        let mut objects = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            let Ok(key) = entry.file_name().into_string() else {
                debug!("skipping non UTF-8 file name {:?}", entry.file_name());
                continue;
            };
            if key.starts_with('.') || validate_key(&key).is_err() {
                continue;
            }
            if prefix.is_some_and(|p| !key.starts_with(p)) {
                continue;
            }
            // Follows symlinks; dangling links are skipped.
            let Ok(meta) = fs::metadata(entry.path()).await else {
                continue;
            };
            if !meta.is_file() {
                continue;
            }
            objects.push(ImageObject {
                size: meta.len(),
                uploaded_at: modified_at(&meta),
                key,
            });
        }

        objects.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(objects)
    }

    /// Only checks that the root directory can be opened.
    async fn check_ready(&self) -> StoreResult<()> {
        fs::read_dir(&self.base_path).await.map_err(|err| {
            StoreError::Unavailable(format!(
                "cannot read {}: {}",
                self.base_path.display(),
                err
            ))
        })?;
        Ok(())
    }

    async fn get_object_metadata(&self, key: &str) -> StoreResult<ImageObject> {
        self.stat(key).await
    }

    async fn open_object_stream(
        &self,
        key: &str,
        range: Option<ResolvedRange>,
    ) -> StoreResult<ObjectBody> {
        self.stat(key).await?;
        let path = self.object_path(key)?;
        let mut file = File::open(&path)
            .await
            .map_err(|err| map_io_error(key, err))?;
        // Size of the file actually opened, not of the earlier stat.
        let total_size = file.metadata().await?.len();

        let stream: ByteStream = match range {
            None => Box::pin(ReaderStream::new(file)),
            Some(range) => {
                file.seek(SeekFrom::Start(range.start)).await?;
                debug!(key, start = range.start, end = range.end, "opened file slice");
                Box::pin(ReaderStream::new(file.take(range.len())))
            }
        };

        Ok(ObjectBody { stream, total_size })
    }
}

fn map_io_error(key: &str, err: io::Error) -> StoreError {
    if err.kind() == io::ErrorKind::NotFound {
        StoreError::NotFound(key.to_string())
    } else {
        StoreError::Io(err)
    }
}

fn modified_at(meta: &std::fs::Metadata) -> DateTime<Utc> {
    meta.modified()
        .map(DateTime::<Utc>::from)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

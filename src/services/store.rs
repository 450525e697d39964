//! src/services/store.rs
//!
//! The `ObjectStore` contract every backing store satisfies, plus the key
//! validation applied before any lookup reaches a store.
//!
//! Stores are flat: a key names exactly one object and never addresses a
//! directory, parent, or nested path.

use crate::{models::image::ImageObject, services::range_resolver::ResolvedRange};
use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::{io, pin::Pin};
use thiserror::Error;

/// Lazily produced object body. Dropping it abandons the underlying read.
pub type ByteStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send>>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object `{0}` not found")]
    NotFound(String),
    #[error("invalid object key")]
    InvalidKey,
    #[error("object store unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// An opened object body together with the size of the whole object.
pub struct ObjectBody {
    pub stream: ByteStream,
    pub total_size: u64,
}

/// Backing storage for disk images.
///
/// Implementations must be safe to call concurrently; every call is
/// independent and no ordering between calls is assumed.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List objects, optionally restricted to keys starting with `prefix`.
    ///
    /// An empty store yields an empty vector, not an error.
    async fn list_objects(&self, prefix: Option<&str>) -> StoreResult<Vec<ImageObject>>;

    /// Cheap reachability check behind `/readyz`.
    ///
    /// Defaults to a full listing; stores where that is expensive override it.
    async fn check_ready(&self) -> StoreResult<()> {
        self.list_objects(None).await.map(|_| ())
    }

    /// Fetch metadata for a single object.
    async fn get_object_metadata(&self, key: &str) -> StoreResult<ImageObject>;

    /// Open the object body, either whole or restricted to `range`
    /// (inclusive on both ends).
    async fn open_object_stream(
        &self,
        key: &str,
        range: Option<ResolvedRange>,
    ) -> StoreResult<ObjectBody>;
}

const MAX_OBJECT_KEY_LEN: usize = 1024;

/// Reject keys that could escape the flat key namespace.
///
/// Separators, navigation segments, and control bytes are refused outright
/// rather than normalized.
pub fn validate_key(key: &str) -> StoreResult<()> {
    if key.is_empty() || key.len() > MAX_OBJECT_KEY_LEN {
        return Err(StoreError::InvalidKey);
    }
    if key == "." || key == ".." {
        return Err(StoreError::InvalidKey);
    }
    if key
        .bytes()
        .any(|b| b.is_ascii_control() || b == b'/' || b == b'\\')
    {
        return Err(StoreError::InvalidKey);
    }
    Ok(())
}

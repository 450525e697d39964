//! Represents an object (disk image) as reported by the backing store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of a single stored object.
///
/// The struct carries metadata only, never the content bytes. Each listing
/// call produces fresh values; nothing here is cached between requests.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ImageObject {
    /// Object key (flat, path-like identifier within the store).
    pub key: String,

    /// Size in bytes.
    pub size: u64,

    /// When the object was uploaded or last written.
    pub uploaded_at: DateTime<Utc>,
}

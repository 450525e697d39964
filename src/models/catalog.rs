//! Client-facing catalog descriptor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One bootable image as returned by `GET /api/isos`.
///
/// Serialized as `{ id, name, fileName, size, modified }`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    /// Stable token derived from the key (non-alphanumerics replaced by `_`).
    pub id: String,

    /// Human-readable display name.
    pub name: String,

    /// The original store key, used to address `/api/iso/{fileName}`.
    pub file_name: String,

    /// Size in bytes.
    pub size: u64,

    /// Upload timestamp of the underlying object.
    pub modified: DateTime<Utc>,
}

//! Resolution of `Range: bytes=<start>-[<end>]` headers against an object size.
//!
//! Only a single explicit-start range is accepted. Suffix ranges
//! (`bytes=-500`) and multi-range requests are rejected instead of being
//! partially honored, so callers answer them with 416.

use thiserror::Error;
use tracing::debug;

/// Inclusive byte range, always within `0..total_size` once resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRange {
    pub start: u64,
    pub end: u64,
}

impl ResolvedRange {
    /// Number of bytes covered by the range.
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// `Content-Range` value for a 206 response.
    pub fn content_range(&self, total_size: u64) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, total_size)
    }
}

/// Outcome of a successful resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeResolution {
    /// No range requested; serve the whole object.
    Full,
    /// Serve exactly this slice.
    Partial(ResolvedRange),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RangeError {
    #[error("range header is not of the form bytes=<start>-[<end>]")]
    Malformed,
    #[error("multiple ranges are not supported")]
    MultipleRanges,
    #[error("range {start}-{end:?} cannot be satisfied for {total_size} bytes")]
    Unsatisfiable {
        start: u64,
        end: Option<u64>,
        total_size: u64,
    },
}

/// Resolve an optional `Range` header value against `total_size`.
///
/// An omitted end defaults to the last byte; an end past the object is
/// clamped. A start past the object, a start after the end, or any range
/// against an empty object is unsatisfiable.
pub fn resolve_range(
    header: Option<&str>,
    total_size: u64,
) -> Result<RangeResolution, RangeError> {
    let Some(raw) = header else {
        return Ok(RangeResolution::Full);
    };

    let spec = raw
        .trim()
        .strip_prefix("bytes=")
        .ok_or(RangeError::Malformed)?;
    if spec.contains(',') {
        return Err(RangeError::MultipleRanges);
    }

    let (start_str, end_str) = spec.split_once('-').ok_or(RangeError::Malformed)?;
    let start = parse_position(start_str.trim())?.ok_or(RangeError::Malformed)?;
    let end = parse_position(end_str.trim())?;

    let unsatisfiable = RangeError::Unsatisfiable {
        start,
        end,
        total_size,
    };
    if total_size == 0 || start >= total_size {
        return Err(unsatisfiable);
    }

    let last = total_size - 1;
    let end = end.unwrap_or(last);
    if start > end {
        return Err(unsatisfiable);
    }

    let resolved = ResolvedRange {
        start,
        end: end.min(last),
    };
    debug!(?resolved, total_size, "resolved range {}", raw);
    Ok(RangeResolution::Partial(resolved))
}

/// Parse one side of a range. Empty means "absent"; anything other than
/// plain ASCII digits that fit in a u64 is malformed.
fn parse_position(value: &str) -> Result<Option<u64>, RangeError> {
    if value.is_empty() {
        return Ok(None);
    }
    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RangeError::Malformed);
    }
    value.parse::<u64>().map(Some).map_err(|_| RangeError::Malformed)
}

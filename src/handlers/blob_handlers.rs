//! HTTP handlers for `/api/iso/{*file_name}`.
//! Streams image bodies (whole or a single byte range) straight from the
//! store to the client without buffering, and decides status and headers
//! before the first body byte is produced.

use crate::{
    errors::AppError,
    models::image::ImageObject,
    services::{
        range_resolver::{RangeResolution, ResolvedRange, resolve_range},
        store::{ObjectStore, StoreError, validate_key},
    },
    state::AppState,
};
use axum::{
    body::Body,
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::Response,
};
use futures::TryStreamExt;
use tracing::{debug, error, warn};

/// GET `/api/iso/{*file_name}` — stream the image, honoring `Range`.
pub async fn get_iso(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    serve_blob(
        state.store.as_ref(),
        &file_name,
        range_header(&headers),
        true,
    )
    .await
}

/// HEAD `/api/iso/{*file_name}` — same status and headers as GET, no body.
pub async fn head_iso(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    serve_blob(
        state.store.as_ref(),
        &file_name,
        range_header(&headers),
        false,
    )
    .await
}

/// Build the response for one blob request.
///
/// - no range: 200 with the whole object
/// - satisfiable range: 206 with exactly `[start, end]`
/// - unsatisfiable or malformed range: 416 with `Content-Range: bytes */size`
/// - unknown or unsafe key: 404
/// - object size changed between the metadata lookup and the open: 500
///
/// The store is only asked for a body when `include_body` is set.
pub async fn serve_blob(
    store: &dyn ObjectStore,
    key: &str,
    range: Option<&str>,
    include_body: bool,
) -> Result<Response, AppError> {
    validate_key(key).map_err(|err| blob_error(key, err))?;

    let object = store
        .get_object_metadata(key)
        .await
        .map_err(|err| blob_error(key, err))?;

    let resolution = resolve_range(range, object.size).map_err(|err| {
        warn!(key, size = object.size, "rejecting range {:?}: {}", range, err);
        AppError::range_not_satisfiable(object.size)
    })?;

    let (status, slice) = match resolution {
        RangeResolution::Full => (StatusCode::OK, None),
        RangeResolution::Partial(range) => (StatusCode::PARTIAL_CONTENT, Some(range)),
    };
    debug!(key, ?slice, include_body, "serving blob");

    let body = if include_body {
        let opened = store
            .open_object_stream(key, slice)
            .await
            .map_err(|err| blob_error(key, err))?;
        // Headers are built from the metadata size; an object replaced
        // between the two calls would make them lie about the body.
        if opened.total_size != object.size {
            error!(
                key,
                expected = object.size,
                actual = opened.total_size,
                "object size changed while opening"
            );
            return Err(AppError::internal("Failed to fetch ISO"));
        }
        let owned_key = key.to_string();
        Body::from_stream(opened.stream.inspect_err(move |err| {
            error!(key = %owned_key, "blob stream aborted: {}", err);
        }))
    } else {
        Body::empty()
    };

    let mut response = Response::new(body);
    *response.status_mut() = status;
    set_blob_headers(response.headers_mut(), &object, slice);

    Ok(response)
}

fn range_header(headers: &HeaderMap) -> Option<&str> {
    // A header that is not visible ASCII is treated as malformed, not absent.
    headers
        .get(header::RANGE)
        .map(|value| value.to_str().unwrap_or_default())
}

fn blob_error(key: &str, err: StoreError) -> AppError {
    match err {
        StoreError::NotFound(_) => AppError::not_found("ISO not found"),
        StoreError::InvalidKey => {
            warn!(key, "rejected object key");
            AppError::not_found("ISO not found")
        }
        other => {
            error!(key, "blob request failed: {}", other);
            AppError::internal("Failed to fetch ISO")
        }
    }
}

fn set_blob_headers(headers: &mut HeaderMap, object: &ImageObject, slice: Option<ResolvedRange>) {
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));

    let length = slice.map_or(object.size, |range| range.len());
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));

    if let Some(range) = slice {
        if let Ok(value) = HeaderValue::from_str(&range.content_range(object.size)) {
            headers.insert(header::CONTENT_RANGE, value);
        }
    }

    let last_modified = object
        .uploaded_at
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string();
    if let Ok(value) = HeaderValue::from_str(&last_modified) {
        headers.insert(header::LAST_MODIFIED, value);
    }
}

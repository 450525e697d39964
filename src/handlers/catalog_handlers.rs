//! `GET /api/isos` — the image catalog.

use crate::{
    errors::AppError, models::catalog::CatalogEntry, services::catalog::build_catalog,
    state::AppState,
};
use axum::{Json, extract::State};
use tracing::error;

/// List every `.iso` object in the store as a JSON array.
///
/// Store failures become a generic 500; the cause is only logged.
pub async fn list_isos(
    State(state): State<AppState>,
) -> Result<Json<Vec<CatalogEntry>>, AppError> {
    let entries = build_catalog(state.store.as_ref()).await.map_err(|err| {
        error!("catalog listing failed: {}", err);
        AppError::internal("Failed to fetch ISO list")
    })?;
    Ok(Json(entries))
}

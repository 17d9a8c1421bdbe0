//! Artifact retrieval handler.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;

use intens_models::ImageId;
use intens_storage::StorageError;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Serve a finished artifact by identifier, with or without the
/// conventional `.gif` suffix.
pub async fn get_image(
    State(state): State<AppState>,
    Path(ident): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let ident = ident.strip_suffix(".gif").unwrap_or(&ident);
    // Identifier validation doubles as path-traversal defense; anything
    // outside the id alphabet is indistinguishable from a missing image.
    let id = ImageId::parse(ident).map_err(|_| ApiError::not_found("no such image"))?;

    let bytes = state.store.read_artifact(&id).await.map_err(|e| match e {
        StorageError::NotFound(_) => ApiError::not_found("no such image"),
        other => other.into(),
    })?;

    Ok(([(header::CONTENT_TYPE, "image/gif")], bytes))
}

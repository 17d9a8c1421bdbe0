//! Upload handler: multipart intake and pipeline invocation.

use axum::extract::{Multipart, State};
use axum::Json;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::info;

use intens_media::{intensify, IntensifyOptions};
use intens_models::ImageId;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Multipart field the client posts its file under.
const FILE_FIELD: &str = "files[]";

/// Upload response.
#[derive(Serialize)]
pub struct UploadResponse {
    /// Path the finished artifact can be fetched from.
    pub result: String,
}

/// Accept one image upload, intensify it, and return the artifact URL.
///
/// The whole pipeline runs inside the request: one upload is one
/// sequential normalize→compose→encode invocation, and any failure is
/// reported synchronously with no artifact left behind.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let mut file: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(FILE_FIELD) {
            let original_name = field
                .file_name()
                .unwrap_or("upload")
                .to_string();
            let bytes = field.bytes().await?;
            file = Some((original_name, bytes.to_vec()));
            break;
        }
    }
    let (original_name, bytes) =
        file.ok_or_else(|| ApiError::bad_request(format!("missing {FILE_FIELD} field")))?;
    if bytes.is_empty() {
        return Err(ApiError::bad_request("empty upload"));
    }

    let id = ImageId::generate();
    state.store.save_upload(&id, &original_name, &bytes).await?;

    // Encode into a scratch location first; the artifact only appears at
    // its served path once the pipeline has fully succeeded.
    let staging = tempfile::Builder::new()
        .prefix("intens-out")
        .tempdir()
        .map_err(|e| ApiError::internal(format!("cannot create staging dir: {e}")))?;
    let staged = staging.path().join("out.gif");

    let mut rng = StdRng::from_os_rng();
    intensify(
        state.backend.as_ref(),
        &bytes,
        &staged,
        &IntensifyOptions::default(),
        &mut rng,
    )
    .await?;

    state.store.publish_artifact(&staged, &id).await?;

    info!(id = %id, original_name = %original_name, "upload intensified");
    Ok(Json(UploadResponse {
        result: format!("/i/{id}.gif"),
    }))
}

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};

use crate::error::ApiError;
use crate::state::AppState;

/// Serves a generated certificate as an attachment. Only names made of the
/// characters the generator emits are accepted, which also rules out path
/// traversal.
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    if !valid_download_name(&filename) {
        return Err(ApiError::NotFound);
    }

    let path = state.config.certificates_folder.join(&filename);
    let content = tokio::fs::read(&path).await.map_err(|_| ApiError::NotFound)?;

    let mime = mime_guess::from_path(&filename)
        .first_raw()
        .unwrap_or("application/octet-stream");

    Ok(Response::builder()
        .header("Content-Type", mime)
        .header(
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", filename),
        )
        .body(Body::from(content))
        .unwrap()
        .into_response())
}

fn valid_download_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains("..")
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

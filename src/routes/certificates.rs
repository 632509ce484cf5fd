use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use serde_json::json;

use crate::certificate::{collect_copyrights, CertificateRequest, Kind};
use crate::error::ApiError;
use crate::pdf;
use crate::state::AppState;
use crate::storage;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CertificateResponse {
    download_url: String,
}

/// Accepts a multipart certificate request, stores the uploaded preview and
/// renders the document on the blocking pool.
pub async fn generate_certificate(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let kind = Kind::from_segment(&kind).ok_or(ApiError::UnknownKind(kind))?;
    let origin = request_origin(&state, &headers);

    let mut preview: Option<PathBuf> = None;
    let mut fields: HashMap<String, String> = HashMap::new();
    let mut copyright_values: Vec<String> = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        if name == "preview_image" {
            let original = field.file_name().unwrap_or("upload.png").to_string();
            let data = field.bytes().await?;
            if data.is_empty() {
                continue;
            }
            let upload_path = state
                .config
                .upload_folder
                .join(storage::upload_file_name(&original));
            tokio::fs::write(&upload_path, &data).await?;
            preview = Some(upload_path);
        } else if name == "copyrights" || name == "copyrights[]" {
            copyright_values.push(field.text().await?);
        } else {
            fields.insert(name, field.text().await?);
        }
    }

    let request = CertificateRequest {
        kind,
        preview_image: preview,
        fields,
        copyrights: collect_copyrights(copyright_values.iter().map(String::as_str)),
        origin,
    };

    let config = state.config.clone();
    let generated = tokio::task::spawn_blocking(move || pdf::render(&request, &config)).await??;

    Ok(Json(CertificateResponse {
        download_url: generated.download_url,
    }))
}

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Origin the download URL and QR payload are minted from: the configured
/// base URL when set, otherwise the request's Host header.
fn request_origin(state: &AppState, headers: &HeaderMap) -> String {
    if let Some(base) = &state.config.public_base_url {
        return base.trim_end_matches('/').to_string();
    }
    let host = headers
        .get(axum::http::header::HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("localhost");
    format!("http://{}", host)
}

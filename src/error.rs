use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Failures a render operation can surface. Missing background or logo
/// assets are absorbed inside the renderer (logged, element left blank) and
/// never reach this type.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no preview image was uploaded")]
    MissingImage,
    #[error("missing required field: {0}")]
    MissingField(String),
    #[error("preview image could not be processed: {0}")]
    InvalidImage(#[from] image::ImageError),
    #[error("qr encoding failed: {0}")]
    Qr(qrcode::types::QrError),
    #[error("failed to assemble certificate document: {0}")]
    Document(#[from] lopdf::Error),
    #[error("failed to write certificate file: {0}")]
    Write(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("failed to store uploaded file: {0}")]
    Upload(#[from] std::io::Error),
    #[error("invalid multipart payload: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),
    #[error("render task was cancelled: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("unknown certificate kind: {0}")]
    UnknownKind(String),
    #[error("File not found")]
    NotFound,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound => {
                (StatusCode::NOT_FOUND, "File not found").into_response()
            }
            ApiError::UnknownKind(kind) => {
                tracing::warn!("Rejected request for unknown certificate kind: {}", kind);
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({
                        "message": "An error occurred",
                        "error": format!("unknown certificate kind: {}", kind),
                    })),
                )
                    .into_response()
            }
            other => {
                tracing::error!("Certificate request failed: {}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "message": "An error occurred",
                        "error": other.to_string(),
                    })),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_errors_describe_their_cause() {
        assert_eq!(
            RenderError::MissingImage.to_string(),
            "no preview image was uploaded"
        );
        assert_eq!(
            RenderError::MissingField("tokenId".to_string()).to_string(),
            "missing required field: tokenId"
        );
    }

    #[test]
    fn missing_image_maps_to_server_error() {
        let response = ApiError::Render(RenderError::MissingImage).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn not_found_maps_to_404() {
        let response = ApiError::NotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn unknown_kind_maps_to_404() {
        let response = ApiError::UnknownKind("diploma".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::resume::data_uri::DataUriError;
use crate::resume::extraction::ExtractionError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<DataUriError> for AppError {
    fn from(e: DataUriError) -> Self {
        AppError::Validation(format!("resumeDataUri is invalid: {e}"))
    }
}

impl From<ExtractionError> for AppError {
    fn from(e: ExtractionError) -> Self {
        match e {
            ExtractionError::UnsupportedType(mime) => AppError::UnsupportedMediaType(format!(
                "'{mime}' is not an accepted resume type (PDF, DOC, DOCX or TXT)"
            )),
            ExtractionError::Payload(e) => e.into(),
            other => AppError::Extraction(other.to_string()),
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(e: MultipartError) -> Self {
        match e.status() {
            StatusCode::PAYLOAD_TOO_LARGE => AppError::PayloadTooLarge(e.body_text()),
            _ => AppError::Validation(format!("Malformed upload: {}", e.body_text())),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UnsupportedMediaType(msg) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "UNSUPPORTED_MEDIA_TYPE",
                msg.clone(),
            ),
            AppError::PayloadTooLarge(msg) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                msg.clone(),
            ),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::Extraction(msg) => {
                tracing::error!("Extraction error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "EXTRACTION_ERROR",
                    "Failed to extract data from resume. Please try again or fill manually."
                        .to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (
                AppError::UnsupportedMediaType("x".into()),
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ),
            (
                AppError::PayloadTooLarge("x".into()),
                StatusCode::PAYLOAD_TOO_LARGE,
            ),
            (AppError::Conflict("x".into()), StatusCode::CONFLICT),
            (AppError::Extraction("x".into()), StatusCode::BAD_GATEWAY),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_data_uri_error_maps_to_validation() {
        let err: AppError = DataUriError::MissingPrefix.into();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_extraction_errors_map_by_cause() {
        let err: AppError = ExtractionError::UnsupportedType("image/png".into()).into();
        assert!(matches!(err, AppError::UnsupportedMediaType(m) if m.contains("image/png")));

        let err: AppError = ExtractionError::Payload(DataUriError::NotBase64).into();
        assert!(matches!(err, AppError::Validation(_)));

        let err: AppError = ExtractionError::PdfText("no extractable text".into()).into();
        assert!(matches!(err, AppError::Extraction(_)));
    }
}

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::Html,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::ResumeDocument;
use crate::resume::data_uri::{detect_mime_type, ResumeDataUri, ACCEPTED_MIME_TYPES};
use crate::resume::extraction::extract_document;
use crate::resume::preview::{render_printable_html, ResumePreview};
use crate::resume::session::{run_extraction, ExtractionReport, Notification, SessionSnapshot};
use crate::resume::validation::{validate_document, ValidationReport};
use crate::state::AppState;

/// Multipart field carrying the resume file.
pub const RESUME_FIELD: &str = "resume";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataUriRequest {
    /// Parsed by hand so a malformed URI gets our 400 body, not a JSON rejection.
    pub resume_data_uri: String,
}

#[derive(Serialize)]
pub struct DocumentUpdateResponse {
    pub snapshot: SessionSnapshot,
    pub validation: ValidationReport,
}

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionSnapshot>) {
    (StatusCode::CREATED, Json(state.sessions.create().await))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    Ok(Json(state.sessions.snapshot(id).await?))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/sessions/:id/document
///
/// The document is stored even when validation fails; the report tells the form
/// what still needs attention.
pub async fn handle_replace_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(document): Json<ResumeDocument>,
) -> Result<Json<DocumentUpdateResponse>, AppError> {
    let validation = validate_document(&document);
    let snapshot = state.sessions.replace_document(id, document).await?;
    Ok(Json(DocumentUpdateResponse {
        snapshot,
        validation,
    }))
}

/// POST /api/v1/sessions/:id/reset
pub async fn handle_reset_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    Ok(Json(state.sessions.reset(id).await?))
}

/// POST /api/v1/sessions/:id/extract
pub async fn handle_extract_upload(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<ExtractionReport>, AppError> {
    let resume = read_resume_field(&mut multipart, state.config.max_upload_bytes).await?;
    info!("Resume upload for session {id} ({})", resume.mime_type());
    let report = run_extraction(&state.sessions, state.extractor.clone(), id, resume).await?;
    Ok(Json(report))
}

/// POST /api/v1/sessions/:id/extract/data-uri
pub async fn handle_extract_data_uri(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<DataUriRequest>,
) -> Result<Json<ExtractionReport>, AppError> {
    let resume = parse_resume_data_uri(&req.resume_data_uri, state.config.max_upload_bytes)?;
    let report = run_extraction(&state.sessions, state.extractor.clone(), id, resume).await?;
    Ok(Json(report))
}

/// GET /api/v1/sessions/:id/preview
pub async fn handle_preview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ResumePreview>, AppError> {
    let document = state.sessions.document(id).await?;
    Ok(Json(ResumePreview::from_document(&document)))
}

/// GET /api/v1/sessions/:id/preview/print
pub async fn handle_preview_print(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, AppError> {
    let document = state.sessions.document(id).await?;
    let html = render_printable_html(&ResumePreview::from_document(&document))
        .map_err(|e| AppError::Internal(e.into()))?;
    Ok(Html(html))
}

/// GET /api/v1/sessions/:id/notifications
pub async fn handle_drain_notifications(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Notification>>, AppError> {
    Ok(Json(state.sessions.drain_notifications(id).await?))
}

/// POST /api/v1/extract
pub async fn handle_extract_stateless(
    State(state): State<AppState>,
    Json(req): Json<DataUriRequest>,
) -> Result<Json<ResumeDocument>, AppError> {
    let resume = parse_resume_data_uri(&req.resume_data_uri, state.config.max_upload_bytes)?;
    let document = extract_document(state.extractor.as_ref(), &resume).await?;
    Ok(Json(document))
}

/// POST /api/v1/validate
pub async fn handle_validate(Json(document): Json<ResumeDocument>) -> Json<ValidationReport> {
    Json(validate_document(&document))
}

async fn read_resume_field(
    multipart: &mut Multipart,
    max_bytes: usize,
) -> Result<ResumeDataUri, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(RESUME_FIELD) {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;
        return upload_to_data_uri(
            content_type.as_deref(),
            file_name.as_deref(),
            &bytes,
            max_bytes,
        );
    }
    Err(AppError::Validation(format!(
        "Missing '{RESUME_FIELD}' file field"
    )))
}

fn upload_to_data_uri(
    content_type: Option<&str>,
    file_name: Option<&str>,
    bytes: &[u8],
    max_bytes: usize,
) -> Result<ResumeDataUri, AppError> {
    let mime_type = detect_mime_type(content_type, file_name)
        .filter(|m| ACCEPTED_MIME_TYPES.contains(&m.as_str()))
        .ok_or_else(|| {
            AppError::UnsupportedMediaType(format!(
                "'{}' is not an accepted resume type (PDF, DOC, DOCX or TXT)",
                file_name.or(content_type).unwrap_or("upload")
            ))
        })?;
    check_size(bytes.len(), max_bytes)?;
    Ok(ResumeDataUri::from_bytes(&mime_type, bytes))
}

fn parse_resume_data_uri(raw: &str, max_bytes: usize) -> Result<ResumeDataUri, AppError> {
    let resume: ResumeDataUri = raw.parse()?;
    if !resume.is_accepted_type() {
        return Err(AppError::UnsupportedMediaType(format!(
            "'{}' is not an accepted resume type (PDF, DOC, DOCX or TXT)",
            resume.mime_type()
        )));
    }
    check_size(resume.decode()?.len(), max_bytes)?;
    Ok(resume)
}

fn check_size(len: usize, max_bytes: usize) -> Result<(), AppError> {
    if len == 0 {
        return Err(AppError::Validation("Resume file is empty".to_string()));
    }
    if len > max_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "Resume file is {len} bytes; the limit is {max_bytes}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resume::data_uri::{DOCX, PDF};

    #[test]
    fn test_upload_type_comes_from_extension_when_declared_type_is_generic() {
        let uri = upload_to_data_uri(
            Some("application/octet-stream"),
            Some("resume.docx"),
            b"PK\x03\x04",
            1024,
        )
        .unwrap();
        assert_eq!(uri.mime_type(), DOCX);
    }

    #[test]
    fn test_upload_rejections() {
        let err = upload_to_data_uri(Some("image/png"), Some("me.png"), b"x", 1024).unwrap_err();
        assert!(matches!(err, AppError::UnsupportedMediaType(_)));

        let err = upload_to_data_uri(Some(PDF), None, b"", 1024).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = upload_to_data_uri(Some(PDF), None, &[0u8; 11], 10).unwrap_err();
        assert!(matches!(err, AppError::PayloadTooLarge(_)));
    }

    #[test]
    fn test_parse_resume_data_uri() {
        let uri = parse_resume_data_uri("data:application/pdf;base64,JVBERi0=", 1024).unwrap();
        assert_eq!(uri.mime_type(), PDF);

        assert!(matches!(
            parse_resume_data_uri("not a uri", 1024),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            parse_resume_data_uri("data:image/png;base64,aGk=", 1024),
            Err(AppError::UnsupportedMediaType(_))
        ));
        assert!(matches!(
            parse_resume_data_uri("data:text/plain;base64,", 1024),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            parse_resume_data_uri("data:text/plain;base64,aGVsbG8=", 4),
            Err(AppError::PayloadTooLarge(_))
        ));
    }
}

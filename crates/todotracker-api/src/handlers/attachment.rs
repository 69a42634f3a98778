//! Attachment upload, download, and delete handlers.

use axum::Json;
use axum::body::Body;
use axum::extract::{Multipart, Path, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use bytes::Bytes;
use uuid::Uuid;

use todotracker_core::error::AppError;
use todotracker_entity::attachment::Attachment;

use crate::dto::response::ApiResponse;
use crate::state::AppState;

/// POST /api/todos/{id}/attachments — multipart upload
pub async fn upload_attachment(
    State(state): State<AppState>,
    Path(todo_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<Attachment>>), AppError> {
    let mut file_name: Option<String> = None;
    let mut mime_type: Option<String> = None;
    let mut data: Option<Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?
    {
        if field.name() == Some("file") {
            file_name = field.file_name().map(String::from);
            mime_type = field.content_type().map(String::from);
            data = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| AppError::validation(format!("Read error: {e}")))?,
            );
        }
    }

    let file_name = file_name.ok_or_else(|| AppError::validation("Filename is required"))?;
    let data = data.ok_or_else(|| AppError::validation("File data is required"))?;

    let attachment = state
        .attachment_service
        .save(todo_id, &file_name, mime_type.as_deref(), data)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(attachment))))
}

/// GET /api/attachments/{id} — binary download
pub async fn download_attachment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let (attachment, data) = state.attachment_service.get(id).await?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, attachment.mime_type)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition(&attachment.original_name),
        )
        .header(header::CONTENT_LENGTH, data.len())
        .body(Body::from(data))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")))?;

    Ok(response)
}

/// DELETE /api/attachments/{id}
pub async fn delete_attachment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.attachment_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `Content-Disposition` with both the quoted ASCII fallback and the
/// RFC 5987 UTF-8 `filename*` form for non-ASCII names.
fn content_disposition(original_name: &str) -> String {
    let fallback: String = original_name
        .chars()
        .map(|c| {
            if c.is_ascii() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!(
        "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
        percent_encode(original_name)
    )
}

/// Percent-encode everything outside RFC 5987 `attr-char`.
fn percent_encode(value: &str) -> String {
    const ATTR_CHARS: &[u8] = b"!#$&+-.^_`|~";
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        if byte.is_ascii_alphanumeric() || ATTR_CHARS.contains(&byte) {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_name_is_passed_through() {
        assert_eq!(
            content_disposition("report.pdf"),
            "attachment; filename=\"report.pdf\"; filename*=UTF-8''report.pdf"
        );
    }

    #[test]
    fn test_utf8_name_is_percent_encoded() {
        let header = content_disposition("bericht-übersicht.pdf");
        assert!(header.contains("filename=\"bericht-_bersicht.pdf\""));
        assert!(header.contains("filename*=UTF-8''bericht-%C3%BCbersicht.pdf"));
    }

    #[test]
    fn test_quotes_are_escaped_out_of_fallback() {
        let header = content_disposition("a\"b.txt");
        assert!(header.contains("filename=\"a_b.txt\""));
    }

    #[test]
    fn test_percent_encode_space() {
        assert_eq!(percent_encode("a b"), "a%20b");
    }
}

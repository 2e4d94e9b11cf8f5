//! File handlers for the Roomdrop service.
//!
//! Implements the file transfer endpoints:
//!
//! - `POST /api/v1/rooms/{id}/files` - Upload one or more files (authenticated)
//! - `GET /api/v1/files/{locator}` - Download a stored file by locator (public)
//!
//! Uploads are multipart; every part carrying a filename is stored as a blob
//! and recorded in the room's ledger. Uploads into an expired room are still
//! accepted so in-flight transfers can drain, only unknown rooms are rejected.
//!
//! Downloads stream straight from the blob store without buffering the whole
//! file in memory.

use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::{header, Response, StatusCode},
    Extension, Json,
};
use roomdrop_core::types::RoomId;
use std::sync::Arc;
use tokio_util::io::ReaderStream;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::ApiError;
use crate::middleware::CurrentUser;
use crate::models::MessageResponse;
use crate::observability::metrics;
use crate::routes::AppState;

/// Content type assigned to multipart file parts that declare none.
const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

// ============================================================================
// Handler: POST /api/v1/rooms/{id}/files
// ============================================================================

/// Handler for POST /api/v1/rooms/{id}/files
///
/// Store every file part of the multipart body and append a ledger entry for
/// each. Parts without a filename (plain form fields) are skipped.
///
/// # Response
///
/// - 201 Created: All files stored and recorded
/// - 400 Bad Request: Malformed multipart body, or no file parts at all
/// - 404 Not Found: Unknown room id
#[instrument(
    skip_all,
    name = "rd.files.upload",
    fields(method = "POST", endpoint = "/api/v1/rooms/{id}/files")
)]
pub async fn upload_files(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(room_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let room_id = RoomId(room_id);

    // Reject unknown rooms before any blob hits the disk
    let room = state.registry.get(room_id).await?;

    let mut stored: u64 = 0;
    let mut total_bytes: u64 = 0;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                tracing::debug!(
                    target: "rd.handlers.files",
                    error = %e,
                    "Invalid multipart body"
                );
                metrics::record_upload("rejected", 0, 0);
                return Err(ApiError::BadRequest("Invalid multipart body".to_string()));
            }
        };

        // Only parts with a filename are file uploads
        let Some(file_name) = field.file_name().map(ToString::to_string) else {
            continue;
        };
        let mime_type = field
            .content_type()
            .unwrap_or(DEFAULT_MIME_TYPE)
            .to_string();

        let bytes = field.bytes().await.map_err(|e| {
            tracing::debug!(
                target: "rd.handlers.files",
                file_name = %file_name,
                error = %e,
                "Failed to read file part"
            );
            ApiError::BadRequest("Failed to read uploaded file".to_string())
        })?;
        let size_bytes = bytes.len() as u64;

        let locator = state.blobs.put(&file_name, &bytes).await?;
        state
            .ledger
            .record(
                room.id,
                user.id,
                &file_name,
                size_bytes,
                &mime_type,
                &locator,
            )
            .await?;

        stored += 1;
        total_bytes += size_bytes;
    }

    if stored == 0 {
        metrics::record_upload("rejected", 0, 0);
        return Err(ApiError::BadRequest("No files uploaded".to_string()));
    }

    metrics::record_upload("accepted", stored, total_bytes);
    info!(
        target: "rd.handlers.files",
        room_id = %room.id,
        sender_id = %user.id,
        files = stored,
        total_bytes,
        "Files uploaded"
    );

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Files uploaded successfully")),
    ))
}

// ============================================================================
// Handler: GET /api/v1/files/{locator}
// ============================================================================

/// Handler for GET /api/v1/files/{locator}
///
/// Stream a stored file back as an attachment. Locators are opaque values
/// minted at upload time; this endpoint is unauthenticated so share links
/// work without a session.
///
/// # Response
///
/// - 200 OK: File content
/// - 404 Not Found: Unknown locator
#[instrument(
    skip_all,
    name = "rd.files.download",
    fields(method = "GET", endpoint = "/api/v1/files/{locator}")
)]
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path(locator): Path<String>,
) -> Result<Response<Body>, ApiError> {
    let content = state.blobs.open(&locator).await?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, DEFAULT_MIME_TYPE)
        .header(header::CONTENT_LENGTH, content.size_bytes)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", locator),
        )
        .body(Body::from_stream(ReaderStream::new(content.reader)))
        .map_err(|e| ApiError::Storage(format!("Failed to build download response: {}", e)))
}

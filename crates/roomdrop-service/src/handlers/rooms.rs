//! Room handlers for the Roomdrop service.
//!
//! Implements the room lifecycle endpoints:
//!
//! - `POST /api/v1/rooms` - Create a room (authenticated)
//! - `POST /api/v1/rooms/join` - Join a room by code and password (authenticated)
//! - `GET /api/v1/rooms/{id}` - Room details with files and participants (authenticated)
//!
//! # Security
//!
//! - The host and joiner are always the authenticated caller; request bodies
//!   never carry user ids
//! - Join failures collapse to one 404 whether the code or the password was
//!   wrong, so the endpoint cannot be used to probe for valid codes

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use roomdrop_core::error::CoreError;
use roomdrop_core::types::RoomId;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::ApiError;
use crate::middleware::CurrentUser;
use crate::models::{
    FileResponse, JoinRoomRequest, RoomDetailResponse, RoomResponse, UserResponse,
};
use crate::observability::metrics;
use crate::routes::AppState;

// ============================================================================
// Handler: POST /api/v1/rooms
// ============================================================================

/// Handler for POST /api/v1/rooms
///
/// Create a room hosted by the authenticated caller. The response carries the
/// share code and password the host hands to invitees, plus the fixed expiry
/// deadline.
///
/// # Response
///
/// - 201 Created: The new room
/// - 401 Unauthorized: Missing or invalid token (from the middleware)
#[instrument(
    skip_all,
    name = "rd.rooms.create",
    fields(method = "POST", endpoint = "/api/v1/rooms")
)]
pub async fn create_room(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<(StatusCode, Json<RoomResponse>), ApiError> {
    let room = state.registry.create(user.id).await?;

    metrics::record_room_created();
    info!(
        target: "rd.handlers.rooms",
        room_id = %room.id,
        host_id = %user.id,
        "Room created"
    );

    Ok((
        StatusCode::CREATED,
        Json(RoomResponse::from_room(&room, Utc::now())),
    ))
}

// ============================================================================
// Handler: POST /api/v1/rooms/join
// ============================================================================

/// Handler for POST /api/v1/rooms/join
///
/// Join an active room by exact code and password match. Joining a room the
/// caller already belongs to succeeds without duplicating membership.
///
/// # Response
///
/// - 200 OK: The joined room
/// - 400 Bad Request: Malformed body or missing fields
/// - 404 Not Found: No active room matches the code/password pair
#[instrument(
    skip_all,
    name = "rd.rooms.join",
    fields(method = "POST", endpoint = "/api/v1/rooms/join")
)]
pub async fn join_room(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    body: Bytes,
) -> Result<Json<RoomResponse>, ApiError> {
    // Deserialize request body manually to return 400 (not Axum's default 422)
    let request: JoinRoomRequest = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!(target: "rd.handlers.rooms", error = %e, "Invalid request body");
        ApiError::BadRequest("Invalid request body".to_string())
    })?;

    request
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let room = match state
        .registry
        .join(&request.code, &request.password, user.id)
        .await
    {
        Ok(room) => {
            metrics::record_room_join("success");
            room
        }
        Err(err @ CoreError::NotFound(_)) => {
            metrics::record_room_join("rejected");
            return Err(err.into());
        }
        Err(err) => return Err(err.into()),
    };

    info!(
        target: "rd.handlers.rooms",
        room_id = %room.id,
        user_id = %user.id,
        "User joined room"
    );

    Ok(Json(RoomResponse::from_room(&room, Utc::now())))
}

// ============================================================================
// Handler: GET /api/v1/rooms/{id}
// ============================================================================

/// Handler for GET /api/v1/rooms/{id}
///
/// Return a room with its ledger entries and resolved participants. Expired
/// rooms remain readable here; only joining is gated on expiry.
///
/// # Response
///
/// - 200 OK: Room, files, and participants
/// - 404 Not Found: Unknown room id
#[instrument(
    skip_all,
    name = "rd.rooms.get",
    fields(method = "GET", endpoint = "/api/v1/rooms/{id}")
)]
pub async fn get_room(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<Uuid>,
) -> Result<Json<RoomDetailResponse>, ApiError> {
    let room = state.registry.get(RoomId(room_id)).await?;
    let files = state.ledger.list_for_room(room.id).await?;
    let participants = state.registry.participants(&room).await?;

    let now = Utc::now();
    Ok(Json(RoomDetailResponse {
        room: RoomResponse::from_room(&room, now),
        files: files
            .iter()
            .map(|record| FileResponse::from_record(record, &state.config.public_base_url))
            .collect(),
        participants: participants.into_iter().map(UserResponse::from).collect(),
    }))
}

//! Roomdrop API models.
//!
//! Request and response shapes for the HTTP surface. Requests reject unknown
//! fields and are validated before any lifecycle call; responses are built
//! from core records and never carry credential material.

use chrono::{DateTime, Utc};
use roomdrop_core::types::{FileId, FileRecord, Room, RoomId, RoomStatus, User, UserId};
use serde::{Deserialize, Serialize};

/// Maximum accepted email length in bytes.
pub const MAX_EMAIL_LENGTH: usize = 255;

/// Maximum accepted display name length in bytes.
pub const MAX_DISPLAY_NAME_LENGTH: usize = 100;

// ============================================================================
// Auth API Models
// ============================================================================

/// Request to create an account.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignupRequest {
    /// Account email, unique and case-sensitive.
    pub email: String,

    /// Account password, compared verbatim at login.
    pub password: String,

    /// Optional display name; defaults server-side to the email local part.
    pub display_name: Option<String>,
}

impl SignupRequest {
    /// Validate the request.
    ///
    /// # Errors
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.email.trim().is_empty() {
            return Err("Email is required");
        }

        if self.email.len() > MAX_EMAIL_LENGTH {
            return Err("Email must be at most 255 characters");
        }

        if self.password.is_empty() {
            return Err("Password is required");
        }

        if let Some(display_name) = &self.display_name {
            if display_name.len() > MAX_DISPLAY_NAME_LENGTH {
                return Err("Display name must be at most 100 characters");
            }
        }

        Ok(())
    }
}

/// Request to log in.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    /// Validate the request.
    ///
    /// # Errors
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.email.trim().is_empty() {
            return Err("Email is required");
        }

        if self.password.is_empty() {
            return Err("Password is required");
        }

        Ok(())
    }
}

/// Response for a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    /// Opaque bearer token for subsequent requests.
    pub token: String,

    /// The authenticated account.
    pub user: UserResponse,
}

/// Public view of a user account.
///
/// Deliberately omits the stored credential; this is the only user shape
/// that ever reaches a response body.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub email: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            display_name: user.display_name,
            created_at: user.created_at,
        }
    }
}

/// Generic acknowledgement body for operations with no richer payload.
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

// ============================================================================
// Room API Models
// ============================================================================

/// Request to join a room.
///
/// The joining user is the authenticated caller; bodies never carry user ids.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JoinRoomRequest {
    /// Share code exactly as displayed to the host.
    pub code: String,

    /// Room password, compared verbatim.
    pub password: String,
}

impl JoinRoomRequest {
    /// Validate the request.
    ///
    /// # Errors
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.code.trim().is_empty() {
            return Err("Room code is required");
        }

        if self.password.is_empty() {
            return Err("Room password is required");
        }

        Ok(())
    }
}

/// Public view of a room.
///
/// Includes the room password: it is the share secret participants hand
/// around, not an account credential.
#[derive(Debug, Clone, Serialize)]
pub struct RoomResponse {
    pub id: RoomId,
    pub code: String,
    pub password: String,
    pub host_id: UserId,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Effective state at response time; an expired room is still readable.
    pub status: RoomStatus,
    pub participants: Vec<UserId>,
}

impl RoomResponse {
    /// Build a response view of `room` as of `now`.
    pub fn from_room(room: &Room, now: DateTime<Utc>) -> Self {
        Self {
            id: room.id,
            code: room.code.clone(),
            password: room.password.clone(),
            host_id: room.host_id,
            created_at: room.created_at,
            expires_at: room.expires_at,
            status: room.status(now),
            participants: room.participants.clone(),
        }
    }
}

/// Room detail view: the room plus its ledger entries and resolved members.
#[derive(Debug, Clone, Serialize)]
pub struct RoomDetailResponse {
    pub room: RoomResponse,
    pub files: Vec<FileResponse>,
    pub participants: Vec<UserResponse>,
}

// ============================================================================
// File API Models
// ============================================================================

/// Public view of one uploaded file.
#[derive(Debug, Clone, Serialize)]
pub struct FileResponse {
    pub id: FileId,
    pub room_id: RoomId,
    pub sender_id: UserId,
    pub file_name: String,
    pub size_bytes: u64,
    pub mime_type: String,
    /// Absolute URL the file can be fetched from, no auth required.
    pub download_url: String,
    pub uploaded_at: DateTime<Utc>,
}

impl FileResponse {
    /// Build a response view of `record`, rendering the stored locator as an
    /// absolute download URL under `public_base_url`.
    pub fn from_record(record: &FileRecord, public_base_url: &str) -> Self {
        Self {
            id: record.id,
            room_id: record.room_id,
            sender_id: record.sender_id,
            file_name: record.file_name.clone(),
            size_bytes: record.size_bytes,
            mime_type: record.mime_type.clone(),
            download_url: format!("{}/api/v1/files/{}", public_base_url, record.locator),
            uploaded_at: record.uploaded_at,
        }
    }
}

// ============================================================================
// Operational Models
// ============================================================================

/// Readiness check response.
///
/// Returned by the `/ready` endpoint (readiness probe).
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    /// Service readiness status ("ready" or "not_ready").
    pub status: &'static str,

    /// Upload directory writability.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_dir: Option<&'static str>,

    /// Error message (generic, no filesystem details).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

//! Domain records for the room lifecycle core.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Create a new random user ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Unique identifier for a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomId(pub Uuid);

impl RoomId {
    /// Create a new random room ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RoomId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier for a file ledger entry.
///
/// Assigned by the backing store in strictly increasing order, so ids double
/// as an upload sequence number within a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileId(pub u64);

impl std::fmt::Display for FileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A registered user account.
///
/// Created on signup and never mutated or deleted afterwards. The credential
/// is held verbatim and compared verbatim; hardening it is explicitly out of
/// scope for this system.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    /// Unique, case-sensitive.
    pub email: String,
    pub credential: String,
    /// Defaults to the local part of the email when not supplied at signup.
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

// Manual impl so the credential never reaches logs through a Debug format.
impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("credential", &"[REDACTED]")
            .field("display_name", &self.display_name)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// A login session.
///
/// Lives until explicit logout; no TTL is enforced. `created_at` is recorded
/// so a TTL policy can be layered on later without reshaping the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Opaque bearer token, hex-encoded random bytes.
    pub token: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// Lifecycle state of a room. One-way: a room never becomes active again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    /// Accepting joins; deadline not yet reached.
    Active,
    /// Deadline passed or deactivated by the sweeper. Still readable.
    Expired,
}

impl RoomStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomStatus::Active => "active",
            RoomStatus::Expired => "expired",
        }
    }
}

/// A short-lived file exchange group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: RoomId,
    /// Human-shareable code, 6 uppercase alphanumeric chars.
    pub code: String,
    /// Join password, 8 alphanumeric chars, case-preserving.
    pub password: String,
    pub host_id: UserId,
    pub created_at: DateTime<Utc>,
    /// Fixed at creation + 30 minutes; never renewed.
    pub expires_at: DateTime<Utc>,
    /// Flipped off by the expiry sweep. Reads never trust this alone; they
    /// re-check the deadline against the wall clock.
    pub is_active: bool,
    /// Unique user ids in insertion order, host first.
    pub participants: Vec<UserId>,
}

impl Room {
    /// Whether the expiry deadline has passed at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Whether the room accepts joins at `now`. Requires both the stored
    /// active flag and an unexpired deadline, so a stale flag (sweeper not
    /// yet run) can never admit a participant past the deadline.
    #[must_use]
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && !self.is_expired(now)
    }

    /// Effective lifecycle state at `now`.
    #[must_use]
    pub fn status(&self, now: DateTime<Utc>) -> RoomStatus {
        if self.is_active_at(now) {
            RoomStatus::Active
        } else {
            RoomStatus::Expired
        }
    }
}

/// Metadata for one uploaded file, immutable once recorded.
///
/// The bytes themselves live in the blob store; `locator` is the key handed
/// back by that store at upload time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub id: FileId,
    pub room_id: RoomId,
    pub sender_id: UserId,
    /// Original client-side file name, preserved verbatim.
    pub file_name: String,
    pub size_bytes: u64,
    /// Declared MIME type, taken from the upload as-is.
    pub mime_type: String,
    pub locator: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Input for a new ledger entry; the store assigns id and timestamp.
#[derive(Debug, Clone)]
pub struct NewFileRecord {
    pub room_id: RoomId,
    pub sender_id: UserId,
    pub file_name: String,
    pub size_bytes: u64,
    pub mime_type: String,
    pub locator: String,
}

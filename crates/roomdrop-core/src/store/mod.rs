//! Injectable persistence seam for the lifecycle core.
//!
//! Components talk to these traits, never to a concrete store. Compound
//! operations that carry a uniqueness or idempotency rule (unique insert,
//! find-and-join, sweep) are single trait calls so an implementation can make
//! them atomic; callers never compose them out of separate reads and writes.
//!
//! The wall clock is always passed in (`now`) rather than read inside an
//! implementation, which keeps expiry decisions in one place and makes the
//! stores deterministic under test.

pub mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::CoreError;
use crate::types::{FileRecord, NewFileRecord, Room, RoomId, Session, User, UserId};

/// Persistence for user accounts.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Insert a new user. Fails with `Conflict` when the email is already
    /// registered; the uniqueness check and the insert are one atomic step.
    async fn insert_user(&self, user: User) -> Result<User, CoreError>;

    /// Exact-match lookup on (email, credential), both case-sensitive.
    async fn user_by_credentials(
        &self,
        email: &str,
        credential: &str,
    ) -> Result<Option<User>, CoreError>;

    /// Lookup by id.
    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, CoreError>;
}

/// Persistence for login sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Record a token → user mapping. Fails with `Storage` if the token is
    /// already present; a fresh random token colliding means the RNG is
    /// broken, not the caller.
    async fn insert_session(&self, session: Session) -> Result<(), CoreError>;

    /// Lookup by token.
    async fn session_by_token(&self, token: &str) -> Result<Option<Session>, CoreError>;

    /// Remove a session. Unknown tokens are a no-op, not an error.
    async fn delete_session(&self, token: &str) -> Result<(), CoreError>;
}

/// Persistence for rooms.
#[async_trait]
pub trait RoomStore: Send + Sync {
    /// Insert a room. Fails with `Conflict` when another room active at
    /// `now` already holds the same code; check and insert are one atomic
    /// step so concurrent creators cannot both win the same code.
    async fn insert_room(&self, room: Room, now: DateTime<Utc>) -> Result<Room, CoreError>;

    /// Lookup by id. Expired rooms are returned like any other; callers that
    /// care about liveness check the room's deadline themselves.
    async fn room_by_id(&self, id: RoomId) -> Result<Option<Room>, CoreError>;

    /// Find the room active at `now` whose (code, password) matches exactly
    /// and append `user_id` to its participants unless already present.
    /// Lookup and append are one atomic step. `None` means nothing matched;
    /// the caller cannot tell which field was wrong.
    async fn join_room(
        &self,
        code: &str,
        password: &str,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<Option<Room>, CoreError>;

    /// Clear the active flag on every room whose deadline has passed at
    /// `now`. Returns the ids of rooms flipped by this call.
    async fn deactivate_expired(&self, now: DateTime<Utc>) -> Result<Vec<RoomId>, CoreError>;
}

/// Persistence for the file ledger.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Append a record, assigning the next monotonically increasing id and
    /// stamping it with `now`.
    async fn insert_file(
        &self,
        file: NewFileRecord,
        now: DateTime<Utc>,
    ) -> Result<FileRecord, CoreError>;

    /// All records for a room in insertion order. Unknown rooms yield an
    /// empty list; existence is the ledger component's concern on writes.
    async fn files_for_room(&self, room_id: RoomId) -> Result<Vec<FileRecord>, CoreError>;
}

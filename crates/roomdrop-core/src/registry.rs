//! Room lifecycle operations.
//!
//! Rooms are created with a generated (code, password) pair, accept joins by
//! exact pair match while active, and expire 30 minutes after creation. The
//! active-room code uniqueness and the idempotent participant append both
//! live inside single store calls, so two concurrent creators or joiners
//! cannot race each other into a bad state.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info, instrument};

use crate::codes::{generate_room_code, generate_room_password};
use crate::error::CoreError;
use crate::store::{IdentityStore, RoomStore};
use crate::types::{Room, RoomId, User, UserId};

/// Room lifetime from creation to expiry. Fixed; never renewed.
pub const ROOM_TTL_MINUTES: i64 = 30;

/// Attempts at drawing a room code before giving up on a crowded code space.
const MAX_CODE_COLLISION_RETRIES: usize = 5;

/// Room creation, join and lookup over injected stores.
#[derive(Clone)]
pub struct RoomRegistry {
    rooms: Arc<dyn RoomStore>,
    identity: Arc<dyn IdentityStore>,
}

impl RoomRegistry {
    /// Create the component over its stores.
    pub fn new(rooms: Arc<dyn RoomStore>, identity: Arc<dyn IdentityStore>) -> Self {
        Self { rooms, identity }
    }

    /// Create a room hosted by `host`.
    ///
    /// The code is redrawn when it collides with another active room's code;
    /// the password is drawn once and not checked for collisions, since the
    /// (code, password) pair is the lookup key, never the password alone.
    #[instrument(skip_all, name = "rd.room.create", fields(host_id = %host))]
    pub async fn create(&self, host: UserId) -> Result<Room, CoreError> {
        let password = generate_room_password()?;

        for attempt in 0..MAX_CODE_COLLISION_RETRIES {
            let code = generate_room_code()?;
            let now = Utc::now();
            let room = Room {
                id: RoomId::new(),
                code,
                password: password.clone(),
                host_id: host,
                created_at: now,
                expires_at: now + Duration::minutes(ROOM_TTL_MINUTES),
                is_active: true,
                participants: vec![host],
            };

            match self.rooms.insert_room(room, now).await {
                Ok(room) => {
                    info!(
                        target: "rd.core.registry",
                        room_id = %room.id,
                        room_code = %room.code,
                        host_id = %host,
                        expires_at = %room.expires_at,
                        "Room created"
                    );
                    return Ok(room);
                }
                Err(CoreError::Conflict(_)) => {
                    // Another active room holds this code; redraw
                    debug!(
                        target: "rd.core.registry",
                        attempt = attempt + 1,
                        "Room code collision, retrying"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Err(CoreError::Storage(
            "failed to allocate a unique room code".to_string(),
        ))
    }

    /// Join the active room matching (code, password) exactly.
    ///
    /// Fails with `NotFound` when nothing matches or the match has expired;
    /// the caller cannot tell which field was wrong. Rejoining with a user
    /// already present succeeds and leaves the participant set unchanged.
    #[instrument(skip_all, name = "rd.room.join", fields(user_id = %user))]
    pub async fn join(&self, code: &str, password: &str, user: UserId) -> Result<Room, CoreError> {
        let joined = self
            .rooms
            .join_room(code, password, user, Utc::now())
            .await?;

        match joined {
            Some(room) => {
                info!(
                    target: "rd.core.registry",
                    room_id = %room.id,
                    user_id = %user,
                    participant_count = room.participants.len(),
                    "Participant joined room"
                );
                Ok(room)
            }
            None => {
                debug!(target: "rd.core.registry", room_code = %code, "Join rejected");
                Err(CoreError::NotFound(
                    "invalid room code or password".to_string(),
                ))
            }
        }
    }

    /// Fetch a room by id.
    ///
    /// Expired rooms are returned like any other so a client mid-session can
    /// observe the expired state and keep downloading; only rooms that never
    /// existed fail with `NotFound`.
    pub async fn get(&self, id: RoomId) -> Result<Room, CoreError> {
        self.rooms
            .room_by_id(id)
            .await?
            .ok_or_else(|| CoreError::NotFound("unknown room".to_string()))
    }

    /// Resolve a room's participants in insertion order.
    ///
    /// Identifiers that no longer resolve are skipped rather than failing the
    /// whole listing, tolerating account deletion policies outside this
    /// system's scope.
    pub async fn participants(&self, room: &Room) -> Result<Vec<User>, CoreError> {
        let mut users = Vec::with_capacity(room.participants.len());
        for &id in &room.participants {
            match self.identity.user_by_id(id).await? {
                Some(user) => users.push(user),
                None => {
                    debug!(
                        target: "rd.core.registry",
                        room_id = %room.id,
                        user_id = %id,
                        "Skipping unresolvable participant"
                    );
                }
            }
        }
        Ok(users)
    }
}

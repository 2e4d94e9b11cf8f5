//! In-process backing store.
//!
//! One map per collection, each behind its own `tokio::sync::RwLock`. Every
//! compound operation (unique insert, find-and-join, sweep) runs entirely
//! inside a single write-lock section, which is what closes the
//! check-then-insert races in the concurrency contract. No lock is ever held
//! across an await on anything but the lock acquisition itself, and no
//! operation takes more than one lock, so lock ordering cannot deadlock.
//!
//! Lookups scan the collection. The working set of a deployment is bounded by
//! the 30-minute room lifetime, so scans stay short; an indexed store can
//! replace this one behind the same traits if that stops being true.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::error::CoreError;
use crate::store::{FileStore, IdentityStore, RoomStore, SessionStore};
use crate::types::{FileId, FileRecord, NewFileRecord, Room, RoomId, Session, User, UserId};

/// File ledger state kept under one lock so id assignment and append stay in
/// step.
#[derive(Default)]
struct FileLedgerState {
    next_id: u64,
    records: Vec<FileRecord>,
}

/// The in-process store backing all four collections.
pub struct MemoryStore {
    users: RwLock<HashMap<UserId, User>>,
    sessions: RwLock<HashMap<String, Session>>,
    rooms: RwLock<HashMap<RoomId, Room>>,
    files: RwLock<FileLedgerState>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            sessions: RwLock::new(HashMap::new()),
            rooms: RwLock::new(HashMap::new()),
            files: RwLock::new(FileLedgerState::default()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn insert_user(&self, user: User) -> Result<User, CoreError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(CoreError::Conflict("email already registered".to_string()));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn user_by_credentials(
        &self,
        email: &str,
        credential: &str,
    ) -> Result<Option<User>, CoreError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.email == email && u.credential == credential)
            .cloned())
    }

    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, CoreError> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn insert_session(&self, session: Session) -> Result<(), CoreError> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session.token) {
            return Err(CoreError::Storage("session token collision".to_string()));
        }
        sessions.insert(session.token.clone(), session);
        Ok(())
    }

    async fn session_by_token(&self, token: &str) -> Result<Option<Session>, CoreError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(token).cloned())
    }

    async fn delete_session(&self, token: &str) -> Result<(), CoreError> {
        let mut sessions = self.sessions.write().await;
        sessions.remove(token);
        Ok(())
    }
}

#[async_trait]
impl RoomStore for MemoryStore {
    async fn insert_room(&self, room: Room, now: DateTime<Utc>) -> Result<Room, CoreError> {
        let mut rooms = self.rooms.write().await;
        // Codes only have to be unique among rooms still active at `now`;
        // expired holders release their code immediately.
        if rooms
            .values()
            .any(|r| r.code == room.code && r.is_active_at(now))
        {
            return Err(CoreError::Conflict("room code already in use".to_string()));
        }
        rooms.insert(room.id, room.clone());
        Ok(room)
    }

    async fn room_by_id(&self, id: RoomId) -> Result<Option<Room>, CoreError> {
        let rooms = self.rooms.read().await;
        Ok(rooms.get(&id).cloned())
    }

    async fn join_room(
        &self,
        code: &str,
        password: &str,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<Option<Room>, CoreError> {
        let mut rooms = self.rooms.write().await;
        let Some(room) = rooms
            .values_mut()
            .find(|r| r.code == code && r.password == password && r.is_active_at(now))
        else {
            return Ok(None);
        };
        if !room.participants.contains(&user_id) {
            room.participants.push(user_id);
        }
        Ok(Some(room.clone()))
    }

    async fn deactivate_expired(&self, now: DateTime<Utc>) -> Result<Vec<RoomId>, CoreError> {
        let mut rooms = self.rooms.write().await;
        let mut flipped = Vec::new();
        for room in rooms.values_mut() {
            if room.is_active && room.is_expired(now) {
                room.is_active = false;
                flipped.push(room.id);
            }
        }
        Ok(flipped)
    }
}

#[async_trait]
impl FileStore for MemoryStore {
    async fn insert_file(
        &self,
        file: NewFileRecord,
        now: DateTime<Utc>,
    ) -> Result<FileRecord, CoreError> {
        let mut ledger = self.files.write().await;
        ledger.next_id += 1;
        let record = FileRecord {
            id: FileId(ledger.next_id),
            room_id: file.room_id,
            sender_id: file.sender_id,
            file_name: file.file_name,
            size_bytes: file.size_bytes,
            mime_type: file.mime_type,
            locator: file.locator,
            uploaded_at: now,
        };
        ledger.records.push(record.clone());
        Ok(record)
    }

    async fn files_for_room(&self, room_id: RoomId) -> Result<Vec<FileRecord>, CoreError> {
        let ledger = self.files.read().await;
        Ok(ledger
            .records
            .iter()
            .filter(|r| r.room_id == room_id)
            .cloned()
            .collect())
    }
}

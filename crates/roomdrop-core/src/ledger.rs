//! File ledger operations.
//!
//! The ledger is append-only metadata; the bytes live in the blob store.
//! Each accepted file becomes exactly one entry, committed independently of
//! any sibling files from the same upload call, so one failed blob write
//! never drops the records of the files that did land.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};

use crate::error::CoreError;
use crate::store::{FileStore, RoomStore};
use crate::types::{FileRecord, NewFileRecord, RoomId, UserId};

/// Ledger writes and reads over injected stores.
#[derive(Clone)]
pub struct FileLedger {
    files: Arc<dyn FileStore>,
    rooms: Arc<dyn RoomStore>,
}

impl FileLedger {
    /// Create the component over its stores.
    pub fn new(files: Arc<dyn FileStore>, rooms: Arc<dyn RoomStore>) -> Self {
        Self { files, rooms }
    }

    /// Record one uploaded file against a room.
    ///
    /// Fails with `NotFound` when the room never existed. An expired room is
    /// accepted: uploads drain gracefully past the deadline and the records
    /// stay downloadable, matching the join-side-only activity gate.
    #[instrument(skip_all, name = "rd.ledger.record", fields(room_id = %room_id))]
    pub async fn record(
        &self,
        room_id: RoomId,
        sender_id: UserId,
        file_name: &str,
        size_bytes: u64,
        mime_type: &str,
        locator: &str,
    ) -> Result<FileRecord, CoreError> {
        if self.rooms.room_by_id(room_id).await?.is_none() {
            return Err(CoreError::NotFound("unknown room".to_string()));
        }

        let record = self
            .files
            .insert_file(
                NewFileRecord {
                    room_id,
                    sender_id,
                    file_name: file_name.to_string(),
                    size_bytes,
                    mime_type: mime_type.to_string(),
                    locator: locator.to_string(),
                },
                Utc::now(),
            )
            .await?;

        info!(
            target: "rd.core.ledger",
            file_id = %record.id,
            room_id = %room_id,
            sender_id = %sender_id,
            size_bytes,
            "File recorded"
        );
        Ok(record)
    }

    /// All records for a room in insertion order; empty when none exist.
    pub async fn list_for_room(&self, room_id: RoomId) -> Result<Vec<FileRecord>, CoreError> {
        self.files.files_for_room(room_id).await
    }
}

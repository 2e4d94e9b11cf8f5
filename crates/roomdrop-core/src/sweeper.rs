//! Room expiry background task.
//!
//! Periodically clears the active flag on rooms whose deadline has passed.
//! This is housekeeping, not correctness: every read path re-checks the
//! deadline against the wall clock, so nothing breaks if the sweep runs late
//! or never. Sweeping just lets join lookups reclaim codes promptly instead
//! of waiting for the next lazy check.
//!
//! # Graceful Shutdown
//!
//! The task supports graceful shutdown via a cancellation token. When the
//! token is cancelled, the task completes its current iteration and exits
//! cleanly.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use crate::store::RoomStore;

/// Default sweep interval in seconds.
const DEFAULT_SWEEP_INTERVAL_SECONDS: u64 = 60;

/// Configuration for the expiry sweep task.
#[derive(Debug, Clone)]
pub struct ExpirySweepConfig {
    /// Sweep interval in seconds.
    pub sweep_interval_seconds: u64,
}

impl Default for ExpirySweepConfig {
    fn default() -> Self {
        Self {
            sweep_interval_seconds: DEFAULT_SWEEP_INTERVAL_SECONDS,
        }
    }
}

impl ExpirySweepConfig {
    /// Create config from environment variables.
    ///
    /// Environment variables:
    /// - `RD_SWEEP_INTERVAL_SECONDS` - Sweep interval (default: 60)
    pub fn from_env() -> Self {
        let sweep_interval_seconds = std::env::var("RD_SWEEP_INTERVAL_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_SWEEP_INTERVAL_SECONDS);

        Self {
            sweep_interval_seconds,
        }
    }
}

/// Start the expiry sweep background task.
///
/// Runs a sweep at the configured interval until the cancellation token is
/// triggered, then returns.
#[instrument(skip_all, name = "rd.task.expiry_sweep")]
pub async fn start_expiry_sweep(
    rooms: Arc<dyn RoomStore>,
    config: ExpirySweepConfig,
    cancel_token: CancellationToken,
) {
    info!(
        target: "rd.task.expiry_sweep",
        sweep_interval_seconds = config.sweep_interval_seconds,
        "Starting expiry sweep task"
    );

    let mut interval = tokio::time::interval(Duration::from_secs(config.sweep_interval_seconds));

    loop {
        tokio::select! {
            _ = interval.tick() => {
                run_sweep(rooms.as_ref()).await;
            }
            _ = cancel_token.cancelled() => {
                info!(
                    target: "rd.task.expiry_sweep",
                    "Expiry sweep task received shutdown signal, exiting"
                );
                break;
            }
        }
    }

    info!(target: "rd.task.expiry_sweep", "Expiry sweep task stopped");
}

/// Run a single sweep iteration.
///
/// This is separated from the main loop to allow direct testing.
pub(crate) async fn run_sweep(rooms: &dyn RoomStore) {
    match rooms.deactivate_expired(Utc::now()).await {
        Ok(flipped) => {
            if !flipped.is_empty() {
                metrics::counter!("roomdrop_rooms_expired_total").increment(flipped.len() as u64);
                info!(
                    target: "rd.task.expiry_sweep",
                    expired_count = flipped.len(),
                    "Deactivated expired rooms"
                );
            }
        }
        Err(e) => {
            tracing::error!(
                target: "rd.task.expiry_sweep",
                error = %e,
                "Expiry sweep failed"
            );
        }
    }
}


#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod task_tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::types::{Room, RoomId, UserId};
    use chrono::Duration as ChronoDuration;

    fn expired_room() -> Room {
        let now = Utc::now();
        let host = UserId::new();
        Room {
            id: RoomId::new(),
            code: "AAAAAA".to_string(),
            password: "pw123456".to_string(),
            host_id: host,
            created_at: now - ChronoDuration::minutes(31),
            expires_at: now - ChronoDuration::minutes(1),
            is_active: true,
            participants: vec![host],
        }
    }

    /// A single sweep flips expired rooms and leaves live ones alone.
    #[tokio::test]
    async fn test_run_sweep_deactivates_expired_rooms() {
        let store = Arc::new(MemoryStore::new());
        let now = Utc::now();

        let expired = expired_room();
        let expired_id = expired.id;
        store.insert_room(expired, now - ChronoDuration::minutes(31)).await.unwrap();

        let live_host = UserId::new();
        let live = Room {
            id: RoomId::new(),
            code: "BBBBBB".to_string(),
            password: "pw123456".to_string(),
            host_id: live_host,
            created_at: now,
            expires_at: now + ChronoDuration::minutes(30),
            is_active: true,
            participants: vec![live_host],
        };
        let live_id = live.id;
        store.insert_room(live, now).await.unwrap();

        run_sweep(store.as_ref()).await;

        assert!(!store.room_by_id(expired_id).await.unwrap().unwrap().is_active);
        assert!(store.room_by_id(live_id).await.unwrap().unwrap().is_active);
    }

    /// The first interval tick fires immediately, so a freshly started task
    /// sweeps without waiting out the interval.
    #[tokio::test]
    async fn test_task_sweeps_on_startup() {
        let store = Arc::new(MemoryStore::new());
        let expired = expired_room();
        let expired_id = expired.id;
        store
            .insert_room(expired, Utc::now() - ChronoDuration::minutes(31))
            .await
            .unwrap();

        let cancel_token = CancellationToken::new();
        let config = ExpirySweepConfig {
            sweep_interval_seconds: 3600,
        };
        let handle = tokio::spawn(start_expiry_sweep(
            store.clone(),
            config,
            cancel_token.clone(),
        ));

        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        assert!(!store.room_by_id(expired_id).await.unwrap().unwrap().is_active);

        cancel_token.cancel();
        handle.await.unwrap();
    }

    /// The task stops promptly once cancelled.
    #[tokio::test]
    async fn test_task_starts_and_stops() {
        let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());
        let cancel_token = CancellationToken::new();
        let cancel_clone = cancel_token.clone();

        let config = ExpirySweepConfig {
            sweep_interval_seconds: 1,
        };
        let handle = tokio::spawn(start_expiry_sweep(store, config, cancel_token));

        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        cancel_clone.cancel();

        let result = tokio::time::timeout(std::time::Duration::from_secs(2), handle).await;
        assert!(
            result.is_ok(),
            "Expiry sweep should stop within 2 seconds after cancellation"
        );
        result.unwrap().expect("Task should not panic");
    }
}

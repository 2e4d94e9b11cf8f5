//! Test server harness for E2E testing
//!
//! Provides `TestServer` for spawning real Roomdrop server instances in tests.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use roomdrop_core::identity::Identity;
use roomdrop_core::ledger::FileLedger;
use roomdrop_core::registry::RoomRegistry;
use roomdrop_core::sessions::Sessions;
use roomdrop_core::store::{MemoryStore, RoomStore};
use roomdrop_core::types::{Room, RoomId, UserId};
use roomdrop_service::blobs::DiskBlobs;
use roomdrop_service::config::Config;
use roomdrop_service::observability::metrics::init_metrics_recorder;
use roomdrop_service::routes::{self, AppState};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};
use tempfile::TempDir;
use tokio::task::JoinHandle;

/// Test harness for spawning a Roomdrop server in E2E tests.
///
/// Each instance gets its own in-memory store and its own temporary upload
/// directory, so tests are isolated without any shared fixtures.
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_signup_flow_e2e() -> Result<(), anyhow::Error> {
///     let server = TestServer::spawn().await?;
///     let client = reqwest::Client::new();
///
///     let response = client
///         .post(format!("{}/api/v1/auth/signup", server.url()))
///         .json(&serde_json::json!({"email": "a@b.c", "password": "pw"}))
///         .send()
///         .await?;
///
///     assert_eq!(response.status(), 201);
///     Ok(())
/// }
/// ```
pub struct TestServer {
    addr: SocketAddr,
    config: Config,
    store: Arc<MemoryStore>,
    _upload_dir: TempDir,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Spawn a new test server instance with isolated state.
    ///
    /// The server will:
    /// - Bind to a random available port (127.0.0.1:0)
    /// - Store uploads in a fresh temporary directory
    /// - Start the HTTP server in the background
    ///
    /// # Returns
    /// * `Ok(TestServer)` - Running server instance
    /// * `Err(anyhow::Error)` - If server spawn fails
    pub async fn spawn() -> Result<Self, anyhow::Error> {
        let upload_dir = tempfile::tempdir()
            .map_err(|e| anyhow::anyhow!("Failed to create upload dir: {}", e))?;

        // Build configuration for test environment
        let vars = HashMap::from([
            ("RD_BIND_ADDRESS".to_string(), "127.0.0.1:0".to_string()),
            (
                "RD_UPLOAD_DIR".to_string(),
                upload_dir.path().display().to_string(),
            ),
        ]);

        let config = Config::from_vars(&vars)
            .map_err(|e| anyhow::anyhow!("Failed to create config: {}", e))?;

        // One in-memory store backs every component, exposed via store() for
        // direct seeding
        let store = Arc::new(MemoryStore::new());
        let blobs = DiskBlobs::new(config.upload_dir.clone())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create blob store: {}", e))?;

        let state = Arc::new(AppState {
            identity: Identity::new(store.clone()),
            sessions: Sessions::new(store.clone(), store.clone()),
            registry: RoomRegistry::new(store.clone(), store.clone()),
            ledger: FileLedger::new(store.clone(), store.clone()),
            blobs: Arc::new(blobs),
            config: config.clone(),
        });

        // Build routes using the service's real route builder
        let app = routes::build_routes(state, metrics_handle());

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        // Spawn server in background
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            config,
            store,
            _upload_dir: upload_dir,
            _handle: handle,
        })
    }

    /// Get reference to the backing store, for direct state seeding.
    pub fn store(&self) -> &Arc<MemoryStore> {
        &self.store
    }

    /// Get the base URL of the test server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get the socket address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Get reference to the server configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Insert a room whose deadline has already passed.
    ///
    /// Tests cannot wait out the real 30 minute room lifetime, so expired
    /// room behavior is exercised by seeding the store directly. The room is
    /// inserted with its active flag still set, as if the sweeper had not
    /// run yet, which is the stale state read paths must handle.
    pub async fn seed_expired_room(&self, host_id: UserId) -> Result<Room, anyhow::Error> {
        let now = chrono::Utc::now();
        let room = Room {
            id: RoomId::new(),
            code: "XPRD00".to_string(),
            password: "pw000000".to_string(),
            host_id,
            created_at: now - chrono::Duration::minutes(45),
            expires_at: now - chrono::Duration::minutes(15),
            is_active: true,
            participants: vec![host_id],
        };

        self.store
            .insert_room(room, now)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to seed expired room: {}", e))
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        // Explicitly abort the HTTP server task to ensure immediate cleanup
        // when the test completes. This stops the server gracefully.
        self._handle.abort();
    }
}

/// Process-wide Prometheus handle.
///
/// The global metrics recorder can only be installed once per process, while
/// each test spawns its own server. The first spawn installs the recorder and
/// every later spawn reuses the same handle.
fn metrics_handle() -> PrometheusHandle {
    static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
    HANDLE
        .get_or_init(|| {
            init_metrics_recorder()
                .unwrap_or_else(|_| PrometheusBuilder::new().build_recorder().handle())
        })
        .clone()
}

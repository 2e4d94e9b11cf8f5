//! Disk-backed blob storage for uploaded file content.
//!
//! The file ledger stores only locator keys; the bytes behind them live here.
//! `BlobStore` is the seam between handlers and the storage backend, and
//! `DiskBlobs` is the one real implementation, writing to a configured local
//! directory.

use async_trait::async_trait;
use chrono::Utc;
use ring::rand::{SecureRandom, SystemRandom};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::pin::Pin;
use tokio::io::AsyncRead;
use tracing::debug;

use crate::errors::ApiError;

/// Random bytes appended to each locator so same-named uploads never collide.
const LOCATOR_SUFFIX_BYTES: usize = 4;

/// Cap on the sanitized original-name portion of a locator.
const MAX_SANITIZED_NAME_BYTES: usize = 100;

/// Opened blob content ready for streaming to a response body.
pub struct BlobContent {
    /// Async reader over the stored bytes.
    pub reader: Pin<Box<dyn AsyncRead + Send>>,

    /// Total blob size, for the Content-Length header.
    pub size_bytes: u64,
}

impl std::fmt::Debug for BlobContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobContent")
            .field("size_bytes", &self.size_bytes)
            .finish_non_exhaustive()
    }
}

/// Storage backend for uploaded bytes, keyed by server-generated locators.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Persist `bytes` under a fresh locator derived from `file_name`.
    /// Returns the locator the ledger should record.
    async fn put(&self, file_name: &str, bytes: &[u8]) -> Result<String, ApiError>;

    /// Open the blob stored under `locator` for streaming. Unknown locators
    /// and locators that do not name a plain file in the store are NotFound.
    async fn open(&self, locator: &str) -> Result<BlobContent, ApiError>;
}

/// Blob store writing each upload as one file in a local directory.
pub struct DiskBlobs {
    root: PathBuf,
}

impl DiskBlobs {
    /// Create a disk store rooted at `root`, creating the directory if needed.
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self, ApiError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await.map_err(|e| {
            ApiError::Storage(format!(
                "failed to create upload directory {}: {}",
                root.display(),
                e
            ))
        })?;
        Ok(Self { root })
    }
}

#[async_trait]
impl BlobStore for DiskBlobs {
    async fn put(&self, file_name: &str, bytes: &[u8]) -> Result<String, ApiError> {
        let locator = build_locator(file_name)?;
        let path = self.root.join(&locator);

        tokio::fs::write(&path, bytes).await.map_err(|e| {
            ApiError::Storage(format!("failed to write blob {}: {}", locator, e))
        })?;

        debug!(
            target: "rd.blobs",
            locator = %locator,
            size_bytes = bytes.len(),
            "Stored blob"
        );

        Ok(locator)
    }

    async fn open(&self, locator: &str) -> Result<BlobContent, ApiError> {
        // A locator names exactly one plain file directly under the root.
        // Anything with separators or parent components is treated as unknown
        // rather than resolved.
        if !is_simple_file_name(locator) {
            return Err(ApiError::NotFound("unknown file".to_string()));
        }

        let path = self.root.join(locator);
        let file = tokio::fs::File::open(&path).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                ApiError::NotFound("unknown file".to_string())
            } else {
                ApiError::Storage(format!("failed to open blob {}: {}", locator, e))
            }
        })?;

        let metadata = file.metadata().await.map_err(|e| {
            ApiError::Storage(format!("failed to stat blob {}: {}", locator, e))
        })?;

        Ok(BlobContent {
            reader: Box::pin(file),
            size_bytes: metadata.len(),
        })
    }
}

/// Build a unique locator: millisecond timestamp, random hex suffix, and the
/// sanitized original name.
fn build_locator(file_name: &str) -> Result<String, ApiError> {
    let mut suffix = [0u8; LOCATOR_SUFFIX_BYTES];
    SystemRandom::new().fill(&mut suffix).map_err(|_| {
        ApiError::Storage("RNG failure while building a blob locator".to_string())
    })?;

    Ok(format!(
        "{}-{}-{}",
        Utc::now().timestamp_millis(),
        hex::encode(suffix),
        sanitize_file_name(file_name)
    ))
}

/// Reduce a client-supplied file name to a safe single-segment name: ASCII
/// alphanumerics, dots, dashes and underscores only, capped in length.
fn sanitize_file_name(file_name: &str) -> String {
    let mut sanitized: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    // Output is pure ASCII, so byte truncation cannot split a character.
    sanitized.truncate(MAX_SANITIZED_NAME_BYTES);

    if sanitized.trim_matches(['.', '_', '-']).is_empty() {
        return "file".to_string();
    }

    sanitized
}

/// Whether `locator` is a bare file name: one normal path component, no
/// separators, no parent or root references.
fn is_simple_file_name(locator: &str) -> bool {
    let mut components = Path::new(locator).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

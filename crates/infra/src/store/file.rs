//! File-backed implementation of the durable queue snapshot.
//!
//! The snapshot is a JSON envelope written atomically (temp file, fsync,
//! rename) after every queue mutation, with a sha256 sidecar used to detect
//! corruption on load. A missing file loads as an empty queue; unreadable
//! contents surface as an error the dispatcher degrades from.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use beacon_core::QueueStore;
use beacon_domain::constants::SNAPSHOT_VERSION;
use beacon_domain::{DeliveryRequest, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// Snapshot envelope metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SnapshotMetadata {
    version: u32,
    created_at: u64,
    item_count: usize,
}

/// Persisted queue envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedQueue {
    metadata: SnapshotMetadata,
    items: Vec<DeliveryRequest>,
}

/// Queue store writing snapshots to a well-known file.
pub struct FileQueueStore {
    path: PathBuf,
}

impl FileQueueStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn checksum(data: &[u8]) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(data);
        format!("{:x}", hasher.finalize())
    }
}

#[async_trait]
impl QueueStore for FileQueueStore {
    async fn load(&self) -> Result<Vec<DeliveryRequest>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No snapshot file; starting with empty queue");
            return Ok(Vec::new());
        }

        let data = fs::read(&self.path).await?;

        let checksum_path = self.path.with_extension("sha256");
        if checksum_path.exists() {
            if let Ok(expected) = fs::read_to_string(&checksum_path).await {
                if Self::checksum(&data) != expected.trim() {
                    warn!("Snapshot checksum mismatch; file may be corrupted");
                }
            }
        }

        let snapshot: PersistedQueue = serde_json::from_slice(&data)?;

        if snapshot.metadata.version != SNAPSHOT_VERSION {
            warn!(
                expected = SNAPSHOT_VERSION,
                found = snapshot.metadata.version,
                "Snapshot version mismatch"
            );
        }

        info!(count = snapshot.items.len(), "Loaded queue snapshot");
        Ok(snapshot.items)
    }

    async fn save(&self, requests: &[DeliveryRequest]) -> Result<()> {
        let snapshot = PersistedQueue {
            metadata: SnapshotMetadata {
                version: SNAPSHOT_VERSION,
                created_at: SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_secs(),
                item_count: requests.len(),
            },
            items: requests.to_vec(),
        };

        let data = serde_json::to_vec(&snapshot)?;

        // Write to a temporary file first for atomicity
        let temp_path = self.path.with_extension("tmp");
        if let Some(parent) = temp_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .await?;
        file.write_all(&data).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp_path, &self.path).await?;

        // Sidecar checksum is best effort
        let checksum_path = self.path.with_extension("sha256");
        fs::write(&checksum_path, Self::checksum(&data)).await.ok();

        debug!(count = requests.len(), bytes = data.len(), "Persisted queue snapshot");
        Ok(())
    }
}

//! Local filesystem storage implementation.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! ├── spark_tracks.json     # Snapshot (SnapshotData)
//! └── spark_tracks.tmp      # Present only while a write is in flight
//! ```
//!
//! Writes go to the temporary file first and are renamed over the snapshot,
//! so readers see either the old or the new document, never a partial one.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::TrackMap;
use crate::storage::{SnapshotData, SnapshotStore, WriteMetadata};

/// Default snapshot file name.
pub const SNAPSHOT_FILE: &str = "spark_tracks.json";

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
    snapshot_file: String,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self::with_snapshot_file(root_dir, SNAPSHOT_FILE)
    }

    /// Create a LocalStorage with a custom snapshot file name.
    pub fn with_snapshot_file(root_dir: impl Into<PathBuf>, file: impl Into<String>) -> Self {
        Self {
            root_dir: root_dir.into(),
            snapshot_file: file.into(),
        }
    }

    /// Full path of the snapshot file.
    pub fn snapshot_path(&self) -> PathBuf {
        self.path(&self.snapshot_file)
    }

    /// Get the full path for a relative key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(AppError::Io(e));
        }
        Ok(())
    }

    /// Write JSON data.
    async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(key, &bytes).await
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Read JSON data.
    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.read_bytes(key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Read the full snapshot document, including its header.
    pub async fn load_data(&self) -> Result<Option<SnapshotData>> {
        self.read_json(&self.snapshot_file).await
    }
}

#[async_trait]
impl SnapshotStore for LocalStorage {
    async fn load_snapshot(&self) -> Result<TrackMap> {
        match self.load_data().await {
            Ok(Some(data)) => {
                log::debug!(
                    "Loaded snapshot with {} tracks (updated {})",
                    data.tracks.len(),
                    data.updated_at
                );
                Ok(data.tracks)
            }
            Ok(None) => {
                log::info!("No snapshot found at {}", self.snapshot_path().display());
                Ok(TrackMap::new())
            }
            Err(AppError::Json(e)) => {
                log::warn!(
                    "Snapshot at {} is corrupt ({}); starting from an empty snapshot",
                    self.snapshot_path().display(),
                    e
                );
                Ok(TrackMap::new())
            }
            Err(e) => Err(AppError::snapshot(format!(
                "failed to read {}: {}",
                self.snapshot_path().display(),
                e
            ))),
        }
    }

    async fn save_snapshot(&self, tracks: &TrackMap) -> Result<WriteMetadata> {
        let data = SnapshotData::new(tracks.clone());
        self.write_json(&self.snapshot_file, &data)
            .await
            .map_err(|e| {
                AppError::snapshot(format!(
                    "failed to write {}: {}",
                    self.snapshot_path().display(),
                    e
                ))
            })?;

        Ok(WriteMetadata {
            count: data.count,
            location: self.snapshot_path().display().to_string(),
            timestamp: Utc::now(),
        })
    }
}

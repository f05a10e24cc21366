//! Storage abstractions for snapshot persistence.
//!
//! The snapshot is the last-notified set of tracks, keyed by id. It is read
//! once at the start of a cycle and replaced wholesale at the end.
//!
//! ## Directory Structure
//!
//! ```text
//! storage/
//! ├── config.toml           # Watcher configuration
//! └── spark_tracks.json     # Snapshot of the last cycle
//! ```

pub mod local;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::TrackMap;

// Re-export for convenience
pub use local::LocalStorage;

/// Metadata about a snapshot write.
#[derive(Debug, Clone)]
pub struct WriteMetadata {
    /// Number of tracks written
    pub count: usize,
    /// Where the snapshot was written
    pub location: String,
    /// Timestamp of the write
    pub timestamp: DateTime<Utc>,
}

/// On-disk snapshot document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotData {
    /// ISO 8601 timestamp of last update
    pub updated_at: DateTime<Utc>,
    /// Total track count
    pub count: usize,
    /// Tracks keyed by id
    pub tracks: TrackMap,
}

impl SnapshotData {
    pub fn new(tracks: TrackMap) -> Self {
        Self {
            updated_at: Utc::now(),
            count: tracks.len(),
            tracks,
        }
    }
}

/// Trait for snapshot storage backends.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the last snapshot. A missing snapshot is an empty map.
    async fn load_snapshot(&self) -> Result<TrackMap>;

    /// Replace the snapshot with `tracks`.
    ///
    /// Implementations must never leave a partially written snapshot behind.
    async fn save_snapshot(&self, tracks: &TrackMap) -> Result<WriteMetadata>;
}

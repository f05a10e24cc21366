// src/models/mod.rs

//! Domain models for the watcher.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod change;
mod config;
mod payload;
mod track;

// Re-export all public types
pub use change::{Change, ChangeKind};
pub use config::{
    CATALOG_URL_ENV, CatalogConfig, Config, DisplayConfig, LoggingConfig, PollingConfig,
    StorageConfig, WEBHOOK_URL_ENV, WebhookConfig,
};
pub use payload::{Embed, EmbedField, EmbedThumbnail, WebhookPayload};
pub use track::{DifficultyChannel, NOT_AVAILABLE, Track, TrackMap, UNKNOWN};

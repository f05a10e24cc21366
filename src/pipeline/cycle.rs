// src/pipeline/cycle.rs

//! One polling cycle: fetch, normalize, detect, notify, persist.

use std::path::Path;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{ChangeKind, Config, TrackMap, WebhookPayload};
use crate::pipeline::diff::detect_changes;
use crate::pipeline::format::Formatter;
use crate::services::{
    CatalogSource, DeliveryResult, HttpCatalog, HttpWebhook, Notifier, RetryPolicy,
    WebhookTransport, normalize,
};
use crate::storage::{LocalStorage, SnapshotStore};

/// Summary of a cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Tracks with an id in the fetched catalog
    pub track_count: usize,
    pub new: usize,
    pub modified: usize,
    pub unchanged: usize,
    /// Ids present in the snapshot but gone upstream
    pub removed: usize,
    pub delivered: usize,
    pub rate_limited: usize,
    pub failed: usize,
    /// Whether the snapshot was replaced at the end of the cycle
    pub snapshot_saved: bool,
    /// Payloads rendered but not sent (dry runs only)
    pub previews: Vec<WebhookPayload>,
}

impl CycleReport {
    fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            finished_at: started_at,
            track_count: 0,
            new: 0,
            modified: 0,
            unchanged: 0,
            removed: 0,
            delivered: 0,
            rate_limited: 0,
            failed: 0,
            snapshot_saved: false,
            previews: Vec::new(),
        }
    }

    /// Number of notifications attempted or previewed.
    pub fn notified(&self) -> usize {
        self.new + self.modified
    }

    /// Summary rows for console output.
    pub fn summary_items(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Tracks", self.track_count.to_string()),
            ("New", self.new.to_string()),
            ("Updated", self.modified.to_string()),
            ("Unchanged", self.unchanged.to_string()),
            ("Removed", self.removed.to_string()),
            ("Delivered", self.delivered.to_string()),
            ("Rate limited", self.rate_limited.to_string()),
            ("Failed", self.failed.to_string()),
            ("Snapshot saved", self.snapshot_saved.to_string()),
            (
                "Duration",
                format!(
                    "{} ms",
                    (self.finished_at - self.started_at).num_milliseconds()
                ),
            ),
        ]
    }
}

/// Runs polling cycles against injected collaborators.
pub struct CycleRunner<C, S, T> {
    catalog: C,
    store: S,
    notifier: Notifier<T>,
    formatter: Formatter,
}

impl CycleRunner<HttpCatalog, LocalStorage, HttpWebhook> {
    /// Wire the HTTP catalog, local snapshot store and HTTP webhook from config.
    pub fn from_config(config: &Config, storage_dir: &Path) -> Result<Self> {
        let catalog = HttpCatalog::new(&config.catalog)?;
        let store = LocalStorage::with_snapshot_file(storage_dir, &config.storage.snapshot_file);
        let notifier = Notifier::new(
            HttpWebhook::new(&config.webhook)?,
            RetryPolicy::from(&config.webhook),
        );

        Ok(Self::new(catalog, store, notifier, Formatter::new(&config.display)))
    }
}

impl<C, S, T> CycleRunner<C, S, T>
where
    C: CatalogSource,
    S: SnapshotStore,
    T: WebhookTransport,
{
    pub fn new(catalog: C, store: S, notifier: Notifier<T>, formatter: Formatter) -> Self {
        Self {
            catalog,
            store,
            notifier,
            formatter,
        }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn notifier(&self) -> &Notifier<T> {
        &self.notifier
    }

    /// Run one cycle, delivering notifications and replacing the snapshot.
    ///
    /// A fetch failure aborts the cycle and leaves the snapshot untouched.
    /// Delivery failures are logged and counted; the snapshot is replaced
    /// regardless, so a failed notification is not offered again.
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        self.run(false).await
    }

    /// Run one cycle without delivering or persisting anything.
    pub async fn preview_cycle(&self) -> Result<CycleReport> {
        self.run(true).await
    }

    async fn run(&self, dry_run: bool) -> Result<CycleReport> {
        let mut report = CycleReport::new(Utc::now());

        let document = self.catalog.fetch().await?;
        let current = normalize(&document);
        let previous = self.load_previous().await;

        let diff = detect_changes(&current, &previous);
        report.track_count = current.len();
        report.new = diff.count(ChangeKind::New);
        report.modified = diff.count(ChangeKind::Modified);
        report.unchanged = diff.count(ChangeKind::Unchanged);
        report.removed = diff.removed.len();

        log::info!(
            "Catalog: {} tracks ({} new, {} updated, {} unchanged, {} removed)",
            report.track_count,
            report.new,
            report.modified,
            report.unchanged,
            report.removed
        );
        for id in &diff.removed {
            log::info!("Track {} is no longer listed upstream", id);
        }

        for change in diff.notifiable() {
            let payload = self.formatter.format(&change.track, change.kind);
            if dry_run {
                report.previews.push(payload);
                continue;
            }

            match self.notifier.deliver(&payload).await {
                DeliveryResult::Delivered { attempts } => {
                    report.delivered += 1;
                    log::info!(
                        "Sent {} track: {} ({}, {} attempt(s))",
                        change.kind,
                        change.track.title,
                        change.track.id,
                        attempts
                    );
                }
                DeliveryResult::RateLimited { attempts } => {
                    report.rate_limited += 1;
                    log::warn!(
                        "Dropped {} track {} after {} rate-limited attempts",
                        change.kind,
                        change.track.id,
                        attempts
                    );
                }
                DeliveryResult::Failed { status, detail } => {
                    report.failed += 1;
                    log::error!(
                        "Webhook error for {} (status {}): {}",
                        change.track.id,
                        status.map_or_else(|| "none".to_string(), |s| s.to_string()),
                        detail.trim()
                    );
                }
            }
        }

        if !dry_run {
            report.snapshot_saved = self.save_current(&current).await;
        }

        report.finished_at = Utc::now();
        Ok(report)
    }

    async fn load_previous(&self) -> TrackMap {
        self.store.load_snapshot().await.unwrap_or_else(|e| {
            log::warn!("Snapshot unreadable ({}); treating every track as new", e);
            TrackMap::new()
        })
    }

    async fn save_current(&self, current: &TrackMap) -> bool {
        match self.store.save_snapshot(current).await {
            Ok(meta) => {
                log::debug!("Saved {} tracks to {}", meta.count, meta.location);
                true
            }
            Err(e) => {
                log::error!("Failed to save snapshot: {}", e);
                false
            }
        }
    }
}

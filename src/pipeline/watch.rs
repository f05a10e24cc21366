// src/pipeline/watch.rs

//! Polling loop.

use std::time::Duration;

use crate::pipeline::cycle::{CycleReport, CycleRunner};
use crate::services::{CatalogSource, WebhookTransport};
use crate::storage::SnapshotStore;
use crate::utils::log as console;

/// Totals across the cycles run by [`run_watch`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchSummary {
    pub cycles: u64,
    pub failed_cycles: u64,
    pub delivered: usize,
}

impl WatchSummary {
    fn record(&mut self, report: &CycleReport) {
        self.delivered += report.delivered;
    }
}

/// Run cycles back to back, pausing `interval` after each one.
///
/// Cycles never overlap: the pause starts only after a cycle, including all
/// of its deliveries, has finished. A failed cycle is logged and the loop
/// carries on. With `max_cycles = None` this never returns.
pub async fn run_watch<C, S, T>(
    runner: &CycleRunner<C, S, T>,
    interval: Duration,
    max_cycles: Option<u64>,
) -> WatchSummary
where
    C: CatalogSource,
    S: SnapshotStore,
    T: WebhookTransport,
{
    let mut totals = WatchSummary::default();

    loop {
        totals.cycles += 1;
        log::debug!("Starting cycle {}", totals.cycles);

        match runner.run_cycle().await {
            Ok(report) => {
                if report.notified() > 0 {
                    console::summary("Cycle complete", &report.summary_items());
                }
                totals.record(&report);
            }
            Err(e) => {
                totals.failed_cycles += 1;
                log::error!("Cycle {} aborted: {}", totals.cycles, e);
            }
        }

        if max_cycles.is_some_and(|max| totals.cycles >= max) {
            return totals;
        }
        tokio::time::sleep(interval).await;
    }
}

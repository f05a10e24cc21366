//! Pipeline entry points for watcher operations.
//!
//! - `diff`: classify tracks against the last snapshot
//! - `format`: render changes into webhook payloads
//! - `cycle`: run one fetch-detect-notify-persist pass
//! - `watch`: repeat cycles on the polling interval

pub mod cycle;
pub mod diff;
pub mod format;
pub mod watch;

pub use cycle::{CycleReport, CycleRunner};
pub use diff::{DiffResult, detect_changes, fingerprint};
pub use format::{DifficultyScale, Formatter, difficulty_bar, format_duration};
pub use watch::{WatchSummary, run_watch};

//! Change classification.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Track;

/// How a track relates to the previous snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Id absent from the previous snapshot
    New,
    /// Id present but content differs
    Modified,
    /// Id present and content identical
    Unchanged,
}

impl ChangeKind {
    /// Whether this change produces a notification.
    pub fn is_notifiable(&self) -> bool {
        !matches!(self, ChangeKind::Unchanged)
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ChangeKind::New => "new",
            ChangeKind::Modified => "modified",
            ChangeKind::Unchanged => "unchanged",
        };
        f.write_str(label)
    }
}

/// A track paired with its classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub track: Track,
    pub kind: ChangeKind,
}

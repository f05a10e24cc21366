//! Track data structure.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Placeholder for missing text fields.
pub const UNKNOWN: &str = "Unknown";

/// Placeholder for a missing song reference.
pub const NOT_AVAILABLE: &str = "N/A";

/// Tracks keyed by their stable identifier.
pub type TrackMap = BTreeMap<String, Track>;

/// A named difficulty channel.
///
/// Declaration order is the canonical display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DifficultyChannel {
    #[serde(rename = "pb")]
    Lead,
    #[serde(rename = "pd")]
    Drums,
    #[serde(rename = "vl")]
    Vocals,
    #[serde(rename = "ba")]
    Bass,
    #[serde(rename = "pg")]
    ProLead,
    #[serde(rename = "ds")]
    ProDrums,
    #[serde(rename = "bd")]
    ProVocals,
}

impl DifficultyChannel {
    /// Every channel in canonical order.
    pub const ALL: [DifficultyChannel; 7] = [
        DifficultyChannel::Lead,
        DifficultyChannel::Drums,
        DifficultyChannel::Vocals,
        DifficultyChannel::Bass,
        DifficultyChannel::ProLead,
        DifficultyChannel::ProDrums,
        DifficultyChannel::ProVocals,
    ];

    /// Upstream key for this channel.
    pub fn code(&self) -> &'static str {
        match self {
            DifficultyChannel::Lead => "pb",
            DifficultyChannel::Drums => "pd",
            DifficultyChannel::Vocals => "vl",
            DifficultyChannel::Bass => "ba",
            DifficultyChannel::ProLead => "pg",
            DifficultyChannel::ProDrums => "ds",
            DifficultyChannel::ProVocals => "bd",
        }
    }

    /// Human-readable channel name.
    pub fn display_name(&self) -> &'static str {
        match self {
            DifficultyChannel::Lead => "Lead",
            DifficultyChannel::Drums => "Drums",
            DifficultyChannel::Vocals => "Vocals",
            DifficultyChannel::Bass => "Bass",
            DifficultyChannel::ProLead => "Pro Lead",
            DifficultyChannel::ProDrums => "Pro Drums",
            DifficultyChannel::ProVocals => "Pro Vocals",
        }
    }

    /// Look up a channel by its upstream key.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }
}

impl fmt::Display for DifficultyChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A catalog track in canonical form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Track {
    /// Stable identifier (sole identity key across cycles)
    pub id: String,

    /// Track title
    pub title: String,

    /// Performing artist
    pub artist: String,

    /// Content rating code (e.g. "T")
    #[serde(default)]
    pub rating_code: Option<String>,

    /// Composite song reference (e.g. "SparksSong:faint")
    #[serde(default)]
    pub external_ref: Option<String>,

    /// Length in seconds
    #[serde(default)]
    pub duration_secs: u64,

    /// ISO-8601 date the track became active
    #[serde(default)]
    pub active_date: Option<String>,

    /// Upstream modification stamp
    #[serde(default)]
    pub last_modified: Option<String>,

    /// Raw difficulty level per channel
    #[serde(default)]
    pub difficulties: BTreeMap<DifficultyChannel, i64>,

    /// Album art URL
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

impl Track {
    /// Create a track with placeholder fields.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: UNKNOWN.to_string(),
            artist: UNKNOWN.to_string(),
            rating_code: None,
            external_ref: None,
            duration_secs: 0,
            active_date: None,
            last_modified: None,
            difficulties: BTreeMap::new(),
            thumbnail_url: None,
        }
    }

    /// Display form of the external reference: the segment after the last `:`.
    pub fn display_ref(&self) -> &str {
        self.external_ref
            .as_deref()
            .and_then(|r| r.rsplit(':').next())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(NOT_AVAILABLE)
    }

    /// Raw difficulty for a channel; missing channels read as 0.
    pub fn raw_difficulty(&self, channel: DifficultyChannel) -> i64 {
        self.difficulties.get(&channel).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_ref() {
        let mut track = Track::new("abc");
        assert_eq!(track.display_ref(), "N/A");

        track.external_ref = Some("SparksSong:faint".to_string());
        assert_eq!(track.display_ref(), "faint");

        track.external_ref = Some("a:b:c".to_string());
        assert_eq!(track.display_ref(), "c");

        track.external_ref = Some("plain".to_string());
        assert_eq!(track.display_ref(), "plain");

        track.external_ref = Some("SparksSong:".to_string());
        assert_eq!(track.display_ref(), "N/A");
    }

    #[test]
    fn test_channel_codes_round_trip() {
        for channel in DifficultyChannel::ALL {
            assert_eq!(DifficultyChannel::from_code(channel.code()), Some(channel));
        }
        assert_eq!(DifficultyChannel::from_code("gr"), None);
    }

    #[test]
    fn test_channel_serializes_as_code() {
        let mut track = Track::new("abc");
        track.difficulties.insert(DifficultyChannel::ProVocals, 4);

        let json = serde_json::to_value(&track).unwrap();
        assert_eq!(json["difficulties"]["bd"], 4);

        let back: Track = serde_json::from_value(json).unwrap();
        assert_eq!(back, track);
    }

    #[test]
    fn test_missing_difficulty_reads_zero() {
        let track = Track::new("abc");
        assert_eq!(track.raw_difficulty(DifficultyChannel::Bass), 0);
    }
}

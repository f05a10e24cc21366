//! Rendering of detected changes into webhook payloads.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::models::{
    ChangeKind, DifficultyChannel, DisplayConfig, Embed, EmbedField, EmbedThumbnail, Track,
    UNKNOWN, WebhookPayload,
};

/// Number of glyphs in a difficulty bar.
pub const MAX_BLOCKS: u8 = 7;

const FILLED: char = '▰';
const EMPTY: char = '▱';

/// Per-title difficulty calibration.
#[derive(Debug, Clone)]
pub struct DifficultyScale {
    default_offset: i64,
    offsets: HashMap<String, HashMap<DifficultyChannel, i64>>,
}

impl DifficultyScale {
    /// Build a scale from a title -> channel code -> offset table.
    ///
    /// Unknown channel codes are ignored.
    pub fn new(default_offset: i64, table: &BTreeMap<String, BTreeMap<String, i64>>) -> Self {
        let offsets: HashMap<String, HashMap<DifficultyChannel, i64>> = table
            .iter()
            .map(|(title, per_channel)| {
                let per_channel: HashMap<DifficultyChannel, i64> = per_channel
                    .iter()
                    .filter_map(|(code, offset)| {
                        DifficultyChannel::from_code(code).map(|channel| (channel, *offset))
                    })
                    .collect();
                (title.trim().to_string(), per_channel)
            })
            .collect();

        Self {
            default_offset,
            offsets,
        }
    }

    /// Offset for a title and channel, falling back to the default.
    pub fn offset(&self, title: &str, channel: DifficultyChannel) -> i64 {
        self.offsets
            .get(title.trim())
            .and_then(|per_channel| per_channel.get(&channel))
            .copied()
            .unwrap_or(self.default_offset)
    }

    /// Calibrated level in `0..=MAX_BLOCKS`.
    pub fn adjust(&self, title: &str, channel: DifficultyChannel, raw: i64) -> u8 {
        let adjusted = raw.saturating_add(self.offset(title, channel));
        adjusted.clamp(0, i64::from(MAX_BLOCKS)) as u8
    }
}

impl Default for DifficultyScale {
    fn default() -> Self {
        let display = DisplayConfig::default();
        Self::new(display.default_offset, &display.offsets)
    }
}

/// Render a bar of exactly `MAX_BLOCKS` glyphs with `level` filled.
pub fn difficulty_bar(level: u8) -> String {
    let filled = level.min(MAX_BLOCKS) as usize;
    let empty = MAX_BLOCKS as usize - filled;
    std::iter::repeat_n(FILLED, filled)
        .chain(std::iter::repeat_n(EMPTY, empty))
        .collect()
}

/// Render a duration as `M minutes and S seconds`.
pub fn format_duration(seconds: u64) -> String {
    format!("{} minutes and {} seconds", seconds / 60, seconds % 60)
}

/// Parse an ISO-8601 timestamp into Unix seconds.
///
/// Accepts RFC 3339 timestamps, naive date-times (read as UTC) and plain dates.
pub fn parse_timestamp(value: &str) -> Option<i64> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.timestamp());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.and_utc().timestamp());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp())
}

/// Builds webhook payloads from tracks.
#[derive(Debug, Clone)]
pub struct Formatter {
    enabled: Vec<DifficultyChannel>,
    scale: DifficultyScale,
    ratings: BTreeMap<String, String>,
}

impl Formatter {
    /// Create a formatter from display settings.
    pub fn new(display: &DisplayConfig) -> Self {
        let mut enabled = display.enabled_channels.clone();
        enabled.sort();
        enabled.dedup();

        Self {
            enabled,
            scale: DifficultyScale::new(display.default_offset, &display.offsets),
            ratings: display.ratings.clone(),
        }
    }

    /// Render a change using the current wall-clock time as fallback date.
    pub fn format(&self, track: &Track, kind: ChangeKind) -> WebhookPayload {
        self.format_at(track, kind, Utc::now())
    }

    /// Render a change, using `now` when the track has no usable active date.
    pub fn format_at(&self, track: &Track, kind: ChangeKind, now: DateTime<Utc>) -> WebhookPayload {
        let title = match kind {
            ChangeKind::Modified => "Updated Track Detected",
            _ => "New Track Detected",
        };

        let fields = vec![
            EmbedField::new("Jam Track", &track.title, false),
            EmbedField::new("Artist", &track.artist, false),
            EmbedField::new("Rating", self.rating_label(track), true),
            EmbedField::new("Song ID", format!("```{}```", track.display_ref()), true),
            EmbedField::new(
                "Active Date",
                format!("<t:{}:f>", self.active_timestamp(track, now)),
                true,
            ),
            EmbedField::new("Duration", format_duration(track.duration_secs), true),
            EmbedField::new("Difficulty Chart", self.difficulty_chart(track), false),
        ];

        WebhookPayload {
            embeds: vec![Embed {
                title: title.to_string(),
                thumbnail: track
                    .thumbnail_url
                    .as_ref()
                    .map(|url| EmbedThumbnail { url: url.clone() }),
                fields,
            }],
        }
    }

    /// Rating description, or `Unknown` for codes outside the vocabulary.
    pub fn rating_label(&self, track: &Track) -> &str {
        track
            .rating_code
            .as_deref()
            .and_then(|code| self.ratings.get(code))
            .map(String::as_str)
            .unwrap_or(UNKNOWN)
    }

    /// Unix timestamp of the active date, or `now` when absent or unparseable.
    pub fn active_timestamp(&self, track: &Track, now: DateTime<Utc>) -> i64 {
        match track.active_date.as_deref() {
            Some(raw) => parse_timestamp(raw).unwrap_or_else(|| {
                log::debug!("Unparseable active date '{}' for {}; using now", raw, track.id);
                now.timestamp()
            }),
            None => now.timestamp(),
        }
    }

    /// One `**Name:** bar` line per enabled channel, in canonical order.
    pub fn difficulty_chart(&self, track: &Track) -> String {
        self.enabled
            .iter()
            .map(|&channel| {
                let level = self
                    .scale
                    .adjust(&track.title, channel, track.raw_difficulty(channel));
                format!("**{}:** {}", channel.display_name(), difficulty_bar(level))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// src/services/normalize.rs

//! Catalog normalizer.
//!
//! Turns the loosely structured catalog document into canonical [`Track`]s.
//! Every extraction failure degrades to a default value; nothing here can
//! fail or panic on unexpected shapes.

use serde_json::{Map, Value};

use crate::models::{DifficultyChannel, Track, TrackMap, UNKNOWN};

/// Prefix marking document-level metadata keys.
const METADATA_SIGIL: char = '_';

/// Key of the nested record in a wrapped entry.
const WRAPPED_KEY: &str = "track";

/// Outer-record fields copied into each extracted entry.
const ACTIVE_DATE_KEY: &str = "_activeDate";
const LAST_MODIFIED_KEY: &str = "lastModified";

/// Upstream field names.
mod fields {
    pub const ID: &str = "su";
    pub const TITLE: &str = "tt";
    pub const ARTIST: &str = "an";
    pub const RATING: &str = "ar";
    pub const REFERENCE: &str = "ti";
    pub const DURATION: &str = "dn";
    pub const DIFFICULTIES: &str = "in";
    pub const THUMBNAIL: &str = "au";
}

/// Extract the raw entries of a catalog document.
///
/// Metadata keys and non-object values are skipped. Wrapped entries
/// (`{"track": {...}}`) are unwrapped, and the outer record's active date and
/// modification stamp are copied into the result.
pub fn extract_entries(document: &Value) -> Vec<Map<String, Value>> {
    let Some(root) = document.as_object() else {
        log::warn!("Catalog document is not an object; nothing to extract");
        return Vec::new();
    };

    let mut entries = Vec::new();
    for (key, value) in root {
        if key.starts_with(METADATA_SIGIL) {
            continue;
        }
        let Some(outer) = value.as_object() else {
            log::debug!("Skipping non-record catalog key '{}'", key);
            continue;
        };

        let mut entry = match outer.get(WRAPPED_KEY).and_then(Value::as_object) {
            Some(inner) => inner.clone(),
            None => outer.clone(),
        };
        for context_key in [ACTIVE_DATE_KEY, LAST_MODIFIED_KEY] {
            let context = outer.get(context_key).cloned().unwrap_or(Value::Null);
            entry.insert(context_key.to_string(), context);
        }
        entries.push(entry);
    }
    entries
}

/// Map one raw entry to a track. Entries without an id yield `None`.
pub fn to_track(entry: &Map<String, Value>) -> Option<Track> {
    let id = non_empty_str(entry, fields::ID)?;

    let mut track = Track::new(id);
    track.title = str_or_unknown(entry, fields::TITLE);
    track.artist = str_or_unknown(entry, fields::ARTIST);
    track.rating_code = non_empty_str(entry, fields::RATING);
    track.external_ref = non_empty_str(entry, fields::REFERENCE);
    track.duration_secs = entry.get(fields::DURATION).and_then(whole_u64).unwrap_or(0);
    track.active_date = non_empty_str(entry, ACTIVE_DATE_KEY);
    track.last_modified = non_empty_str(entry, LAST_MODIFIED_KEY);
    track.thumbnail_url = non_empty_str(entry, fields::THUMBNAIL);

    if let Some(levels) = entry.get(fields::DIFFICULTIES).and_then(Value::as_object) {
        for (code, level) in levels {
            let channel = DifficultyChannel::from_code(code);
            let raw = whole_i64(level);
            if let (Some(channel), Some(raw)) = (channel, raw) {
                track.difficulties.insert(channel, raw);
            }
        }
    }

    Some(track)
}

/// Normalize a catalog document into tracks keyed by id.
///
/// Entries without an id are dropped; when an id repeats, the entry that comes
/// later in the document wins.
pub fn normalize(document: &Value) -> TrackMap {
    let entries = extract_entries(document);
    let total = entries.len();

    let tracks: TrackMap = entries
        .iter()
        .filter_map(to_track)
        .map(|track| (track.id.clone(), track))
        .collect();

    if tracks.len() < total {
        log::debug!(
            "Normalized {} tracks from {} entries ({} without id or duplicated)",
            tracks.len(),
            total,
            total - tracks.len()
        );
    }
    tracks
}

fn non_empty_str(entry: &Map<String, Value>, key: &str) -> Option<String> {
    entry
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Integer value of a whole number. Values past `i64::MAX` saturate so they
/// still clamp to a full bar downstream.
fn whole_i64(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    if value.as_u64().is_some() {
        return Some(i64::MAX);
    }
    value
        .as_f64()
        .filter(|f| f.is_finite() && f.fract() == 0.0)
        .map(|f| f as i64)
}

/// Non-negative whole number, saturating at `u64::MAX`.
fn whole_u64(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    value
        .as_f64()
        .filter(|f| f.is_finite() && f.fract() == 0.0 && *f >= 0.0)
        .map(|f| f as u64)
}

fn str_or_unknown(entry: &Map<String, Value>, key: &str) -> String {
    non_empty_str(entry, key).unwrap_or_else(|| UNKNOWN.to_string())
}

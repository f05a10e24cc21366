//! Change detection between the current catalog and the last snapshot.
//!
//! Every current track is classified as new, modified or unchanged. Tracks
//! present only in the snapshot are listed as removed for logging; they never
//! produce notifications.

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::models::{Change, ChangeKind, Track, TrackMap};

/// Result of comparing two snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffResult {
    /// One entry per current track, ordered by id
    pub changes: Vec<Change>,
    /// Ids that disappeared upstream
    pub removed: Vec<String>,
}

impl DiffResult {
    /// Changes that should be notified, in order.
    pub fn notifiable(&self) -> impl Iterator<Item = &Change> {
        self.changes.iter().filter(|c| c.kind.is_notifiable())
    }

    /// Number of changes of the given kind.
    pub fn count(&self, kind: ChangeKind) -> usize {
        self.changes.iter().filter(|c| c.kind == kind).count()
    }

    /// Check if anything needs to be notified.
    pub fn has_changes(&self) -> bool {
        self.notifiable().next().is_some()
    }

    /// Classification sequence as `(id, kind)` pairs.
    pub fn kinds(&self) -> Vec<(&str, ChangeKind)> {
        self.changes
            .iter()
            .map(|c| (c.track.id.as_str(), c.kind))
            .collect()
    }
}

/// Canonical fingerprint of a track.
///
/// The track is serialized to JSON with sorted keys, so the digest depends
/// only on field values, never on field or map order.
pub fn fingerprint(track: &Track) -> String {
    let canonical = serde_json::to_value(track)
        .and_then(|value| serde_json::to_vec(&sort_keys(value)))
        .unwrap_or_default();
    hex::encode(Sha256::digest(&canonical))
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(entries.into_iter().map(|(k, v)| (k, sort_keys(v))).collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

/// Classify one track against the previous snapshot.
pub fn classify(track: &Track, previous: &TrackMap) -> ChangeKind {
    match previous.get(&track.id) {
        None => ChangeKind::New,
        Some(old) if fingerprint(old) != fingerprint(track) => ChangeKind::Modified,
        Some(_) => ChangeKind::Unchanged,
    }
}

/// Compare the current tracks against the previous snapshot.
pub fn detect_changes(current: &TrackMap, previous: &TrackMap) -> DiffResult {
    let changes = current
        .values()
        .map(|track| Change {
            kind: classify(track, previous),
            track: track.clone(),
        })
        .collect();

    let removed = previous
        .keys()
        .filter(|id| !current.contains_key(*id))
        .cloned()
        .collect();

    DiffResult { changes, removed }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DifficultyChannel;

    fn make_track(id: &str, title: &str, duration: u64) -> Track {
        let mut track = Track::new(id);
        track.title = title.to_string();
        track.artist = "Artist".to_string();
        track.duration_secs = duration;
        track.difficulties.insert(DifficultyChannel::Lead, 2);
        track.difficulties.insert(DifficultyChannel::Bass, 3);
        track
    }

    fn map(tracks: Vec<Track>) -> TrackMap {
        tracks.into_iter().map(|t| (t.id.clone(), t)).collect()
    }

    #[test]
    fn test_empty_previous_all_new() {
        let current = map(vec![make_track("001", "One", 100), make_track("002", "Two", 200)]);

        let result = detect_changes(&current, &TrackMap::new());
        assert_eq!(result.count(ChangeKind::New), 2);
        assert!(result.has_changes());
        assert!(result.removed.is_empty());
    }

    #[test]
    fn test_new_then_unchanged() {
        let current = map(vec![make_track("001", "One", 100), make_track("002", "Two", 200)]);

        let first = detect_changes(&current, &TrackMap::new());
        assert!(first.changes.iter().all(|c| c.kind == ChangeKind::New));

        let second = detect_changes(&current, &current);
        assert!(second.changes.iter().all(|c| c.kind == ChangeKind::Unchanged));
        assert!(!second.has_changes());
    }

    #[test]
    fn test_duration_change_is_modified() {
        let previous = map(vec![
            make_track("001", "One", 100),
            make_track("002", "Two", 200),
            make_track("003", "Three", 300),
        ]);
        let mut current = previous.clone();
        current.get_mut("002").unwrap().duration_secs = 201;

        let result = detect_changes(&current, &previous);
        assert_eq!(
            result.kinds(),
            vec![
                ("001", ChangeKind::Unchanged),
                ("002", ChangeKind::Modified),
                ("003", ChangeKind::Unchanged),
            ]
        );
        let notified: Vec<_> = result.notifiable().map(|c| c.track.id.as_str()).collect();
        assert_eq!(notified, vec!["002"]);
    }

    #[test]
    fn test_detection_is_idempotent() {
        let previous = map(vec![make_track("001", "One", 100), make_track("002", "Two", 200)]);
        let current = map(vec![make_track("001", "Uno", 100), make_track("003", "Three", 300)]);

        let first = detect_changes(&current, &previous);
        let second = detect_changes(&current, &previous);
        assert_eq!(first, second);
    }

    #[test]
    fn test_removed_tracks_are_listed_not_notified() {
        let previous = map(vec![make_track("001", "One", 100), make_track("002", "Two", 200)]);
        let current = map(vec![make_track("001", "One", 100)]);

        let result = detect_changes(&current, &previous);
        assert_eq!(result.removed, vec!["002"]);
        assert_eq!(result.changes.len(), 1);
        assert!(!result.has_changes());
    }

    #[test]
    fn test_last_modified_bump_is_modified() {
        let previous = map(vec![make_track("001", "One", 100)]);
        let mut current = previous.clone();
        current.get_mut("001").unwrap().last_modified = Some("2024-10-02T00:00:00Z".into());

        let result = detect_changes(&current, &previous);
        assert_eq!(result.count(ChangeKind::Modified), 1);
    }

    #[test]
    fn test_fingerprint_ignores_insertion_order() {
        let mut a = Track::new("x");
        a.difficulties.insert(DifficultyChannel::Drums, 1);
        a.difficulties.insert(DifficultyChannel::Lead, 4);

        let mut b = Track::new("x");
        b.difficulties.insert(DifficultyChannel::Lead, 4);
        b.difficulties.insert(DifficultyChannel::Drums, 1);

        assert_eq!(fingerprint(&a), fingerprint(&b));
        assert_eq!(fingerprint(&a).len(), 64);

        b.difficulties.insert(DifficultyChannel::Drums, 2);
        assert_ne!(fingerprint(&a), fingerprint(&b));
    }
}

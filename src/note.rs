//! Core data structures for the notekeep application.
//!
//! This module contains the primary types used throughout the application:
//! the [`Note`] record itself and the [`NoteSnapshot`] persisted form.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Format version written into every persisted snapshot.
pub const SNAPSHOT_VERSION: &str = "1.0.0";

// Tie-breaker for notes created within the same millisecond.
static NOTE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Represents a single note in our system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Unique identifier for the note, immutable after creation
    pub id: String,
    /// Note title
    pub title: String,
    /// Note content in Markdown format
    pub content: String,
    /// Tags for organization: lowercase, trimmed, no duplicates,
    /// most recently added first
    pub tags: Vec<String>,
    /// When the note was created, never mutated afterwards
    pub created_at: DateTime<Utc>,
    /// Last modification time; drives the default (descending) sort
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Creates a new note with the given title, content and tags.
    ///
    /// Tags are normalized (trimmed, lowercased, empties and duplicates
    /// dropped). Both timestamps are set to the same instant.
    pub fn new(title: impl Into<String>, content: impl Into<String>, tags: Vec<String>) -> Self {
        let title = title.into();
        let now = Utc::now();
        // Millisecond timestamp plus a process-wide sequence number plus a
        // title slug keeps ids unique even for rapid identical creations.
        let seq = NOTE_SEQ.fetch_add(1, Ordering::Relaxed);
        let id = format!(
            "{}-{:04x}-{}",
            now.timestamp_millis(),
            seq,
            slugify(&title)
        );

        let mut note = Note {
            id,
            title,
            content: content.into(),
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        for tag in tags {
            note.add_tag(&tag);
        }
        // Initial tags keep their given order; add_tag front-inserts.
        note.tags.reverse();
        note
    }

    /// Normalizes and front-inserts a tag; returns `false` when the tag is
    /// empty after normalization or already present.
    pub fn add_tag(&mut self, raw: &str) -> bool {
        let Some(tag) = normalize_tag(raw) else {
            return false;
        };
        if self.tags.contains(&tag) {
            return false;
        }
        self.tags.insert(0, tag);
        true
    }

    /// Removes a tag (matched after normalization); returns `false` if the
    /// note did not carry it.
    pub fn remove_tag(&mut self, raw: &str) -> bool {
        let Some(tag) = normalize_tag(raw) else {
            return false;
        };
        let before = self.tags.len();
        self.tags.retain(|t| t != &tag);
        self.tags.len() != before
    }

    /// Checks whether the note carries a tag (exact match against stored,
    /// already-normalized tags).
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Stamps the note as mutated now. Called by an adapter when it commits
    /// a write, so `updated_at` always reflects the commit instant.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Trims and lowercases a raw tag, returning `None` for empties.
pub fn normalize_tag(raw: &str) -> Option<String> {
    let tag = raw.trim().to_lowercase();
    if tag.is_empty() {
        None
    } else {
        Some(tag)
    }
}

fn slugify(title: &str) -> String {
    title.to_lowercase().replace(' ', "-")
}

/// The full serialized set of notes plus a format version, as persisted by
/// the local adapter.
///
/// The version string exists to allow future migrations; there is currently
/// a single version and no migration logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteSnapshot {
    /// All notes in the collection
    pub notes: Vec<Note>,
    /// Snapshot format version, currently always [`SNAPSHOT_VERSION`]
    pub version: String,
}

impl NoteSnapshot {
    /// An empty snapshot at the current format version.
    pub fn empty() -> Self {
        NoteSnapshot {
            notes: Vec::new(),
            version: SNAPSHOT_VERSION.to_string(),
        }
    }
}

impl Default for NoteSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_note_sets_equal_timestamps() {
        let note = Note::new("First", "", Vec::new());
        assert_eq!(note.created_at, note.updated_at);
    }

    #[test]
    fn ids_are_unique_for_rapid_identical_creates() {
        let a = Note::new("Untitled Note", "", Vec::new());
        let b = Note::new("Untitled Note", "", Vec::new());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn tags_are_normalized_and_deduplicated() {
        let note = Note::new(
            "t",
            "",
            vec![
                "  Rust ".to_string(),
                "rust".to_string(),
                "".to_string(),
                "Ideas".to_string(),
            ],
        );
        assert_eq!(note.tags, vec!["rust", "ideas"]);
    }

    #[test]
    fn add_tag_front_inserts_and_rejects_duplicates() {
        let mut note = Note::new("t", "", vec!["old".to_string()]);
        assert!(note.add_tag("New"));
        assert_eq!(note.tags, vec!["new", "old"]);
        assert!(!note.add_tag(" new "));
        assert!(!note.add_tag("   "));
        assert_eq!(note.tags.len(), 2);
    }

    #[test]
    fn remove_tag_matches_normalized_form() {
        let mut note = Note::new("t", "", vec!["rust".to_string()]);
        assert!(note.remove_tag(" RUST "));
        assert!(note.tags.is_empty());
        assert!(!note.remove_tag("rust"));
    }

    #[test]
    fn touch_never_decreases_updated_at() {
        let mut note = Note::new("t", "", Vec::new());
        let created = note.created_at;
        note.touch();
        assert!(note.updated_at >= created);
    }

    #[test]
    fn snapshot_roundtrips_through_json() {
        let snapshot = NoteSnapshot {
            notes: vec![Note::new("a", "body", vec!["x".to_string()])],
            version: SNAPSHOT_VERSION.to_string(),
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: NoteSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }
}

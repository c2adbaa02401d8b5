//! Local snapshot persistence.
//!
//! Stores the whole note collection as one versioned JSON document in a
//! single file, the durable per-device fallback to the remote backend.
//! Reads tolerate corruption (start fresh, log it); writes are atomic and
//! report capacity failures as a distinct error kind.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::{debug, info, warn};
use tempfile::NamedTempFile;

use crate::{
    normalize_tag, query, Note, NoteError, NoteSnapshot, PersistenceAdapter, Result,
};

/// Snapshot-file persistence for a single-user, single-process collection.
///
/// Every convenience operation re-reads and re-writes the full snapshot;
/// there is no partial update and no cross-process locking. Concurrent
/// writers must serialize through one `LocalSnapshotStore` owner or risk
/// lost updates.
pub struct LocalSnapshotStore {
    path: PathBuf,
}

impl LocalSnapshotStore {
    /// Creates a store backed by the given snapshot file. The file and its
    /// parent directory are created lazily on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the current snapshot.
    ///
    /// A missing file or an unparseable payload yields an empty snapshot at
    /// the current version; corruption is non-actionable for the user, so
    /// it is logged and treated as "start fresh" rather than surfaced.
    pub fn read(&self) -> NoteSnapshot {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No snapshot at {}, starting empty", self.path.display());
                return NoteSnapshot::empty();
            }
            Err(e) => {
                warn!("Failed to read snapshot {}: {}", self.path.display(), e);
                return NoteSnapshot::empty();
            }
        };

        match serde_json::from_str::<NoteSnapshot>(&raw) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(
                    "Snapshot {} is corrupt ({}), starting empty",
                    self.path.display(),
                    e
                );
                NoteSnapshot::empty()
            }
        }
    }

    /// Serializes and stores a snapshot atomically.
    ///
    /// The payload is written to a temp file in the target directory and
    /// renamed into place, so a crash mid-write never corrupts the previous
    /// snapshot. Capacity failures map to [`NoteError::QuotaExceeded`]; all
    /// other failures to [`NoteError::Persistence`].
    pub fn write(&self, snapshot: &NoteSnapshot) -> Result<()> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        if !dir.exists() {
            fs::create_dir_all(dir).map_err(map_write_err)?;
        }

        let json = serde_json::to_string_pretty(snapshot)?;

        let mut temp = NamedTempFile::new_in(dir).map_err(map_write_err)?;
        temp.write_all(json.as_bytes()).map_err(map_write_err)?;
        temp.flush().map_err(map_write_err)?;
        temp.persist(&self.path)
            .map_err(|e| map_write_err(e.error))?;

        debug!(
            "Wrote snapshot with {} notes to {}",
            snapshot.notes.len(),
            self.path.display()
        );
        Ok(())
    }

    /// All notes, most recently updated first.
    pub fn all(&self) -> Vec<Note> {
        let mut notes = self.read().notes;
        notes.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        notes
    }

    /// Inserts or replaces a note by id.
    pub fn upsert(&self, note: &Note) -> Result<()> {
        let mut snapshot = self.read();
        match snapshot.notes.iter_mut().find(|n| n.id == note.id) {
            Some(existing) => *existing = note.clone(),
            None => snapshot.notes.push(note.clone()),
        }
        self.write(&snapshot)
    }

    /// Removes a note by id; removing an absent id is a no-op.
    pub fn delete_by_id(&self, id: &str) -> Result<()> {
        let mut snapshot = self.read();
        let before = snapshot.notes.len();
        snapshot.notes.retain(|note| note.id != id);
        if snapshot.notes.len() == before {
            debug!("delete_by_id: {} not present in snapshot", id);
        }
        self.write(&snapshot)
    }

    /// Looks a note up by id.
    pub fn find_by_id(&self, id: &str) -> Option<Note> {
        self.read().notes.into_iter().find(|note| note.id == id)
    }

    /// Substring search over title, content and tags (recency order).
    pub fn search(&self, query_text: &str) -> Vec<Note> {
        query::filter_notes(&self.all(), query_text, None)
    }

    /// Notes carrying the given tag (recency order).
    pub fn by_tag(&self, tag: &str) -> Vec<Note> {
        let tag = normalize_tag(tag);
        match tag {
            Some(tag) => query::filter_notes(&self.all(), "", Some(&tag)),
            None => Vec::new(),
        }
    }

    /// All distinct tags in the snapshot, sorted.
    pub fn all_tags(&self) -> Vec<String> {
        query::all_tags(&self.read().notes)
    }
}

fn map_write_err(e: std::io::Error) -> NoteError {
    match e.kind() {
        ErrorKind::StorageFull | ErrorKind::QuotaExceeded => NoteError::QuotaExceeded,
        _ => NoteError::Persistence {
            message: format!("snapshot write failed: {}", e),
        },
    }
}

/// The local file doubles as a [`PersistenceAdapter`] so the CLI can run the
/// same store code offline. The snapshot is inherently single-user, so the
/// owner id is ignored.
#[async_trait]
impl PersistenceAdapter for LocalSnapshotStore {
    async fn list_by_owner(&self, _owner_id: &str) -> Result<Vec<Note>> {
        Ok(self.all())
    }

    async fn insert(
        &self,
        _owner_id: &str,
        title: &str,
        content: &str,
        tags: &[String],
    ) -> Result<Note> {
        let note = Note::new(title, content, tags.to_vec());
        self.upsert(&note)?;
        info!("Created note {}", note.id);
        Ok(note)
    }

    async fn update_by_id(
        &self,
        id: &str,
        title: &str,
        content: &str,
        tags: &[String],
    ) -> Result<Note> {
        let mut snapshot = self.read();
        let note = snapshot
            .notes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| NoteError::NotFound { id: id.to_string() })?;

        note.title = title.to_string();
        note.content = content.to_string();
        note.tags = tags.to_vec();
        note.touch();
        let saved = note.clone();

        self.write(&snapshot)?;
        Ok(saved)
    }

    async fn delete_by_id(&self, id: &str) -> Result<()> {
        LocalSnapshotStore::delete_by_id(self, id)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Note>> {
        Ok(self.find_by_id(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store_in(dir: &Path) -> LocalSnapshotStore {
        LocalSnapshotStore::new(dir.join("notes.json"))
    }

    #[test]
    fn missing_file_reads_as_empty_current_version() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        let snapshot = store.read();
        assert!(snapshot.notes.is_empty());
        assert_eq!(snapshot.version, crate::SNAPSHOT_VERSION);
    }

    #[test]
    fn corrupt_file_reads_as_empty() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        fs::write(store.path(), "{ not json").unwrap();
        assert!(store.read().notes.is_empty());
    }

    #[test]
    fn write_then_read_roundtrips() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        let mut snapshot = NoteSnapshot::empty();
        snapshot
            .notes
            .push(Note::new("a", "# heading", vec!["x".to_string()]));

        store.write(&snapshot).unwrap();
        assert_eq!(store.read(), snapshot);
        // Idempotent: writing what was read changes nothing.
        store.write(&store.read()).unwrap();
        assert_eq!(store.read(), snapshot);
    }

    #[test]
    fn upsert_replaces_by_id() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        let mut note = Note::new("a", "one", Vec::new());
        store.upsert(&note).unwrap();

        note.content = "two".to_string();
        store.upsert(&note).unwrap();

        let notes = store.read().notes;
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].content, "two");
    }

    #[test]
    fn delete_removes_only_the_target() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        let keep = Note::new("keep", "", Vec::new());
        let gone = Note::new("gone", "", Vec::new());
        store.upsert(&keep).unwrap();
        store.upsert(&gone).unwrap();

        LocalSnapshotStore::delete_by_id(&store, &gone.id).unwrap();
        assert!(store.find_by_id(&gone.id).is_none());
        assert!(store.find_by_id(&keep.id).is_some());
    }

    #[test]
    fn search_and_by_tag_read_the_snapshot() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        store
            .upsert(&Note::new("apple pie", "", vec!["food".to_string()]))
            .unwrap();
        store
            .upsert(&Note::new("standup", "", vec!["work".to_string()]))
            .unwrap();

        assert_eq!(store.search("apple").len(), 1);
        assert_eq!(store.by_tag(" FOOD ").len(), 1);
        assert_eq!(store.all_tags(), vec!["food", "work"]);
    }

    #[tokio::test]
    async fn adapter_update_stamps_commit_time() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        let note = store.insert("local", "t", "", &[]).await.unwrap();

        let saved = store
            .update_by_id(&note.id, "t", "body", &[])
            .await
            .unwrap();
        assert!(saved.updated_at >= note.updated_at);
        assert_eq!(saved.created_at, note.created_at);
        assert_eq!(store.find_by_id(&note.id).unwrap().content, "body");
    }

    #[tokio::test]
    async fn adapter_update_of_unknown_id_is_not_found() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        let err = store.update_by_id("ghost", "t", "", &[]).await.unwrap_err();
        assert!(matches!(err, NoteError::NotFound { .. }));
    }

    #[test]
    fn write_failure_other_than_quota_is_persistence() {
        // Point the store at a path whose parent is a file, so directory
        // creation fails with a non-capacity error.
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "x").unwrap();
        let store = LocalSnapshotStore::new(blocker.join("notes.json"));
        let err = store.write(&NoteSnapshot::empty()).unwrap_err();
        assert!(matches!(err, NoteError::Persistence { .. }));
    }

    #[test]
    fn quota_kind_maps_to_quota_exceeded() {
        let err = map_write_err(std::io::Error::new(ErrorKind::StorageFull, "disk full"));
        assert!(matches!(err, NoteError::QuotaExceeded));
        let err = map_write_err(std::io::Error::other("boom"));
        assert!(matches!(err, NoteError::Persistence { .. }));
    }
}

//! The note store: the single authoritative in-memory source of truth for
//! the notes owned by the current session, plus the filter parameters that
//! produce the derived view the rest of the system renders.
//!
//! All mutating operations persist through the [`PersistenceAdapter`] first
//! and only touch memory on success, so memory never diverges from the
//! backend. The derived view is recomputed synchronously after every state
//! change via the pure functions in [`crate::query`].

use std::sync::Arc;

use log::{debug, info, warn};

use crate::{query, AuthProvider, Note, NoteError, PersistenceAdapter, Result};

/// Title given to notes created without one.
pub const DEFAULT_TITLE: &str = "Untitled Note";

/// In-memory note collection with a deterministically derived filtered view.
///
/// The store has an explicit lifecycle: construct it at app start, call
/// [`NoteStore::load_all`] once a session exists, and [`NoteStore::clear`]
/// at the sign-out boundary so no notes leak into the next session.
pub struct NoteStore {
    adapter: Arc<dyn PersistenceAdapter>,
    auth: Arc<dyn AuthProvider>,
    /// Authoritative set, kept sorted by `updated_at` descending
    notes: Vec<Note>,
    search_query: String,
    selected_tag: Option<String>,
    /// Derived view: always a subset of `notes`
    filtered: Vec<Note>,
    load_failed: bool,
}

impl NoteStore {
    pub fn new(adapter: Arc<dyn PersistenceAdapter>, auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            adapter,
            auth,
            notes: Vec::new(),
            search_query: String::new(),
            selected_tag: None,
            filtered: Vec::new(),
            load_failed: false,
        }
    }

    fn owner(&self, operation: &'static str) -> Result<String> {
        self.auth
            .current_user()
            .map(|user| user.id)
            .ok_or(NoteError::Unauthenticated { operation })
    }

    fn recompute_view(&mut self) {
        self.filtered =
            query::filter_notes(&self.notes, &self.search_query, self.selected_tag.as_deref());
    }

    fn sort_by_recency(&mut self) {
        self.notes.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    }

    /// Replaces the in-memory set with the owner's full note set.
    ///
    /// On adapter failure the store holds an empty set and raises its
    /// load-failed flag before surfacing the error, so callers render an
    /// empty list rather than stale notes.
    pub async fn load_all(&mut self) -> Result<usize> {
        let owner = self.owner("load_all")?;
        match self.adapter.list_by_owner(&owner).await {
            Ok(notes) => {
                self.notes = notes;
                self.sort_by_recency();
                self.load_failed = false;
                self.recompute_view();
                info!("Loaded {} notes for {}", self.notes.len(), owner);
                Ok(self.notes.len())
            }
            Err(e) => {
                warn!("Failed to load notes for {}: {}", owner, e);
                self.notes.clear();
                self.load_failed = true;
                self.recompute_view();
                Err(e)
            }
        }
    }

    /// True when the last [`NoteStore::load_all`] failed.
    pub fn load_failed(&self) -> bool {
        self.load_failed
    }

    /// Creates an empty note (default title, no content, no tags), persists
    /// it, and front-inserts it into the collection. Memory is untouched
    /// when persistence fails.
    pub async fn create(&mut self, title: Option<&str>) -> Result<Note> {
        let owner = self.owner("create")?;
        let title = title.unwrap_or(DEFAULT_TITLE);
        let note = self.adapter.insert(&owner, title, "", &[]).await?;
        info!("Created note {}", note.id);
        self.notes.insert(0, note.clone());
        self.recompute_view();
        Ok(note)
    }

    /// Persists the full record of an existing note (id and `created_at`
    /// are immutable) and replaces the in-memory entry with what the
    /// backend committed, re-sorting by recency.
    ///
    /// There is no version token: an update carrying a stale snapshot still
    /// overwrites last-writer-wins.
    pub async fn update(&mut self, note: &Note) -> Result<Note> {
        self.owner("update")?;
        let saved = self
            .adapter
            .update_by_id(&note.id, &note.title, &note.content, &note.tags)
            .await?;
        debug!("Updated note {}", saved.id);

        if let Some(entry) = self.notes.iter_mut().find(|n| n.id == saved.id) {
            *entry = saved.clone();
        } else {
            // Not loaded (e.g. fetched via get); adopt the committed copy.
            self.notes.push(saved.clone());
        }
        self.sort_by_recency();
        self.recompute_view();
        Ok(saved)
    }

    /// Deletes from persistence, then from memory. Memory is untouched if
    /// the backend deletion fails.
    pub async fn remove(&mut self, id: &str) -> Result<()> {
        self.owner("remove")?;
        self.adapter.delete_by_id(id).await?;
        info!("Deleted note {}", id);
        self.notes.retain(|note| note.id != id);
        self.recompute_view();
        Ok(())
    }

    /// Returns the cached copy if present, otherwise a single-item fetch
    /// from persistence. Absent notes (or notes not owned by the caller)
    /// are `Ok(None)`, never an error; without a session only the cache is
    /// consulted.
    pub async fn get(&self, id: &str) -> Result<Option<Note>> {
        if let Some(note) = self.notes.iter().find(|note| note.id == id) {
            return Ok(Some(note.clone()));
        }
        if self.auth.current_user().is_none() {
            return Ok(None);
        }
        self.adapter.get_by_id(id).await
    }

    /// Sets the search text and recomputes the derived view. No
    /// persistence side effect.
    pub fn set_search_query(&mut self, query_text: &str) {
        self.search_query = query_text.to_string();
        self.recompute_view();
    }

    /// Sets or clears the tag filter and recomputes the derived view. No
    /// persistence side effect.
    pub fn set_selected_tag(&mut self, tag: Option<&str>) {
        self.selected_tag = tag.map(|t| t.to_string());
        self.recompute_view();
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn selected_tag(&self) -> Option<&str> {
        self.selected_tag.as_deref()
    }

    /// The authoritative set, recency-descending.
    pub fn all_notes(&self) -> &[Note] {
        &self.notes
    }

    /// The derived view: the filtered, search-matched subset.
    pub fn filtered_notes(&self) -> &[Note] {
        &self.filtered
    }

    /// Distinct tags across the authoritative set, sorted.
    pub fn all_tags(&self) -> Vec<String> {
        query::all_tags(&self.notes)
    }

    /// Synchronous sign-out teardown: drops every held note before any
    /// further operation is accepted, so a previous owner's data cannot
    /// leak into the next session.
    pub fn clear(&mut self) {
        let dropped = self.notes.len();
        self.notes.clear();
        self.load_failed = false;
        self.recompute_view();
        debug!("Cleared {} notes from memory", dropped);
    }
}

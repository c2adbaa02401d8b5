//! Persistence boundary for the note store.
//!
//! The store never talks to a backend directly; every durable operation goes
//! through this trait so the local snapshot file and the remote HTTP table
//! are interchangeable, mutually exclusive backends.

use async_trait::async_trait;

use crate::{Note, Result};

/// Durable CRUD over notes, scoped by an opaque owner identity.
///
/// Implementations must treat `update_by_id` as a full-record write of the
/// mutable fields (title, content, tags) and stamp `updated_at` at commit
/// time. There is no version token: writes are last-writer-wins.
#[async_trait]
pub trait PersistenceAdapter: Send + Sync {
    /// Returns the owner's full note set, most recently updated first.
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Note>>;

    /// Creates a note and returns the stored record, timestamps included.
    async fn insert(
        &self,
        owner_id: &str,
        title: &str,
        content: &str,
        tags: &[String],
    ) -> Result<Note>;

    /// Overwrites the mutable fields of an existing note and returns the
    /// stored record. Fails with [`crate::NoteError::NotFound`] for unknown
    /// ids.
    async fn update_by_id(
        &self,
        id: &str,
        title: &str,
        content: &str,
        tags: &[String],
    ) -> Result<Note>;

    /// Deletes a note. Deleting an id that is already gone is not an error.
    async fn delete_by_id(&self, id: &str) -> Result<()>;

    /// Fetches a single note; `Ok(None)` when it does not exist or is not
    /// visible to the caller.
    async fn get_by_id(&self, id: &str) -> Result<Option<Note>>;
}

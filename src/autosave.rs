//! Debounced auto-save for content edits.
//!
//! The editor surface fires on every keystroke; the backend should not see
//! every keystroke. `Autosave` coalesces scheduled saves with an mpsc
//! channel and a quiet-period loop: only the last note scheduled within the
//! window is persisted. Dropping the handle closes the channel and cancels
//! anything still pending, so nothing saves after teardown.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use tokio::sync::mpsc;

use crate::{Note, PersistenceAdapter};

/// Default quiet period between the last edit and the save.
pub const DEFAULT_AUTOSAVE_DELAY_MS: u64 = 500;

/// Debounced writer of note edits.
pub struct Autosave {
    tx: mpsc::Sender<Note>,
}

impl Autosave {
    /// Spawns the background save loop. The task lives until the handle is
    /// dropped.
    pub fn new(adapter: Arc<dyn PersistenceAdapter>, delay_ms: u64) -> Self {
        let (tx, rx) = mpsc::channel::<Note>(64);
        tokio::spawn(Self::run_loop(adapter, rx, delay_ms));
        Self { tx }
    }

    /// Schedules a save of the note's current content. Non-blocking; a new
    /// call within the quiet period supersedes the previous one. If the
    /// channel is full the oldest pending edit is simply superseded later.
    pub fn schedule(&self, note: Note) {
        let _ = self.tx.try_send(note);
    }

    async fn run_loop(
        adapter: Arc<dyn PersistenceAdapter>,
        mut rx: mpsc::Receiver<Note>,
        delay_ms: u64,
    ) {
        let delay = Duration::from_millis(delay_ms);

        loop {
            // Wait for the first edit.
            let mut latest = match rx.recv().await {
                Some(note) => note,
                None => break, // channel closed, handle dropped
            };

            // Keep consuming edits until the quiet period elapses.
            loop {
                match tokio::time::timeout(delay, rx.recv()).await {
                    Ok(Some(note)) => latest = note,
                    Ok(None) => return, // dropped mid-burst: cancel the save
                    Err(_) => break,    // quiet period elapsed
                }
            }

            match adapter
                .update_by_id(&latest.id, &latest.title, &latest.content, &latest.tags)
                .await
            {
                Ok(saved) => debug!("Auto-saved note {} at {}", saved.id, saved.updated_at),
                Err(e) => warn!("Auto-save of note {} failed: {}", latest.id, e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NoteError, Result};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Adapter that records updates instead of persisting them.
    struct CountingAdapter {
        updates: AtomicU32,
        last_content: Mutex<String>,
    }

    impl CountingAdapter {
        fn new() -> Self {
            Self {
                updates: AtomicU32::new(0),
                last_content: Mutex::new(String::new()),
            }
        }
    }

    #[async_trait]
    impl PersistenceAdapter for CountingAdapter {
        async fn list_by_owner(&self, _owner_id: &str) -> Result<Vec<Note>> {
            Ok(Vec::new())
        }

        async fn insert(
            &self,
            _owner_id: &str,
            title: &str,
            content: &str,
            tags: &[String],
        ) -> Result<Note> {
            Ok(Note::new(title, content, tags.to_vec()))
        }

        async fn update_by_id(
            &self,
            _id: &str,
            title: &str,
            content: &str,
            tags: &[String],
        ) -> Result<Note> {
            self.updates.fetch_add(1, Ordering::SeqCst);
            *self.last_content.lock().unwrap() = content.to_string();
            Ok(Note::new(title, content, tags.to_vec()))
        }

        async fn delete_by_id(&self, _id: &str) -> Result<()> {
            Ok(())
        }

        async fn get_by_id(&self, _id: &str) -> Result<Option<Note>> {
            Err(NoteError::Persistence {
                message: "not used".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn rapid_edits_coalesce_into_one_save() {
        let adapter = Arc::new(CountingAdapter::new());
        let autosave = Autosave::new(
            Arc::clone(&adapter) as Arc<dyn PersistenceAdapter>,
            100,
        );

        let base = Note::new("draft", "", Vec::new());
        for i in 0..10 {
            let mut edit = base.clone();
            edit.content = format!("rev {}", i);
            autosave.schedule(edit);
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(adapter.updates.load(Ordering::SeqCst), 1);
        assert_eq!(*adapter.last_content.lock().unwrap(), "rev 9");
    }

    #[tokio::test]
    async fn separate_bursts_save_separately() {
        let adapter = Arc::new(CountingAdapter::new());
        let autosave = Autosave::new(
            Arc::clone(&adapter) as Arc<dyn PersistenceAdapter>,
            50,
        );
        let note = Note::new("draft", "one", Vec::new());

        autosave.schedule(note.clone());
        tokio::time::sleep(Duration::from_millis(150)).await;
        autosave.schedule(note);
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(adapter.updates.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn dropping_the_handle_cancels_pending_saves() {
        let adapter = Arc::new(CountingAdapter::new());
        let autosave = Autosave::new(
            Arc::clone(&adapter) as Arc<dyn PersistenceAdapter>,
            200,
        );

        autosave.schedule(Note::new("draft", "doomed", Vec::new()));
        drop(autosave);
        tokio::time::sleep(Duration::from_millis(400)).await;

        assert_eq!(adapter.updates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn no_edits_no_saves() {
        let adapter = Arc::new(CountingAdapter::new());
        let _autosave = Autosave::new(
            Arc::clone(&adapter) as Arc<dyn PersistenceAdapter>,
            50,
        );
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(adapter.updates.load(Ordering::SeqCst), 0);
    }
}

//! CLI application handler.
//!
//! Drives the [`NoteStore`] from the command line: creation, listing,
//! search, editor-based editing, tagging, deletion and AI rewrites.

use std::io::{stdin, stdout, Write};
use std::process::Command;

use console::style;
use log::debug;
use tempfile::Builder;

use crate::{
    parse_tags, query, Commands, Config, Note, NoteError, NoteStore, Result, RewriteClient,
    RewriteMode,
};

/// Processes CLI commands against a loaded note store.
pub struct App {
    store: NoteStore,
    config: Config,
}

impl App {
    pub fn new(store: NoteStore, config: Config) -> Self {
        Self { store, config }
    }

    /// Loads the collection and runs one command.
    pub async fn run(&mut self, command: Commands) -> Result<()> {
        self.store.load_all().await?;

        match command {
            Commands::Create {
                title,
                content,
                tags,
                edit,
            } => self.create_note(title, content, tags, edit).await,

            Commands::View { id, json } => self.view_note(&id, json).await,

            Commands::List {
                tag,
                search,
                limit,
                json,
            } => self.list_notes(tag, search, limit, json),

            Commands::Search { query, limit, json } => {
                self.list_notes(None, Some(query), limit, json)
            }

            Commands::Edit {
                id,
                title,
                content,
                edit,
            } => self.edit_note(&id, title, content, edit).await,

            Commands::Delete { id, force } => self.delete_note(&id, force).await,

            Commands::Tag { id, add, remove } => self.tag_note(&id, add, remove).await,

            Commands::Tags => {
                self.print_tag_counts();
                Ok(())
            }

            Commands::Rewrite { id, mode, apply } => self.rewrite_note(&id, mode, apply).await,
        }
    }

    async fn create_note(
        &mut self,
        title: Option<String>,
        content: Option<String>,
        tags: Option<String>,
        edit: bool,
    ) -> Result<()> {
        let mut note = self.store.create(title.as_deref()).await?;

        let content = match content {
            Some(content) => Some(content),
            None if edit => Some(self.open_editor("")?),
            None => None,
        };

        let parsed_tags = parse_tags(tags);
        if content.is_some() || !parsed_tags.is_empty() {
            if let Some(content) = content {
                note.content = content;
            }
            for tag in parsed_tags {
                note.add_tag(&tag);
            }
            note = self.store.update(&note).await?;
        }

        println!("Note created with ID: {}", note.id);
        Ok(())
    }

    async fn view_note(&self, id: &str, json: bool) -> Result<()> {
        let note = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| NoteError::NotFound { id: id.to_string() })?;

        if json {
            println!("{}", serde_json::to_string_pretty(&note)?);
            return Ok(());
        }

        println!("{}", style(&note.title).bold());
        if !note.tags.is_empty() {
            println!("{}", style(format!("[{}]", note.tags.join(", "))).cyan());
        }
        println!(
            "{}",
            style(format!(
                "created {}  updated {}",
                note.created_at.format("%Y-%m-%d %H:%M"),
                note.updated_at.format("%Y-%m-%d %H:%M")
            ))
            .dim()
        );
        println!();
        println!("{}", note.content);
        Ok(())
    }

    fn list_notes(
        &mut self,
        tag: Option<String>,
        search: Option<String>,
        limit: usize,
        json: bool,
    ) -> Result<()> {
        self.store.set_selected_tag(tag.as_deref());
        self.store
            .set_search_query(search.as_deref().unwrap_or(""));

        let notes: Vec<&Note> = self.store.filtered_notes().iter().take(limit).collect();
        if json {
            println!("{}", serde_json::to_string_pretty(&notes)?);
            return Ok(());
        }

        if notes.is_empty() {
            println!("No notes found.");
            return Ok(());
        }

        for note in notes {
            let preview = query::extract_preview(&note.content, self.config.preview_length);
            println!(
                "{}  {}",
                style(&note.title).bold(),
                style(&note.id).dim()
            );
            if !note.tags.is_empty() {
                println!("  {}", style(format!("[{}]", note.tags.join(", "))).cyan());
            }
            if !preview.is_empty() {
                println!("  {}", preview.replace('\n', " "));
            }
        }
        Ok(())
    }

    async fn edit_note(
        &mut self,
        id: &str,
        title: Option<String>,
        content: Option<String>,
        edit: bool,
    ) -> Result<()> {
        let mut note = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| NoteError::NotFound { id: id.to_string() })?;

        if let Some(title) = title {
            note.title = title;
        }
        match content {
            Some(content) => note.content = content,
            None if edit => note.content = self.open_editor(&note.content)?,
            None => {}
        }

        let saved = self.store.update(&note).await?;
        println!("Note {} updated", saved.id);
        Ok(())
    }

    async fn delete_note(&mut self, id: &str, force: bool) -> Result<()> {
        let note = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| NoteError::NotFound { id: id.to_string() })?;

        if !force && !Self::confirm(&format!("Delete note \"{}\"? [y/N] ", note.title))? {
            println!("Aborted.");
            return Ok(());
        }

        self.store.remove(id).await?;
        println!("Note {} deleted", id);
        Ok(())
    }

    async fn tag_note(
        &mut self,
        id: &str,
        add: Option<String>,
        remove: Option<String>,
    ) -> Result<()> {
        let mut note = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| NoteError::NotFound { id: id.to_string() })?;

        let mut changed = false;
        for tag in parse_tags(add) {
            changed |= note.add_tag(&tag);
        }
        for tag in parse_tags(remove) {
            changed |= note.remove_tag(&tag);
        }

        if changed {
            note = self.store.update(&note).await?;
        }

        if note.tags.is_empty() {
            println!("No tags.");
        } else {
            println!("{}", note.tags.join(", "));
        }
        Ok(())
    }

    fn print_tag_counts(&self) {
        let counts = query::tag_counts(self.store.all_notes());
        if counts.is_empty() {
            println!("No tags in use.");
            return;
        }
        for (tag, count) in counts {
            println!("{} ({})", style(tag).cyan(), count);
        }
    }

    async fn rewrite_note(&mut self, id: &str, mode: RewriteMode, apply: bool) -> Result<()> {
        let endpoint =
            self.config
                .rewrite_endpoint
                .clone()
                .ok_or_else(|| NoteError::Validation {
                    message: "no rewrite endpoint configured".to_string(),
                })?;

        let mut note = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| NoteError::NotFound { id: id.to_string() })?;

        let client = RewriteClient::new(endpoint)?;
        let suggestion = client.rewrite(mode, &note.title, &note.content).await?;

        if apply {
            note.content = suggestion;
            self.store.update(&note).await?;
            println!("Rewrite applied to note {}", note.id);
        } else {
            println!("{}", suggestion);
        }
        Ok(())
    }

    fn open_editor(&self, initial: &str) -> Result<String> {
        // Scratch file with .md extension so editors highlight it
        let temp_file = Builder::new().suffix(".md").tempfile()?;
        std::fs::write(temp_file.path(), initial)?;

        let editor_cmd = self.config.get_editor_command();
        debug!("Opening editor: {}", editor_cmd);
        let parts = shell_words::split(&editor_cmd).map_err(|e| NoteError::EditorError {
            message: format!("Failed to parse editor command '{}': {}", editor_cmd, e),
        })?;
        let (program, args) = parts.split_first().ok_or_else(|| NoteError::EditorError {
            message: "Editor command is empty".to_string(),
        })?;

        let status = Command::new(program)
            .args(args)
            .arg(temp_file.path())
            .status()
            .map_err(|e| NoteError::EditorError {
                message: format!("Failed to launch editor '{}': {}", program, e),
            })?;

        if !status.success() {
            return Err(NoteError::EditorError {
                message: format!("Editor exited with status {}", status),
            });
        }

        Ok(std::fs::read_to_string(temp_file.path())?)
    }

    fn confirm(prompt: &str) -> Result<bool> {
        print!("{}", prompt);
        stdout().flush()?;
        let mut answer = String::new();
        stdin().read_line(&mut answer)?;
        Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
    }
}

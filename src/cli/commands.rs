//! Subcommand definitions for the notekeep CLI.

use clap::Subcommand;

use crate::RewriteMode;

/// Available subcommands for the notekeep application
#[derive(Subcommand)]
pub enum Commands {
    /// Create a new note
    Create {
        /// Title of the note (defaults to "Untitled Note")
        #[clap(short = 'T', long)]
        title: Option<String>,

        /// Content of the note, can be markdown formatted
        #[clap(short, long)]
        content: Option<String>,

        /// Tags to associate with the note (comma-separated)
        #[clap(short, long)]
        tags: Option<String>,

        /// Open the new note in the editor to write content
        #[clap(short, long)]
        edit: bool,
    },

    /// View a note by ID
    View {
        /// ID of the note to view
        id: String,

        /// Format output as raw JSON
        #[clap(short, long)]
        json: bool,
    },

    /// List notes, optionally filtered by tag and/or search text
    List {
        /// Keep only notes carrying this tag
        #[clap(short, long)]
        tag: Option<String>,

        /// Keep only notes matching this search text
        #[clap(short, long)]
        search: Option<String>,

        /// Limit the number of notes shown
        #[clap(short = 'n', long, default_value_t = 10)]
        limit: usize,

        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Search notes by title, content or tags
    Search {
        /// Search query text
        query: String,

        /// Limit the number of search results
        #[clap(short = 'n', long, default_value_t = 10)]
        limit: usize,

        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Edit an existing note
    Edit {
        /// ID of the note to edit
        id: String,

        /// New title for the note
        #[clap(short = 'T', long)]
        title: Option<String>,

        /// New content for the note
        #[clap(short, long)]
        content: Option<String>,

        /// Open the note's content in the editor
        #[clap(short, long)]
        edit: bool,
    },

    /// Delete a note by ID
    Delete {
        /// ID of the note to delete
        id: String,

        /// Skip confirmation prompt
        #[clap(short, long)]
        force: bool,
    },

    /// Tag operations on a single note (add, remove, list)
    Tag {
        /// ID of the note to modify
        id: String,

        /// Tags to add (comma-separated)
        #[clap(short, long)]
        add: Option<String>,

        /// Tags to remove (comma-separated)
        #[clap(short, long)]
        remove: Option<String>,
    },

    /// List all tags in use, with counts
    Tags,

    /// Ask the rewrite proxy for an improved version of a note
    Rewrite {
        /// ID of the note to rewrite
        id: String,

        /// How the note should be transformed
        #[clap(short, long, value_enum, default_value = "cleanup")]
        mode: RewriteMode,

        /// Apply the suggestion to the note instead of just printing it
        #[clap(short, long)]
        apply: bool,
    },
}

/// Parses a comma-separated tag list into individual raw tags.
pub fn parse_tags(tags: Option<String>) -> Vec<String> {
    tags.map(|t| {
        t.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_tags_splits_and_drops_empties() {
        let tags = parse_tags(Some("rust, ideas, ,  ".to_string()));
        assert_eq!(tags, vec!["rust", "ideas"]);
        assert!(parse_tags(None).is_empty());
    }
}

//! Pure query functions over a note collection.
//!
//! Everything in this module is stateless: filtering, preview extraction and
//! tag enumeration are plain functions of their inputs, so the derived view
//! the store exposes can be recomputed deterministically at any time.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::Note;

static HEADINGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#{1,6}\s+").unwrap());
static BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").unwrap());
static ITALIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*(.*?)\*").unwrap());
static LINKS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\([^)]+\)").unwrap());
static INLINE_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`]+)`").unwrap());
static CODE_BLOCKS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"```[\s\S]*?```").unwrap());

/// Filters a note collection by selected tag and search text.
///
/// Tag selection keeps only notes carrying the tag (exact match against the
/// stored, normalized tags). A non-blank query keeps notes whose lowercased
/// title, content or any tag contains the lowercased query as a substring.
/// Both filters are conjunctive. Input order is preserved; the caller owns
/// the sort.
pub fn filter_notes(notes: &[Note], search_query: &str, selected_tag: Option<&str>) -> Vec<Note> {
    let mut filtered: Vec<&Note> = notes.iter().collect();

    if let Some(tag) = selected_tag {
        filtered.retain(|note| note.has_tag(tag));
    }

    let query = search_query.trim().to_lowercase();
    if !query.is_empty() {
        filtered.retain(|note| {
            note.title.to_lowercase().contains(&query)
                || note.content.to_lowercase().contains(&query)
                || note.tags.iter().any(|tag| tag.to_lowercase().contains(&query))
        });
    }

    filtered.into_iter().cloned().collect()
}

/// Extracts a plain-text preview from Markdown content.
///
/// Strips heading markers, bold/italic markers, link syntax (keeping the
/// link text), inline code markers, and fenced code blocks entirely, then
/// trims and truncates to `max_length` characters with a `...` suffix.
///
/// This is a best-effort approximation, not a Markdown parse: the
/// substitutions run in a fixed order and nested or malformed Markdown may
/// leave residual syntax characters. That behavior is intentional and kept
/// stable for compatibility with previews already shown to users.
pub fn extract_preview(content: &str, max_length: usize) -> String {
    // Fenced blocks go first so the inline-code pattern cannot consume the
    // fence backticks and leave the block body behind.
    let plain = CODE_BLOCKS.replace_all(content, "");
    let plain = HEADINGS.replace_all(&plain, "");
    let plain = BOLD.replace_all(&plain, "$1");
    let plain = ITALIC.replace_all(&plain, "$1");
    let plain = LINKS.replace_all(&plain, "$1");
    let plain = INLINE_CODE.replace_all(&plain, "$1");
    let plain = plain.trim();

    if plain.chars().count() <= max_length {
        return plain.to_string();
    }

    let truncated: String = plain.chars().take(max_length).collect();
    format!("{}...", truncated)
}

/// All distinct tags across a collection, sorted alphabetically.
pub fn all_tags(notes: &[Note]) -> Vec<String> {
    let mut tags: Vec<String> = notes
        .iter()
        .flat_map(|note| note.tags.iter().cloned())
        .collect();
    tags.sort();
    tags.dedup();
    tags
}

/// Tag usage counts across a collection, sorted alphabetically by tag.
pub fn tag_counts(notes: &[Note]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for note in notes {
        for tag in &note.tags {
            *counts.entry(tag.clone()).or_insert(0) += 1;
        }
    }
    counts
}

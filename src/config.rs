use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use which::which;

use crate::DEFAULT_AUTOSAVE_DELAY_MS;

/// File name of the local snapshot inside the data directory.
pub const SNAPSHOT_FILE: &str = "notes.json";

/// Default maximum preview length in characters.
pub const DEFAULT_PREVIEW_LENGTH: usize = 100;

/// Application configuration settings.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Directory holding the local snapshot
    pub data_dir: PathBuf,

    /// Maximum preview length in characters
    pub preview_length: usize,

    /// Quiet period for debounced auto-save, in milliseconds
    pub autosave_delay_ms: u64,

    /// Default editor command (for the CLI edit flow)
    pub editor_command: Option<String>,

    /// Endpoint of the AI rewrite proxy, if configured
    pub rewrite_endpoint: Option<String>,

    /// Remote backend settings; `None` means local snapshot mode
    pub remote: Option<RemoteConfig>,
}

/// Connection settings for the hosted notes backend.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RemoteConfig {
    /// REST root of the hosted table
    pub base_url: String,
    /// API key sent with every request
    pub api_key: String,
}

impl Config {
    /// Path of the snapshot file.
    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join(SNAPSHOT_FILE)
    }

    // This method provides smart fallbacks when no editor is configured
    pub fn get_editor_command(&self) -> String {
        // First try the configured editor
        if let Some(editor) = &self.editor_command {
            return editor.clone();
        }

        // Then try environment variable
        if let Ok(editor) = std::env::var("EDITOR") {
            return editor;
        }

        // Fall back to platform defaults
        if cfg!(windows) {
            "notepad".to_string()
        } else if cfg!(target_os = "macos") {
            "open -t".to_string()
        } else {
            // Try common Linux editors
            for editor in &["nano", "vim", "vi", "emacs"] {
                if which(editor).is_ok() {
                    return editor.to_string();
                }
            }
            "nano".to_string()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = ProjectDirs::from("com", "notekeep", "notekeep")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".notekeep"));

        Config {
            data_dir,
            preview_length: DEFAULT_PREVIEW_LENGTH,
            autosave_delay_ms: DEFAULT_AUTOSAVE_DELAY_MS,
            editor_command: None,
            rewrite_endpoint: None,
            remote: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_path_lives_in_data_dir() {
        let config = Config {
            data_dir: PathBuf::from("/tmp/nk"),
            ..Config::default()
        };
        assert_eq!(config.snapshot_path(), PathBuf::from("/tmp/nk/notes.json"));
    }

    #[test]
    fn configured_editor_wins() {
        let config = Config {
            editor_command: Some("my-editor --wait".to_string()),
            ..Config::default()
        };
        assert_eq!(config.get_editor_command(), "my-editor --wait");
    }
}

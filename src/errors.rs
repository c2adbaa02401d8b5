//! Error types for the notekeep application.
//!
//! This module defines custom error types that categorize different failures
//! that can occur during note management operations.

use std::io;

use thiserror::Error;

/// A specialized Result type for notekeep operations.
pub type Result<T> = std::result::Result<T, NoteError>;

/// The main error type for the notekeep application.
#[derive(Error, Debug)]
pub enum NoteError {
    /// An operation requiring a session was called without one.
    #[error("not signed in: {operation} requires an active session")]
    Unauthenticated { operation: &'static str },

    /// Note was not found when performing an operation.
    #[error("Note not found: {id}")]
    NotFound { id: String },

    /// Backend or network failure while persisting notes.
    #[error("Persistence error: {message}")]
    Persistence { message: String },

    /// The local store rejected a write for capacity reasons.
    ///
    /// Kept distinct from [`NoteError::Persistence`] so callers can tell the
    /// user to delete notes instead of retrying.
    #[error("Storage quota exceeded. Please delete some notes.")]
    QuotaExceeded,

    /// Malformed input, e.g. an empty email on sign-in.
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// The rewrite proxy refused or failed the request.
    #[error("Rewrite failed: {message}")]
    RewriteFailed { message: String },

    /// Errors related to file I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors related to serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Failure launching or reading back from the configured editor.
    #[error("{message}")]
    EditorError { message: String },
}

impl NoteError {
    /// Wraps a transport-level failure in the generic persistence variant.
    pub fn persistence(err: impl std::fmt::Display) -> Self {
        NoteError::Persistence {
            message: err.to_string(),
        }
    }
}

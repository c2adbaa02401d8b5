//! notekeep: tagged Markdown note management.
//!
//! This library provides an in-memory note store with a deterministically
//! derived filtered view, substring search and tag filtering, durable local
//! snapshot persistence, an abstracted remote backend, debounced auto-save,
//! and a client for an AI rewrite proxy.

mod adapter;
mod auth;
mod autosave;
mod cli;
mod config;
mod errors;
mod local;
mod note;
pub mod query;
mod remote;
mod rewrite;
mod store;

// Re-export key components
pub use adapter::*;
pub use auth::*;
pub use autosave::*;
pub use cli::*;
pub use config::*;
pub use errors::*;
pub use local::*;
pub use note::*;
pub use remote::*;
pub use rewrite::*;
pub use store::*;

mod app;
mod commands;

pub use app::*;
pub use commands::*;

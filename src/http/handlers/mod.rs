//! HTTP request handlers

pub mod addons;
pub mod auth;
pub mod directory;
pub mod status;
pub mod stremio;
pub mod users;

// Re-export AppState (used by all handlers)
pub use status::AppState;

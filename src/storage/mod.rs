//! Storage backend implementations

pub mod json_store;

// Re-export main types
pub use json_store::JsonStore;

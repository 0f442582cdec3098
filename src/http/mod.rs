//! HTTP server implementation for the addon manager
//!
//! This module provides a REST API server using Axum, with a cookie session
//! gate in front of user and addon management.

pub mod auth;
pub mod errors;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod server;

pub use errors::{HttpError, HttpResult};
pub use extract::ApiJson;
/// Re-export commonly used types
pub use server::{build_router, AddonManagerServer};

//! Session authentication for the admin API

pub mod middleware;
pub mod session;

/// Re-export commonly used auth types
pub use middleware::{require_admin, session_middleware};
pub use session::{SessionContext, SessionData, SessionId, SessionManager, SESSION_COOKIE};

//! Prefixed output lines for the CLI

/// Format a success message
pub fn ok(msg: &str) -> String {
    format!("[OK] {}", msg)
}

/// Format an error message
pub fn error(msg: &str) -> String {
    format!("[ERROR] {}", msg)
}

/// Format a warning message
pub fn warning(msg: &str) -> String {
    format!("[WARNING] {}", msg)
}

/// Format an info message
pub fn info(msg: &str) -> String {
    format!("[INFO] {}", msg)
}

/// Format a failed user sync with its position in a bulk run
pub fn sync_failed(position: usize, total: usize, email: &str, reason: &str) -> String {
    error(&format!("[{}/{}] {}: {}", position, total, email, reason))
}

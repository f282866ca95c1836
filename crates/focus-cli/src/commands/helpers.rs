//! Helper utility functions for CLI commands

use anyhow::{Context, Result};
use focus_core::config::db_path;
use focus_storage::Database;

/// Open the database in the data directory
///
/// # Errors
///
/// Returns an error if the data directory cannot be resolved or the database cannot be opened
pub fn open_database() -> Result<Database> {
    let path = db_path()?;
    Database::new(&path).with_context(|| format!("Failed to open database at {}", path.display()))
}

/// Truncate to `max_chars` characters, marking the cut with an ellipsis
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    let truncated = focus_ai::truncate_chars(s, max_chars);
    if truncated.len() < s.len() {
        format!("{truncated}...")
    } else {
        s.to_string()
    }
}

/// Show only the first few characters of a secret
pub fn mask_secret(secret: &str) -> String {
    format!("{}***", secret.chars().take(8).collect::<String>())
}

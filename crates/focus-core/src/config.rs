use anyhow::Result;
use std::path::PathBuf;

/// Environment variable that relocates all local data
pub const DATA_DIR_ENV: &str = "FOCUS_DATA_DIR";

/// Get the local data directory for focus.
///
/// # Errors
///
/// Returns an error if the local data directory cannot be determined.
pub fn get_data_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let mut path =
        dirs::data_local_dir().ok_or_else(|| anyhow::anyhow!("Failed to get local data dir"))?;
    path.push("focus");
    Ok(path)
}

/// Path of the SQLite database holding records and settings
///
/// # Errors
///
/// Returns an error if the local data directory cannot be determined.
pub fn db_path() -> Result<PathBuf> {
    Ok(get_data_dir()?.join("focus.db"))
}

/// Log file used by the native-messaging host, whose stdout is the wire
///
/// # Errors
///
/// Returns an error if the local data directory cannot be determined.
pub fn host_log_path() -> Result<PathBuf> {
    Ok(get_data_dir()?.join("host.log"))
}

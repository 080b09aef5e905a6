//! Data directory resolution.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::error::PathError;

/// Environment variable that overrides the data root.
pub const DATA_DIR_ENV: &str = "MURMUR_DATA_DIR";

/// Get the root directory for application data (database, settings).
///
/// Resolution order:
/// 1. `MURMUR_DATA_DIR` environment variable
/// 2. System data directory (e.g., `~/.local/share/murmur`)
///
/// The directory is created if it does not exist.
pub fn data_root() -> Result<PathBuf, PathError> {
    let root = match env::var(DATA_DIR_ENV) {
        Ok(path) if path.trim().is_empty() => return Err(PathError::EmptyPath),
        Ok(path) => PathBuf::from(path),
        Err(_) => dirs::data_local_dir()
            .ok_or(PathError::NoDataDir)?
            .join("murmur"),
    };

    ensure_dir(&root)?;
    Ok(root)
}

pub(super) fn ensure_dir(path: &Path) -> Result<(), PathError> {
    if path.exists() {
        return Ok(());
    }
    fs::create_dir_all(path).map_err(|e| PathError::CreateFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

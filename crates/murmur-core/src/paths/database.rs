//! Database path resolution.
//!
//! Provides the canonical path to the murmur `SQLite` database file.

use std::path::{Path, PathBuf};

use super::error::PathError;
use super::platform::{data_root, ensure_dir};

/// File name of the database inside `<data_root>/data`.
pub const DATABASE_FILE_NAME: &str = "murmur.db";

/// Get the path to the murmur database file.
///
/// The `data/` subdirectory is created if it doesn't exist.
pub fn database_path() -> Result<PathBuf, PathError> {
    database_path_in(&data_root()?)
}

/// Database path below an explicit data root.
pub fn database_path_in(root: &Path) -> Result<PathBuf, PathError> {
    let data_dir = root.join("data");
    ensure_dir(&data_dir)?;
    Ok(data_dir.join(DATABASE_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_path_in_creates_data_dir() {
        let root = std::env::temp_dir().join(format!("murmur-paths-{}", uuid::Uuid::new_v4()));

        let path = database_path_in(&root).unwrap();

        assert!(root.join("data").is_dir());
        assert!(path.ends_with("data/murmur.db"));
        std::fs::remove_dir_all(&root).unwrap();
    }
}

//! Centralized path resolution for Omniscient One
//!
//! All file and directory paths are resolved through this module to ensure
//! consistent behavior across platforms.
//!
//! ## Path Strategy
//!
//! The platform stores everything under a single base directory following
//! platform standards:
//! - **macOS**: `~/Library/Application Support/OmniscientOne/`
//! - **Windows**: `%LOCALAPPDATA%\OmniscientOne\`
//! - **Linux**: `$XDG_DATA_HOME/OmniscientOne/` (fallback `~/.local/share/OmniscientOne/`)
//!
//! ## Directory Structure
//!
//! ```text
//! ~/OmniscientOne/
//! ├── data/
//! │ ├── config.toml
//! │ ├── secrets.toml
//! │ ├── omniscient.db (+ WAL/SHM)
//! │ ├── backups/
//! │ └── cache/
//! ├── logs/
//! │ └── omniscient_*.log
//! └── exports/
//! └── *.json
//! ```

use once_cell::sync::Lazy;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

// =============================================================================
// BASE DIRECTORY RESOLUTION
// =============================================================================

/// Tracks whether initialization logging has been done
static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Lazy-initialized base directory (thread-safe)
static BASE_DIRECTORY: Lazy<PathBuf> = Lazy::new(|| {
  let base_dir = resolve_base_directory();
  INITIALIZED.store(true, Ordering::SeqCst);
  base_dir
});

/// Resolves the base directory for all platform data
///
/// Uses platform-specific application data locations:
/// - macOS: ~/Library/Application Support/OmniscientOne
/// - Windows: %LOCALAPPDATA%\OmniscientOne
/// - Linux: $XDG_DATA_HOME/OmniscientOne (fallback ~/.local/share/OmniscientOne)
fn resolve_base_directory() -> PathBuf {
  const APP_DIR: &str = "OmniscientOne";

  if let Some(dir) = dirs::data_local_dir() {
    return dir.join(APP_DIR);
  }

  if let Some(dir) = dirs::data_dir() {
    return dir.join(APP_DIR);
  }

  if let Some(home) = dirs::home_dir() {
    return home.join(APP_DIR);
  }

  PathBuf::from(APP_DIR)
}

// =============================================================================
// PRIMARY DIRECTORY ACCESSORS
// =============================================================================

/// Returns the base directory for all platform data
pub fn get_base_directory() -> PathBuf {
  BASE_DIRECTORY.clone()
}

/// Returns the data directory path
///
/// Contains the database, config files, and cached market data.
pub fn get_data_directory() -> PathBuf {
  BASE_DIRECTORY.join("data")
}

/// Returns the logs directory path
///
/// Contains daily log files.
pub fn get_logs_directory() -> PathBuf {
  BASE_DIRECTORY.join("logs")
}

/// Returns the database backups directory path
pub fn get_backups_directory() -> PathBuf {
  get_data_directory().join("backups")
}

/// Returns the market data cache directory path
pub fn get_cache_directory() -> PathBuf {
  get_data_directory().join("cache")
}

/// Returns the account exports directory path
///
/// Contains JSON account-data exports.
pub fn get_exports_directory() -> PathBuf {
  BASE_DIRECTORY.join("exports")
}

// =============================================================================
// CONFIGURATION FILE PATHS
// =============================================================================

/// Returns the main configuration file path
pub fn get_config_path() -> PathBuf {
  get_data_directory().join("config.toml")
}

/// Returns the secrets file path
pub fn get_secrets_path() -> PathBuf {
  get_data_directory().join("secrets.toml")
}

// =============================================================================
// DATABASE FILE PATHS
// =============================================================================

/// Returns the platform database path
pub fn get_database_path() -> PathBuf {
  get_data_directory().join("omniscient.db")
}

/// Returns the process lock file path
pub fn get_process_lock_path() -> PathBuf {
  get_data_directory().join(".omniscient.lock")
}

// =============================================================================
// DATABASE WAL/SHM HELPERS
// =============================================================================

/// Returns all related files for a SQLite database (main DB, SHM, WAL)
///
/// SQLite databases create additional files for write-ahead logging and
/// shared memory. This helper returns all three files for cleanup operations.
///
/// ## Arguments
///
/// * `db_path` - Path to the main database file
///
/// ## Returns
///
/// Vector containing paths to: `[db, db-shm, db-wal]`
pub fn get_db_with_wal_files(db_path: PathBuf) -> Vec<PathBuf> {
  vec![
    db_path.clone(),
    db_path.with_extension("db-shm"),
    db_path.with_extension("db-wal"),
  ]
}

// =============================================================================
// DIRECTORY CREATION
// =============================================================================

/// Ensures all required directories exist
///
/// Creates the base directory and all subdirectories needed for operation.
/// This should be called early in the application startup.
///
/// ## Created Directories
///
/// - Base directory (platform data dir/OmniscientOne)
/// - data/
/// - logs/
/// - data/backups/
/// - data/cache/
/// - exports/
///
/// ## Returns
///
/// - `Ok(())` if all directories exist or were created successfully
/// - `Err(String)` if any directory creation failed
pub fn ensure_all_directories() -> Result<(), String> {
  let dirs_to_create = vec![
    ("base", get_base_directory()),
    ("data", get_data_directory()),
    ("logs", get_logs_directory()),
    ("backups", get_backups_directory()),
    ("cache", get_cache_directory()),
    ("exports", get_exports_directory()),
  ];

  for (name, dir) in dirs_to_create {
    if !dir.exists() {
      std::fs::create_dir_all(&dir).map_err(|e| {
        format!(
          "Failed to create {} directory at {}: {}",
          name,
          dir.display(),
          e
        )
      })?;
    }
  }

  Ok(())
}

// =============================================================================
// UTILITY FUNCTIONS
// =============================================================================

/// Returns a display string for the base directory (for user-facing messages)
pub fn get_base_directory_display() -> String {
  BASE_DIRECTORY.display().to_string()
}

/// Checks if the base directory has been initialized
pub fn is_initialized() -> bool {
  INITIALIZED.load(Ordering::SeqCst)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_base_directory_not_empty() {
    let base = get_base_directory();
    assert!(!base.as_os_str().is_empty());
  }

  #[test]
  fn test_data_directory_is_subdir() {
    let base = get_base_directory();
    let data = get_data_directory();
    assert!(data.starts_with(&base));
  }

  #[test]
  fn test_logs_directory_is_subdir() {
    let base = get_base_directory();
    let logs = get_logs_directory();
    assert!(logs.starts_with(&base));
  }

  #[test]
  fn test_database_path_in_data_dir() {
    let data = get_data_directory();
    assert!(get_database_path().starts_with(&data));
    assert_eq!(get_database_path().file_name().unwrap(), "omniscient.db");
  }

  #[test]
  fn test_config_paths_in_data_dir() {
    let data = get_data_directory();
    assert!(get_config_path().starts_with(&data));
    assert_eq!(get_config_path().file_name().unwrap(), "config.toml");
    assert!(get_secrets_path().starts_with(&data));
    assert_eq!(get_secrets_path().file_name().unwrap(), "secrets.toml");
  }

  #[test]
  fn test_backups_and_cache_in_data_dir() {
    let data = get_data_directory();
    assert!(get_backups_directory().starts_with(&data));
    assert!(get_cache_directory().starts_with(&data));
  }

  #[test]
  fn test_wal_files_cover_all_extensions() {
    let files = get_db_with_wal_files(get_database_path());
    assert_eq!(files.len(), 3);
    assert!(files[1].to_string_lossy().ends_with("db-shm"));
    assert!(files[2].to_string_lossy().ends_with("db-wal"));
  }

  #[test]
  fn test_process_lock_in_data_dir() {
    let data = get_data_directory();
    let lock = get_process_lock_path();
    assert!(lock.starts_with(&data));
    assert_eq!(lock.file_name().unwrap(), ".omniscient.lock");
  }
}

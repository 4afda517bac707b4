//! Path management for Costbook
//!
//! ## Path Resolution Order
//!
//! 1. `COSTBOOK_DATA_DIR` environment variable (if set)
//! 2. The platform config directory reported by `directories`
//!    (`~/.config/costbook` on Linux, `~/Library/Application Support/costbook`
//!    on macOS, `%APPDATA%\costbook\config` on Windows)

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::CostbookError;

/// Environment variable that overrides the base directory
pub const DATA_DIR_ENV: &str = "COSTBOOK_DATA_DIR";

/// Manages all paths used by Costbook
#[derive(Debug, Clone)]
pub struct CostbookPaths {
    base_dir: PathBuf,
}

impl CostbookPaths {
    /// Resolve the base directory from the environment or the platform default
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> Result<Self, CostbookError> {
        let base_dir = match std::env::var(DATA_DIR_ENV) {
            Ok(custom) if !custom.trim().is_empty() => PathBuf::from(custom),
            _ => resolve_default_path()?,
        };

        Ok(Self { base_dir })
    }

    /// Create paths rooted at a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Directory holding the movement data files
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    pub fn movements_file(&self) -> PathBuf {
        self.data_dir().join("movements.json")
    }

    pub fn lines_file(&self) -> PathBuf {
        self.data_dir().join("movement_lines.json")
    }

    /// Ensure the base and data directories exist
    pub fn ensure_directories(&self) -> Result<(), CostbookError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| CostbookError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| CostbookError::Io(format!("Failed to create data directory: {}", e)))?;

        Ok(())
    }
}

fn resolve_default_path() -> Result<PathBuf, CostbookError> {
    ProjectDirs::from("", "", "costbook")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| CostbookError::Config("Could not determine a home directory".into()))
}

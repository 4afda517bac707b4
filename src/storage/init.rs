//! Storage initialization
//!
//! Handles first-run setup: directories and empty data files.

use crate::config::paths::CostbookPaths;
use crate::error::CostbookError;

use super::file_io::save_document;

/// Initialize storage for a fresh installation.
///
/// Existing data files are never overwritten.
pub fn initialize_storage(paths: &CostbookPaths) -> Result<(), CostbookError> {
    paths.ensure_directories()?;

    if !paths.movements_file().exists() {
        save_document(
            paths.movements_file(),
            &serde_json::json!({ "movements": [] }),
        )?;
    }

    if !paths.lines_file().exists() {
        save_document(paths.lines_file(), &serde_json::json!({ "lines": [] }))?;
    }

    Ok(())
}

/// Check if storage needs initialization
pub fn needs_initialization(paths: &CostbookPaths) -> bool {
    !paths.movements_file().exists()
}

//! Movement line repository for JSON storage
//!
//! Lines are stored flat in movement_lines.json and indexed by their
//! owning movement in memory. Line order within a movement is preserved.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::CostbookError;
use crate::models::{MovementId, MovementLine};

use super::file_io::{load_document, save_document};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct LineData {
    lines: Vec<MovementLine>,
}

/// Repository for movement line persistence
pub struct LineRepository {
    path: PathBuf,
    by_movement: RwLock<HashMap<MovementId, Vec<MovementLine>>>,
}

impl LineRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            by_movement: RwLock::new(HashMap::new()),
        }
    }

    pub fn load(&self) -> Result<(), CostbookError> {
        let file_data: LineData = load_document(&self.path)?;

        let mut by_movement = self
            .by_movement
            .write()
            .map_err(|e| CostbookError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        by_movement.clear();
        for line in file_data.lines {
            by_movement.entry(line.movement_id).or_default().push(line);
        }

        Ok(())
    }

    pub fn save(&self) -> Result<(), CostbookError> {
        let by_movement = self
            .by_movement
            .read()
            .map_err(|e| CostbookError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        // Stable file layout: group by movement id
        let mut ids: Vec<_> = by_movement.keys().copied().collect();
        ids.sort();
        let lines = ids
            .iter()
            .filter_map(|id| by_movement.get(id))
            .flatten()
            .cloned()
            .collect();

        save_document(&self.path, &LineData { lines })
    }

    /// Lines for one movement, in recorded order
    pub fn get_for(&self, movement_id: MovementId) -> Result<Vec<MovementLine>, CostbookError> {
        let by_movement = self
            .by_movement
            .read()
            .map_err(|e| CostbookError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(by_movement.get(&movement_id).cloned().unwrap_or_default())
    }

    /// Replace every line of a movement
    pub fn replace_for(
        &self,
        movement_id: MovementId,
        lines: Vec<MovementLine>,
    ) -> Result<(), CostbookError> {
        if lines.iter().any(|l| l.movement_id != movement_id) {
            return Err(CostbookError::Storage(format!(
                "Lines for {} reference a different movement",
                movement_id
            )));
        }

        let mut by_movement = self
            .by_movement
            .write()
            .map_err(|e| CostbookError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        if lines.is_empty() {
            by_movement.remove(&movement_id);
        } else {
            by_movement.insert(movement_id, lines);
        }
        Ok(())
    }

    /// Remove every line of a movement, returning how many were removed
    pub fn delete_for(&self, movement_id: MovementId) -> Result<usize, CostbookError> {
        let mut by_movement = self
            .by_movement
            .write()
            .map_err(|e| CostbookError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        Ok(by_movement
            .remove(&movement_id)
            .map(|lines| lines.len())
            .unwrap_or(0))
    }
}

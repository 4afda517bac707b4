//! Movement repository for JSON storage
//!
//! Manages loading and saving movements to movements.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::CostbookError;
use crate::models::{Movement, MovementId};

use super::file_io::{load_document, save_document};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct MovementData {
    movements: Vec<Movement>,
}

/// Repository for movement persistence
pub struct MovementRepository {
    path: PathBuf,
    data: RwLock<HashMap<MovementId, Movement>>,
}

/// Newest first; movements without a usable date sort last
fn newest_first(movements: &mut [Movement]) {
    movements.sort_by(|a, b| {
        b.date
            .timestamp()
            .cmp(&a.date.timestamp())
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
}

impl MovementRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load movements from disk, replacing anything held in memory
    pub fn load(&self) -> Result<(), CostbookError> {
        let file_data: MovementData = load_document(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| CostbookError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        for movement in file_data.movements {
            data.insert(movement.id, movement);
        }

        Ok(())
    }

    pub fn save(&self) -> Result<(), CostbookError> {
        let mut movements = self.get_all()?;
        newest_first(&mut movements);
        save_document(&self.path, &MovementData { movements })
    }

    pub fn get(&self, id: MovementId) -> Result<Option<Movement>, CostbookError> {
        let data = self
            .data
            .read()
            .map_err(|e| CostbookError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(&id).cloned())
    }

    /// All movements, newest first
    pub fn get_all(&self) -> Result<Vec<Movement>, CostbookError> {
        let data = self
            .data
            .read()
            .map_err(|e| CostbookError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut movements: Vec<_> = data.values().cloned().collect();
        newest_first(&mut movements);
        Ok(movements)
    }

    /// Find a movement by document number (case-insensitive)
    pub fn find_by_document(&self, document: &str) -> Result<Option<Movement>, CostbookError> {
        let wanted = document.trim().to_lowercase();
        if wanted.is_empty() {
            return Ok(None);
        }

        let data = self
            .data
            .read()
            .map_err(|e| CostbookError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data
            .values()
            .find(|m| {
                m.document_number
                    .as_deref()
                    .is_some_and(|doc| doc.trim().to_lowercase() == wanted)
            })
            .cloned())
    }

    /// Find movements whose id starts with the given fragment
    pub fn find_by_id_fragment(&self, fragment: &str) -> Result<Vec<Movement>, CostbookError> {
        let data = self
            .data
            .read()
            .map_err(|e| CostbookError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data
            .values()
            .filter(|m| m.id.matches_fragment(fragment))
            .cloned()
            .collect())
    }

    pub fn upsert(&self, movement: Movement) -> Result<(), CostbookError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| CostbookError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.insert(movement.id, movement);
        Ok(())
    }

    pub fn delete(&self, id: MovementId) -> Result<bool, CostbookError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| CostbookError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        Ok(data.remove(&id).is_some())
    }

    pub fn count(&self) -> Result<usize, CostbookError> {
        let data = self
            .data
            .read()
            .map_err(|e| CostbookError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.len())
    }
}

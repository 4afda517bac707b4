//! Storage layer for Costbook
//!
//! Provides JSON file storage with atomic writes, and the [`MovementSource`]
//! trait through which the rest of the crate fetches movement batches and
//! detail lines.

pub mod file_io;
pub mod init;
pub mod lines;
pub mod movements;

pub use file_io::{load_document, save_document};
pub use init::initialize_storage;
pub use lines::LineRepository;
pub use movements::MovementRepository;

use crate::config::paths::CostbookPaths;
use crate::error::CostbookError;
use crate::models::{Movement, MovementId, MovementLine};

/// Where movement batches and detail lines come from.
///
/// `fetch_movements` returns records newest first, already joined with their
/// counterpart. Either call may fail; callers decide how to degrade.
pub trait MovementSource {
    fn fetch_movements(&self) -> Result<Vec<Movement>, CostbookError>;

    fn fetch_lines(&self, movement_id: MovementId) -> Result<Vec<MovementLine>, CostbookError>;
}

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: CostbookPaths,
    pub movements: MovementRepository,
    pub lines: LineRepository,
}

impl Storage {
    pub fn new(paths: CostbookPaths) -> Result<Self, CostbookError> {
        paths.ensure_directories()?;

        Ok(Self {
            movements: MovementRepository::new(paths.movements_file()),
            lines: LineRepository::new(paths.lines_file()),
            paths,
        })
    }

    pub fn paths(&self) -> &CostbookPaths {
        &self.paths
    }

    /// Load all data from disk
    pub fn load_all(&mut self) -> Result<(), CostbookError> {
        self.movements.load()?;
        self.lines.load()?;
        Ok(())
    }

    /// Save all data to disk
    pub fn save_all(&self) -> Result<(), CostbookError> {
        self.movements.save()?;
        self.lines.save()?;
        Ok(())
    }
}

impl MovementSource for Storage {
    fn fetch_movements(&self) -> Result<Vec<Movement>, CostbookError> {
        self.movements.get_all()
    }

    fn fetch_lines(&self, movement_id: MovementId) -> Result<Vec<MovementLine>, CostbookError> {
        self.lines.get_for(movement_id)
    }
}

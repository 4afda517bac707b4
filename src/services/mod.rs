//! Service layer for Costbook
//!
//! The service layer provides business logic on top of the storage layer:
//! the movement filter engine, the browsing session built on it, and
//! validated movement creation and lifecycle changes.

pub mod filter;
pub mod movement;
pub mod session;

pub use filter::{apply_filter, FilterSpec, FilteredMovements, TypeFilter};
pub use movement::{CreateMovementInput, LineInput, MovementService};
pub use session::{MovementDetail, MovementSession};

//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod assistant;
pub mod export;
pub mod filter;
pub mod movement;

pub use assistant::{handle_assistant_command, AssistantCommands};
pub use export::{handle_export_command, ExportArgs, ExportFormat};
pub use filter::FilterArgs;
pub use movement::{handle_movement_command, MovementCommands};

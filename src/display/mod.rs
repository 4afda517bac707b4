//! Display formatting for terminal output
//!
//! Provides utilities for formatting movements for terminal display.

pub mod movement;

pub use movement::{format_date, format_movement_details, format_movement_list, format_totals};

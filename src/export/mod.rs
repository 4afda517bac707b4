//! Export module for Costbook
//!
//! Exports exactly the filtered movement view in several formats:
//! - CSV: one row per movement (spreadsheet-compatible)
//! - JSON: movements with their lines, filter and totals
//! - YAML: the same document, human-readable

pub mod csv;
pub mod json;
pub mod yaml;

pub use self::csv::export_movements_csv;
pub use json::{export_movements_json, MovementExport, EXPORT_SCHEMA_VERSION};
pub use yaml::export_movements_yaml;

//! YAML Export functionality
//!
//! Exports a filtered movement view to YAML for human reading.

use std::io::Write;

use crate::error::{CostbookError, CostbookResult};
use crate::export::json::MovementExport;
use crate::services::{FilterSpec, FilteredMovements};
use crate::storage::MovementSource;

/// Export a filtered view to YAML
pub fn export_movements_yaml<S: MovementSource + ?Sized, W: Write>(
    source: &S,
    view: &FilteredMovements<'_>,
    filter: &FilterSpec,
    writer: &mut W,
) -> CostbookResult<()> {
    let export = MovementExport::from_view(source, view, filter)?;

    let header = format!(
        "# Costbook movement export\n# Generated: {}\n# Movements: {}\n\n",
        export.exported_at, export.totals.count
    );
    writer
        .write_all(header.as_bytes())
        .map_err(|e| CostbookError::Export(e.to_string()))?;

    serde_yaml::to_writer(writer, &export)?;

    Ok(())
}

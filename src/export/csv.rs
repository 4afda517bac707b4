//! CSV Export functionality
//!
//! Exports a filtered movement view to CSV, one row per movement, with
//! amounts signed the way they are displayed.

use serde::Serialize;
use std::io::Write;

use crate::error::CostbookResult;
use crate::models::Movement;
use crate::services::FilteredMovements;

#[derive(Debug, Serialize)]
struct MovementCsvRow<'a> {
    id: String,
    document: String,
    date: String,
    #[serde(rename = "type")]
    movement_type: &'static str,
    status: &'static str,
    counterpart_kind: &'static str,
    counterpart: &'a str,
    amount: String,
    notes: &'a str,
}

impl<'a> From<&'a Movement> for MovementCsvRow<'a> {
    fn from(movement: &'a Movement) -> Self {
        Self {
            id: movement.id.as_uuid().to_string(),
            document: movement.document_label(),
            date: movement.date.to_string(),
            movement_type: movement.movement_type.as_str(),
            status: movement.status.as_str(),
            counterpart_kind: movement.counterpart.kind().unwrap_or(""),
            counterpart: movement.counterpart.name().unwrap_or(""),
            amount: movement.signed_total().to_string(),
            notes: movement.notes.as_deref().unwrap_or(""),
        }
    }
}

/// Export the visible movements of a view to CSV
pub fn export_movements_csv<W: Write>(view: &FilteredMovements<'_>, writer: W) -> CostbookResult<()> {
    let mut csv_writer = ::csv::Writer::from_writer(writer);

    for movement in &view.visible {
        csv_writer.serialize(MovementCsvRow::from(*movement))?;
    }

    csv_writer.flush()?;
    Ok(())
}

//! JSON Export functionality
//!
//! Exports a filtered movement view, with each movement's lines, to JSON
//! with schema versioning. Amounts are integer cents.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

use crate::error::CostbookResult;
use crate::models::{Money, Movement, MovementLine};
use crate::services::{FilterSpec, FilteredMovements};
use crate::storage::MovementSource;

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Export of one filtered view
#[derive(Debug, Clone, Serialize)]
pub struct MovementExport {
    /// Schema version for compatibility checking
    pub schema_version: String,

    pub exported_at: DateTime<Utc>,

    /// Application version that created the export
    pub app_version: String,

    /// The filter that produced this view
    pub filter: FilterSpec,

    pub totals: ExportTotals,

    pub movements: Vec<ExportedMovement>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportTotals {
    pub count: usize,
    pub inflow: Money,
    pub outflow: Money,
    pub net: Money,
}

/// A movement together with its lines
#[derive(Debug, Clone, Serialize)]
pub struct ExportedMovement {
    #[serde(flatten)]
    pub movement: Movement,
    pub lines: Vec<MovementLine>,
}

impl MovementExport {
    /// Build an export from a filtered view, fetching each movement's lines
    pub fn from_view<S: MovementSource + ?Sized>(
        source: &S,
        view: &FilteredMovements<'_>,
        filter: &FilterSpec,
    ) -> CostbookResult<Self> {
        let movements = view
            .visible
            .iter()
            .map(|m| {
                Ok(ExportedMovement {
                    movement: (*m).clone(),
                    lines: source.fetch_lines(m.id)?,
                })
            })
            .collect::<CostbookResult<Vec<_>>>()?;

        Ok(Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            filter: filter.clone(),
            totals: ExportTotals {
                count: view.len(),
                inflow: view.inflow_total,
                outflow: view.outflow_total,
                net: view.net(),
            },
            movements,
        })
    }
}

/// Export a filtered view to JSON
pub fn export_movements_json<S: MovementSource + ?Sized, W: Write>(
    source: &S,
    view: &FilteredMovements<'_>,
    filter: &FilterSpec,
    writer: &mut W,
    pretty: bool,
) -> CostbookResult<()> {
    let export = MovementExport::from_view(source, view, filter)?;

    if pretty {
        serde_json::to_writer_pretty(writer, &export)?;
    } else {
        serde_json::to_writer(writer, &export)?;
    }

    Ok(())
}

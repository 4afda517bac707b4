//! CLI command for data export
//!
//! Writes the filtered movement view to a file.

use clap::{Args, ValueEnum};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use crate::error::{CostbookError, CostbookResult};
use crate::export::{export_movements_csv, export_movements_json, export_movements_yaml};
use crate::services::MovementSession;
use crate::storage::Storage;

use super::filter::FilterArgs;

/// Export format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ExportFormat {
    /// CSV format (one row per movement)
    Csv,
    /// JSON format (movements with lines, filter and totals)
    Json,
    /// YAML format (same content, human-readable)
    Yaml,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Output file path
    pub output: PathBuf,

    /// Export format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: ExportFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    #[command(flatten)]
    pub filter: FilterArgs,
}

/// Handle the export command
pub fn handle_export_command(storage: &Storage, args: ExportArgs) -> CostbookResult<()> {
    let spec = args.filter.to_spec()?;

    let mut session = MovementSession::with_filter(spec.clone());
    if !session.refresh(storage) {
        return Err(CostbookError::Export(
            session
                .notice()
                .unwrap_or("Could not load movements")
                .to_string(),
        ));
    }
    let view = session.view();

    let file = File::create(&args.output).map_err(|e| {
        CostbookError::Export(format!(
            "Failed to create {}: {}",
            args.output.display(),
            e
        ))
    })?;
    let mut writer = BufWriter::new(file);

    match args.format {
        ExportFormat::Csv => export_movements_csv(&view, &mut writer)?,
        ExportFormat::Json => export_movements_json(storage, &view, &spec, &mut writer, args.pretty)?,
        ExportFormat::Yaml => export_movements_yaml(storage, &view, &spec, &mut writer)?,
    }

    writer
        .flush()
        .map_err(|e| CostbookError::Export(e.to_string()))?;

    println!(
        "Exported {} movements to {}",
        view.len(),
        args.output.display()
    );

    Ok(())
}

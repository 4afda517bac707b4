//! Movement CLI commands
//!
//! Implements CLI commands for recording, listing and managing movements.

use chrono::Utc;
use clap::Subcommand;

use crate::config::Settings;
use crate::display::movement::{format_movement_details, format_movement_list};
use crate::error::{CostbookError, CostbookResult};
use crate::models::{Counterpart, Money, MovementDate, MovementStatus, MovementType};
use crate::services::{CreateMovementInput, LineInput, MovementService, MovementSession};
use crate::storage::Storage;

use super::filter::FilterArgs;

/// Movement subcommands
#[derive(Subcommand, Debug)]
pub enum MovementCommands {
    /// List movements, newest first, with inflow/outflow totals
    List {
        #[command(flatten)]
        filter: FilterArgs,
        /// Maximum rows to print (totals still cover every match)
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Show a movement with its lines
    Show {
        /// Document number, short id, or full id
        id: String,
    },
    /// Record a new movement
    Add {
        /// Movement type (sale, purchase, expense, adjustment)
        movement_type: String,
        /// Total amount; computed from the lines when omitted
        #[arg(long)]
        total: Option<String>,
        /// Customer name (sales)
        #[arg(long, conflicts_with_all = ["provider", "service"])]
        customer: Option<String>,
        /// Provider name (purchases)
        #[arg(long, conflicts_with = "service")]
        provider: Option<String>,
        /// Service name (expenses)
        #[arg(long)]
        service: Option<String>,
        /// Date (YYYY-MM-DD or RFC 3339), defaults to now
        #[arg(short, long)]
        date: Option<String>,
        /// Document number such as an invoice or receipt number
        #[arg(long)]
        doc: Option<String>,
        /// Free-form notes
        #[arg(short, long)]
        notes: Option<String>,
        /// Initial status (draft, confirmed, completed)
        #[arg(long)]
        status: Option<String>,
        /// Line as DESCRIPTION:QUANTITY:UNIT_AMOUNT (repeatable)
        #[arg(short, long = "line")]
        lines: Vec<String>,
    },
    /// Change a movement's status
    Status {
        /// Document number, short id, or full id
        id: String,
        /// New status (confirmed, completed, voided)
        status: String,
    },
    /// Delete a draft movement
    Delete {
        /// Document number, short id, or full id
        id: String,
        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },
}

fn parse_type(value: &str) -> CostbookResult<MovementType> {
    value.parse().map_err(CostbookError::Validation)
}

fn parse_status(value: &str) -> CostbookResult<MovementStatus> {
    value.parse().map_err(CostbookError::Validation)
}

/// Handle a movement command
pub fn handle_movement_command(
    storage: &Storage,
    settings: &Settings,
    cmd: MovementCommands,
) -> CostbookResult<()> {
    let service = MovementService::new(storage);
    let symbol = &settings.currency_symbol;

    match cmd {
        MovementCommands::List { filter, limit } => {
            let mut session = MovementSession::with_filter(filter.to_spec()?);
            session.refresh(storage);
            if let Some(notice) = session.notice() {
                eprintln!("{}", notice);
            }

            let view = session.view();
            print!(
                "{}",
                format_movement_list(&view, settings, limit.unwrap_or(settings.list_limit))
            );
        }

        MovementCommands::Show { id } => {
            let movement = service.require(&id)?;

            let mut session = MovementSession::new();
            session.refresh(storage);
            session.open_detail(storage, movement.id)?;

            if let Some((movement, detail)) = session.detail() {
                print!(
                    "{}",
                    format_movement_details(
                        movement,
                        &detail.lines,
                        detail.error.as_deref(),
                        settings
                    )
                );
            }
        }

        MovementCommands::Add {
            movement_type,
            total,
            customer,
            provider,
            service: service_name,
            date,
            doc,
            notes,
            status,
            lines,
        } => {
            let movement_type = parse_type(&movement_type)?;

            let date = match date {
                Some(raw) => {
                    let parsed = MovementDate::parse(&raw);
                    if parsed.is_malformed() {
                        return Err(CostbookError::Validation(format!(
                            "Invalid date: '{}'. Use YYYY-MM-DD",
                            raw
                        )));
                    }
                    parsed
                }
                None => MovementDate::At(Utc::now()),
            };

            let total = total
                .map(|t| {
                    Money::parse(&t).map_err(|e| {
                        CostbookError::Validation(format!(
                            "Invalid amount format: '{}'. Use a format like '12.50'. Error: {}",
                            t, e
                        ))
                    })
                })
                .transpose()?;

            let counterpart = match (customer, provider, service_name) {
                (Some(name), _, _) => Counterpart::customer(name),
                (_, Some(name), _) => Counterpart::provider(name),
                (_, _, Some(name)) => Counterpart::service(name),
                _ => Counterpart::None,
            };

            let mut input = CreateMovementInput::new(movement_type, date);
            input.total = total;
            input.counterpart = counterpart;
            input.document_number = doc;
            input.notes = notes;
            input.status = status.as_deref().map(parse_status).transpose()?;
            input.lines = lines
                .iter()
                .map(|l| LineInput::parse(l))
                .collect::<CostbookResult<Vec<_>>>()?;

            let movement = service.create(input)?;

            println!("Recorded movement:");
            println!("  ID:          {}", movement.id);
            println!("  Document:    {}", movement.document_label());
            println!("  Type:        {}", movement.movement_type);
            println!("  Date:        {}", movement.date);
            println!("  Counterpart: {}", movement.counterpart);
            println!(
                "  Total:       {}",
                movement.signed_total().format_with_symbol(symbol)
            );
            println!("  Status:      {}", movement.status);
        }

        MovementCommands::Status { id, status } => {
            let status = parse_status(&status)?;
            let movement = service.require(&id)?;
            let before = movement.status;

            let updated = service.set_status(movement.id, status)?;
            println!(
                "{}: {} -> {}",
                updated.document_label(),
                before,
                updated.status
            );
        }

        MovementCommands::Delete { id, force } => {
            let movement = service.require(&id)?;

            if !force {
                println!("About to delete movement:");
                println!("  Document: {}", movement.document_label());
                println!("  Type:     {}", movement.movement_type);
                println!(
                    "  Total:    {}",
                    movement.signed_total().format_with_symbol(symbol)
                );
                println!();
                println!("Use --force to confirm deletion");
                return Ok(());
            }

            let deleted = service.delete(movement.id)?;
            println!(
                "Deleted movement: {} ({})",
                deleted.document_label(),
                deleted.movement_type
            );
        }
    }

    Ok(())
}

//! Movement display formatting
//!
//! Formats the filtered movement list, its totals footer, and the detail
//! view of a single movement with its lines.

use std::fmt::Write;

use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};
use tabled::{Table, Tabled};

use crate::config::Settings;
use crate::models::{Movement, MovementDate, MovementLine};
use crate::services::FilteredMovements;

#[derive(Tabled)]
struct MovementRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Document")]
    document: String,
    #[tabled(rename = "Type")]
    movement_type: String,
    #[tabled(rename = "Counterpart")]
    counterpart: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Amount")]
    amount: String,
}

impl MovementRow {
    fn new(movement: &Movement, settings: &Settings) -> Self {
        Self {
            date: format_date(&movement.date, &settings.date_format),
            document: truncate(&movement.document_label(), 16),
            movement_type: movement.movement_type.to_string(),
            counterpart: truncate(&movement.counterpart.to_string(), 28),
            status: movement.status.to_string(),
            amount: movement
                .signed_total()
                .format_with_symbol(&settings.currency_symbol),
        }
    }
}

/// Format a movement date with the configured format. Unreadable dates are
/// shown as stored.
pub fn format_date(date: &MovementDate, date_format: &str) -> String {
    match date {
        MovementDate::At(dt) => {
            let mut out = String::new();
            // An invalid strftime pattern surfaces as a fmt error
            if write!(out, "{}", dt.format(date_format)).is_err() {
                return dt.format("%Y-%m-%d").to_string();
            }
            out
        }
        MovementDate::Malformed(raw) => format!("{} (?)", raw),
    }
}

/// Format the filtered list as a table followed by its totals. At most
/// `limit` rows are printed; totals always cover the whole filtered list.
pub fn format_movement_list(view: &FilteredMovements<'_>, settings: &Settings, limit: usize) -> String {
    if view.is_empty() {
        return "No movements found.\n".to_string();
    }

    let rows: Vec<MovementRow> = view
        .visible
        .iter()
        .take(limit)
        .map(|m| MovementRow::new(m, settings))
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::psql())
        .with(Modify::new(Columns::single(5)).with(Alignment::right()));

    let mut output = table.to_string();
    output.push('\n');

    if view.len() > limit {
        output.push_str(&format!("Showing {} of {} movements\n", limit, view.len()));
    }

    output.push('\n');
    output.push_str(&format_totals(view, settings));
    output
}

/// Format the inflow/outflow footer
pub fn format_totals(view: &FilteredMovements<'_>, settings: &Settings) -> String {
    let symbol = &settings.currency_symbol;
    let mut output = String::new();
    output.push_str(&format!(
        "{:<10} {:>14}\n",
        "Inflow:",
        view.inflow_total.format_with_symbol(symbol)
    ));
    output.push_str(&format!(
        "{:<10} {:>14}\n",
        "Outflow:",
        view.outflow_total.format_with_symbol(symbol)
    ));
    output.push_str(&format!(
        "{:<10} {:>14}\n",
        "Net:",
        view.net().format_with_symbol(symbol)
    ));
    output
}

/// Format a movement with its lines. `line_error` is shown in place of the
/// lines when they could not be loaded.
pub fn format_movement_details(
    movement: &Movement,
    lines: &[MovementLine],
    line_error: Option<&str>,
    settings: &Settings,
) -> String {
    let symbol = &settings.currency_symbol;
    let mut output = String::new();

    output.push_str(&format!("Movement:    {}\n", movement.document_label()));
    output.push_str(&format!("Id:          {}\n", movement.id.as_uuid()));
    output.push_str(&format!("Type:        {}\n", movement.movement_type));
    output.push_str(&format!("Status:      {}\n", movement.status));
    output.push_str(&format!(
        "Date:        {}\n",
        format_date(&movement.date, &settings.date_format)
    ));
    output.push_str(&format!("Counterpart: {}\n", movement.counterpart));
    output.push_str(&format!(
        "Total:       {}\n",
        movement.signed_total().format_with_symbol(symbol)
    ));

    if let Some(notes) = &movement.notes {
        output.push_str(&format!("Notes:       {}\n", notes));
    }

    output.push('\n');

    if let Some(err) = line_error {
        output.push_str(&format!("Lines could not be loaded: {}\n", err));
        return output;
    }

    if lines.is_empty() {
        output.push_str("No lines recorded.\n");
        return output;
    }

    output.push_str(&format!(
        "{:<30} {:>8} {:>12} {:>12}\n",
        "Description", "Qty", "Unit", "Line total"
    ));
    output.push_str(&"-".repeat(65));
    output.push('\n');

    for line in lines {
        output.push_str(&format!(
            "{:<30} {:>8} {:>12} {:>12}\n",
            truncate(line.label(), 30),
            format_quantity(line.quantity),
            line.unit_amount(movement.movement_type)
                .format_with_symbol(symbol),
            line.line_total.format_with_symbol(symbol)
        ));
    }

    output
}

fn format_quantity(quantity: f64) -> String {
    if quantity.fract() == 0.0 {
        format!("{:.0}", quantity)
    } else {
        format!("{:.3}", quantity)
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}

/// Truncate to at most `max_chars` characters, marking the cut with "..."
fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Counterpart, Money, MovementType};
    use crate::services::{apply_filter, FilterSpec};
    use chrono::NaiveDate;

    fn day(d: u32) -> MovementDate {
        MovementDate::from_date(NaiveDate::from_ymd_opt(2024, 1, d).unwrap())
    }

    fn sample() -> Vec<Movement> {
        vec![
            Movement::new(MovementType::Sale, day(10), Money::from_cents(10000))
                .with_counterpart(Counterpart::customer("Acme Corp"))
                .with_document_number("INV-0001"),
            Movement::new(MovementType::Purchase, day(5), Money::from_cents(4000)),
        ]
    }

    #[test]
    fn test_list_shows_signed_amounts_and_totals() {
        let records = sample();
        let view = apply_filter(&records, &FilterSpec::new());
        let output = format_movement_list(&view, &Settings::default(), 50);

        assert!(output.contains("INV-0001"));
        assert!(output.contains("Acme Corp (customer)"));
        assert!(output.contains("(none)"));
        assert!(output.contains("$100.00"));
        assert!(output.contains("-$40.00"));
        assert!(output.contains(&records[1].id.short()));
        assert!(output.contains("Net:"));
        assert!(output.contains("$60.00"));
    }

    #[test]
    fn test_list_limit_keeps_full_totals() {
        let records = sample();
        let view = apply_filter(&records, &FilterSpec::new());
        let output = format_movement_list(&view, &Settings::default(), 1);

        assert!(output.contains("Showing 1 of 2 movements"));
        assert!(!output.contains(&records[1].id.short()));
        assert!(output.contains("$40.00"));
    }

    #[test]
    fn test_empty_list() {
        let view = apply_filter(&[], &FilterSpec::new());
        assert_eq!(
            format_movement_list(&view, &Settings::default(), 50),
            "No movements found.\n"
        );
    }

    #[test]
    fn test_details_with_lines_and_errors() {
        let movement = sample().remove(0);
        let line = MovementLine::for_movement(
            MovementType::Sale,
            movement.id,
            "Catering tray",
            2.5,
            Money::from_cents(4000),
        );
        let settings = Settings::default();

        let output = format_movement_details(&movement, &[line], None, &settings);
        assert!(output.contains("Catering tray"));
        assert!(output.contains("2.5"));
        assert!(output.contains("$40.00"));

        let failed = format_movement_details(&movement, &[], Some("timeout"), &settings);
        assert!(failed.contains("Lines could not be loaded: timeout"));

        let empty = format_movement_details(&movement, &[], None, &settings);
        assert!(empty.contains("No lines recorded."));
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(&day(10), "%d/%m/%Y"), "10/01/2024");
        assert_eq!(
            format_date(&MovementDate::Malformed("soon".into()), "%Y-%m-%d"),
            "soon (?)"
        );
    }

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("Café Olé", 20), "Café Olé");
        assert_eq!(truncate("Crème brûlée supplies", 10), "Crème b...");
    }
}

//! Shared filter flags
//!
//! The same `--type/--from/--to/--search` flags narrow `movement list`,
//! `export` and `assistant chat`. Unlike interactive input, bad values on
//! the command line are rejected.

use chrono::NaiveDate;
use clap::Args;

use crate::error::{CostbookError, CostbookResult};
use crate::services::{FilterSpec, TypeFilter};

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Movement type (sale, purchase, expense, adjustment, or all)
    #[arg(short = 't', long = "type")]
    pub movement_type: Option<String>,

    /// Start date, inclusive (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,

    /// End date, inclusive (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<String>,

    /// Text to find in document numbers and counterpart names
    #[arg(short, long)]
    pub search: Option<String>,
}

fn parse_date_flag(flag: &str, value: &str) -> CostbookResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        CostbookError::Validation(format!(
            "Invalid {} date: '{}'. Use YYYY-MM-DD",
            flag, value
        ))
    })
}

impl FilterArgs {
    pub fn to_spec(&self) -> CostbookResult<FilterSpec> {
        let type_filter = match &self.movement_type {
            Some(t) => t
                .parse::<TypeFilter>()
                .map_err(CostbookError::Validation)?,
            None => TypeFilter::All,
        };

        Ok(FilterSpec {
            type_filter,
            date_from: self
                .from
                .as_deref()
                .map(|v| parse_date_flag("--from", v))
                .transpose()?,
            date_to: self
                .to
                .as_deref()
                .map(|v| parse_date_flag("--to", v))
                .transpose()?,
            search_query: self.search.clone().filter(|s| !s.trim().is_empty()),
        })
    }
}

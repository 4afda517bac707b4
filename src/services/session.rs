//! Movement browsing session
//!
//! Holds the last fetched batch of movements, the user's filter, and the
//! currently opened detail view. The visible list is always recomputed from
//! the batch and the filter, so changing either never needs a refetch.
//! Fetch failures are non-fatal: the previous batch stays on screen and a
//! notice is recorded instead.

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::error::{CostbookError, CostbookResult};
use crate::models::{Movement, MovementId, MovementLine};
use crate::storage::MovementSource;

use super::filter::{
    apply_filter, parse_date_input, parse_type_input, FilterSpec, FilteredMovements, TypeFilter,
};

/// Lines loaded for the opened movement
#[derive(Debug, Clone, PartialEq)]
pub struct MovementDetail {
    pub movement_id: MovementId,
    pub lines: Vec<MovementLine>,
    /// Set when the lines could not be fetched; `lines` is then empty
    pub error: Option<String>,
}

/// State behind a movement list screen
#[derive(Debug, Default)]
pub struct MovementSession {
    records: Vec<Movement>,
    filter: FilterSpec,
    detail: Option<MovementDetail>,
    notice: Option<String>,
}

impl MovementSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(filter: FilterSpec) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    /// Fetch a fresh batch. Returns false when the fetch failed and the
    /// previous batch was kept.
    pub fn refresh<S: MovementSource + ?Sized>(&mut self, source: &S) -> bool {
        match source.fetch_movements() {
            Ok(records) => {
                debug!(count = records.len(), "loaded movement batch");
                self.records = records;
                self.notice = None;

                let detail_gone = self
                    .detail
                    .as_ref()
                    .is_some_and(|d| !self.records.iter().any(|m| m.id == d.movement_id));
                if detail_gone {
                    self.detail = None;
                }
                true
            }
            Err(e) => {
                warn!(error = %e, "failed to load movements, keeping previous list");
                self.notice = Some(format!("Could not load movements: {}", e));
                false
            }
        }
    }

    /// The full, unfiltered batch
    pub fn records(&self) -> &[Movement] {
        &self.records
    }

    pub fn filter(&self) -> &FilterSpec {
        &self.filter
    }

    /// The filtered list with its totals
    pub fn view(&self) -> FilteredMovements<'_> {
        apply_filter(&self.records, &self.filter)
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn set_filter(&mut self, filter: FilterSpec) {
        self.filter = filter;
    }

    pub fn set_type_filter(&mut self, type_filter: TypeFilter) {
        self.filter.type_filter = type_filter;
    }

    pub fn set_date_from(&mut self, date: Option<NaiveDate>) {
        self.filter.date_from = date;
    }

    pub fn set_date_to(&mut self, date: Option<NaiveDate>) {
        self.filter.date_to = date;
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        let query = query.into();
        self.filter.search_query = Some(query).filter(|q| !q.trim().is_empty());
    }

    /// Set the type filter from typed text; unknown text shows every type
    pub fn set_type_input(&mut self, input: &str) {
        self.filter.type_filter = parse_type_input(input);
    }

    /// Set the start date from typed text; invalid text removes the bound
    pub fn set_date_from_input(&mut self, input: &str) {
        self.filter.date_from = parse_date_input(input);
    }

    /// Set the end date from typed text; invalid text removes the bound
    pub fn set_date_to_input(&mut self, input: &str) {
        self.filter.date_to = parse_date_input(input);
    }

    pub fn clear_filters(&mut self) {
        self.filter = FilterSpec::default();
    }

    /// Open the detail view of a movement in the current batch and load its
    /// lines. A failed line fetch still opens the view, with no lines and
    /// the error recorded.
    pub fn open_detail<S: MovementSource + ?Sized>(
        &mut self,
        source: &S,
        movement_id: MovementId,
    ) -> CostbookResult<&MovementDetail> {
        if !self.records.iter().any(|m| m.id == movement_id) {
            return Err(CostbookError::movement_not_found(movement_id.to_string()));
        }

        let detail = match source.fetch_lines(movement_id) {
            Ok(lines) => MovementDetail {
                movement_id,
                lines,
                error: None,
            },
            Err(e) => {
                warn!(id = %movement_id, error = %e, "failed to load movement lines");
                MovementDetail {
                    movement_id,
                    lines: Vec::new(),
                    error: Some(e.to_string()),
                }
            }
        };

        let detail = self.detail.insert(detail);
        Ok(&*detail)
    }

    pub fn close_detail(&mut self) {
        self.detail = None;
    }

    /// The opened movement and its lines
    pub fn detail(&self) -> Option<(&Movement, &MovementDetail)> {
        let detail = self.detail.as_ref()?;
        let movement = self.records.iter().find(|m| m.id == detail.movement_id)?;
        Some((movement, detail))
    }
}

//! Movement filtering and aggregation
//!
//! Derives the list shown to the user from a fetched batch of movements and
//! the user's filter criteria, together with the inflow/outflow totals of
//! what survives. This is a pure function of its inputs: it never reorders,
//! never mutates, and never fails.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::models::{Money, Movement, MovementType};

/// Which movement types to show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeFilter {
    #[default]
    All,
    Only(MovementType),
}

impl TypeFilter {
    pub fn matches(&self, movement_type: MovementType) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => *wanted == movement_type,
        }
    }
}

impl fmt::Display for TypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Only(t) => write!(f, "{}", t.as_str()),
        }
    }
}

impl FromStr for TypeFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse::<MovementType>().map(Self::Only)
    }
}

impl Serialize for TypeFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// User-chosen criteria narrowing the movement list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterSpec {
    pub type_filter: TypeFilter,

    /// Inclusive, from the start of this day (UTC)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_from: Option<NaiveDate>,

    /// Inclusive, through 23:59:59.999 of this day (UTC)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_to: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_query: Option<String>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn movement_type(mut self, movement_type: MovementType) -> Self {
        self.type_filter = TypeFilter::Only(movement_type);
        self
    }

    pub fn date_from(mut self, date: NaiveDate) -> Self {
        self.date_from = Some(date);
        self
    }

    pub fn date_to(mut self, date: NaiveDate) -> Self {
        self.date_to = Some(date);
        self
    }

    pub fn search(mut self, query: impl Into<String>) -> Self {
        self.search_query = Some(query.into());
        self
    }

    /// Build a spec from raw text inputs. Anything unusable means
    /// "no filter" for that dimension rather than an error.
    pub fn from_inputs(type_input: &str, from_input: &str, to_input: &str, search: &str) -> Self {
        Self {
            type_filter: parse_type_input(type_input),
            date_from: parse_date_input(from_input),
            date_to: parse_date_input(to_input),
            search_query: Some(search.to_string()).filter(|s| !s.trim().is_empty()),
        }
    }

    /// True when the spec lets every record through
    pub fn is_unfiltered(&self) -> bool {
        self.type_filter == TypeFilter::All
            && self.date_from.is_none()
            && self.date_to.is_none()
            && self.normalized_query().is_none()
    }

    /// Trimmed, lower-cased search text; `None` when blank
    pub fn normalized_query(&self) -> Option<String> {
        self.search_query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase)
    }

    pub fn start_bound(&self) -> Option<DateTime<Utc>> {
        self.date_from
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
    }

    pub fn end_bound(&self) -> Option<DateTime<Utc>> {
        self.date_to
            .and_then(|d| d.and_hms_milli_opt(23, 59, 59, 999))
            .map(|dt| dt.and_utc())
    }

    /// Check a single movement against this spec
    pub fn matches(&self, movement: &Movement) -> bool {
        CompiledFilter::from(self).matches(movement)
    }
}

/// Lenient type parsing for interactive input: unknown text means "all"
pub fn parse_type_input(input: &str) -> TypeFilter {
    input.parse().unwrap_or_default()
}

/// Lenient date parsing for interactive input: blank or invalid means "no bound"
pub fn parse_date_input(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").ok()
}

/// A spec with its bounds and search text resolved once per batch
struct CompiledFilter {
    type_filter: TypeFilter,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    query: Option<String>,
}

impl From<&FilterSpec> for CompiledFilter {
    fn from(spec: &FilterSpec) -> Self {
        Self {
            type_filter: spec.type_filter,
            start: spec.start_bound(),
            end: spec.end_bound(),
            query: spec.normalized_query(),
        }
    }
}

impl CompiledFilter {
    fn matches(&self, movement: &Movement) -> bool {
        if !self.type_filter.matches(movement.movement_type) {
            return false;
        }

        // A movement without a usable date never satisfies a date bound
        let timestamp = movement.date.timestamp();
        if let Some(start) = self.start {
            if !timestamp.is_some_and(|t| t >= start) {
                return false;
            }
        }
        if let Some(end) = self.end {
            if !timestamp.is_some_and(|t| t <= end) {
                return false;
            }
        }

        if let Some(query) = &self.query {
            let in_document = movement
                .document_number
                .as_deref()
                .is_some_and(|doc| doc.to_lowercase().contains(query.as_str()));
            let in_counterpart = movement
                .counterpart
                .name()
                .is_some_and(|name| name.to_lowercase().contains(query.as_str()));
            if !in_document && !in_counterpart {
                return false;
            }
        }

        true
    }
}

/// The filtered list plus its aggregate totals
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredMovements<'a> {
    /// Surviving movements in their original relative order
    pub visible: Vec<&'a Movement>,
    /// Sum of absolute totals of visible sales
    pub inflow_total: Money,
    /// Sum of absolute totals of every other visible movement
    pub outflow_total: Money,
}

impl FilteredMovements<'_> {
    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    pub fn len(&self) -> usize {
        self.visible.len()
    }

    /// Inflows minus outflows
    pub fn net(&self) -> Money {
        self.inflow_total - self.outflow_total
    }
}

/// Filter a batch of movements and total what remains
pub fn apply_filter<'a>(records: &'a [Movement], spec: &FilterSpec) -> FilteredMovements<'a> {
    let compiled = CompiledFilter::from(spec);

    let mut visible = Vec::new();
    let mut inflow_total = Money::zero();
    let mut outflow_total = Money::zero();

    for movement in records.iter().filter(|m| compiled.matches(m)) {
        if movement.is_inflow() {
            inflow_total = inflow_total.saturating_add(movement.total.abs());
        } else {
            outflow_total = outflow_total.saturating_add(movement.total.abs());
        }
        visible.push(movement);
    }

    debug!(
        total = records.len(),
        visible = visible.len(),
        filter = %spec.type_filter,
        "applied movement filter"
    );

    FilteredMovements {
        visible,
        inflow_total,
        outflow_total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Counterpart, MovementDate};
    use chrono::{Duration, TimeZone};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn movement(movement_type: MovementType, cents: i64, date: NaiveDate) -> Movement {
        Movement::new(movement_type, MovementDate::from_date(date), Money::from_cents(cents))
    }

    /// sale 100 on 2024-01-10, purchase 40 on 2024-01-05
    fn sample_batch() -> Vec<Movement> {
        vec![
            movement(MovementType::Sale, 10000, day(2024, 1, 10)),
            movement(MovementType::Purchase, 4000, day(2024, 1, 5)),
        ]
    }

    fn mixed_batch() -> Vec<Movement> {
        vec![
            movement(MovementType::Sale, 2500, day(2024, 3, 9))
                .with_counterpart(Counterpart::customer("Acme Corp"))
                .with_document_number("INV-0103"),
            movement(MovementType::Expense, 1200, day(2024, 3, 8))
                .with_counterpart(Counterpart::service("City Power")),
            movement(MovementType::Purchase, 8000, day(2024, 3, 7))
                .with_counterpart(Counterpart::provider("Northern Mills"))
                .with_document_number("PO-77"),
            movement(MovementType::Adjustment, 300, day(2024, 3, 6)),
            movement(MovementType::Sale, 1800, day(2024, 3, 2))
                .with_counterpart(Counterpart::customer("Corner Cafe")),
        ]
    }

    fn ids(view: &FilteredMovements<'_>) -> Vec<crate::models::MovementId> {
        view.visible.iter().map(|m| m.id).collect()
    }

    #[test]
    fn test_unfiltered_view_is_identity() {
        let records = mixed_batch();
        let view = apply_filter(&records, &FilterSpec::new());

        assert_eq!(view.len(), records.len());
        assert!(view.visible.iter().zip(&records).all(|(a, b)| *a == b));
        assert!(FilterSpec::new().is_unfiltered());
    }

    #[test]
    fn test_all_types_scenario() {
        let records = sample_batch();
        let view = apply_filter(&records, &FilterSpec::new());

        assert_eq!(view.len(), 2);
        assert_eq!(view.inflow_total, Money::from_cents(10000));
        assert_eq!(view.outflow_total, Money::from_cents(4000));
        assert_eq!(view.net(), Money::from_cents(6000));
    }

    #[test]
    fn test_purchase_only_scenario() {
        let records = sample_batch();
        let view = apply_filter(&records, &FilterSpec::new().movement_type(MovementType::Purchase));

        assert_eq!(view.len(), 1);
        assert_eq!(view.visible[0].movement_type, MovementType::Purchase);
        assert_eq!(view.inflow_total, Money::zero());
        assert_eq!(view.outflow_total, Money::from_cents(4000));
    }

    #[test]
    fn test_type_filter_only_keeps_that_type() {
        let records = mixed_batch();
        for movement_type in MovementType::all() {
            let view = apply_filter(&records, &FilterSpec::new().movement_type(*movement_type));
            assert!(view.visible.iter().all(|m| m.movement_type == *movement_type));
            assert!(view.len() <= records.len());
        }
        let sales = apply_filter(&records, &FilterSpec::new().movement_type(MovementType::Sale));
        assert_eq!(sales.len(), 2);
        assert_eq!(sales.outflow_total, Money::zero());
        assert_eq!(sales.inflow_total, Money::from_cents(4300));
    }

    #[test]
    fn test_empty_input_gives_empty_view_for_any_spec() {
        let specs = [
            FilterSpec::new(),
            FilterSpec::new().movement_type(MovementType::Sale),
            FilterSpec::new()
                .date_from(day(2024, 1, 1))
                .date_to(day(2024, 12, 31))
                .search("acme"),
        ];
        for spec in specs {
            let view = apply_filter(&[], &spec);
            assert!(view.is_empty());
            assert_eq!(view.inflow_total, Money::zero());
            assert_eq!(view.outflow_total, Money::zero());
        }
    }

    #[test]
    fn test_totals_partition_visible_amounts() {
        let records = mixed_batch();
        let spec = FilterSpec::new().date_from(day(2024, 3, 3));
        let view = apply_filter(&records, &spec);

        let sum_abs: Money = view.visible.iter().map(|m| m.total.abs()).sum();
        assert_eq!(view.inflow_total + view.outflow_total, sum_abs);
        assert_eq!(view.inflow_total, Money::from_cents(2500));
        assert_eq!(view.outflow_total, Money::from_cents(9500));
    }

    #[test]
    fn test_totals_clamp_instead_of_overflowing() {
        let records = vec![
            movement(MovementType::Sale, i64::MAX, day(2024, 1, 1)),
            movement(MovementType::Sale, i64::MAX, day(2024, 1, 2)),
            movement(MovementType::Expense, i64::MIN, day(2024, 1, 3)),
        ];

        let view = apply_filter(&records, &FilterSpec::new());
        assert_eq!(view.len(), 3);
        assert_eq!(view.inflow_total, Money::from_cents(i64::MAX));
        assert_eq!(view.outflow_total, Money::from_cents(i64::MAX));
        assert_eq!(view.net(), Money::zero());
    }

    #[test]
    fn test_totals_use_absolute_values() {
        let mut odd = movement(MovementType::Sale, 500, day(2024, 1, 1));
        odd.total = Money::from_cents(-500);
        let mut refund = movement(MovementType::Expense, 200, day(2024, 1, 1));
        refund.total = Money::from_cents(-200);
        let records = vec![odd, refund];

        let view = apply_filter(&records, &FilterSpec::new());
        assert_eq!(view.inflow_total, Money::from_cents(500));
        assert_eq!(view.outflow_total, Money::from_cents(200));
    }

    #[test]
    fn test_filter_is_idempotent() {
        let records = mixed_batch();
        let spec = FilterSpec::new()
            .movement_type(MovementType::Sale)
            .search("c");
        let first = apply_filter(&records, &spec);
        let second = apply_filter(&records, &spec);
        assert_eq!(first, second);
    }

    #[test]
    fn test_preserves_input_order() {
        let mut records = mixed_batch();
        records.reverse();
        let view = apply_filter(&records, &FilterSpec::new().movement_type(MovementType::Sale));
        let expected: Vec<_> = records
            .iter()
            .filter(|m| m.movement_type == MovementType::Sale)
            .map(|m| m.id)
            .collect();
        assert_eq!(ids(&view), expected);
    }

    #[test]
    fn test_date_from_is_start_of_day_inclusive() {
        let records = mixed_batch();
        let view = apply_filter(&records, &FilterSpec::new().date_from(day(2024, 3, 7)));
        assert_eq!(view.len(), 3);

        let late_night = Movement::new(
            MovementType::Expense,
            Utc.with_ymd_and_hms(2024, 3, 6, 23, 59, 59).unwrap(),
            Money::from_cents(1),
        );
        assert!(!FilterSpec::new().date_from(day(2024, 3, 7)).matches(&late_night));
    }

    #[test]
    fn test_date_to_end_of_day_boundary() {
        let last_ms = Utc
            .with_ymd_and_hms(2024, 1, 10, 23, 59, 59)
            .unwrap()
            + Duration::milliseconds(999);
        let inside = Movement::new(MovementType::Sale, last_ms, Money::from_cents(100));
        let outside = Movement::new(
            MovementType::Sale,
            last_ms + Duration::milliseconds(1),
            Money::from_cents(100),
        );

        let spec = FilterSpec::new().date_to(day(2024, 1, 10));
        assert!(spec.matches(&inside));
        assert!(!spec.matches(&outside));
    }

    #[test]
    fn test_date_range() {
        let records = mixed_batch();
        let spec = FilterSpec::new()
            .date_from(day(2024, 3, 6))
            .date_to(day(2024, 3, 8));
        let view = apply_filter(&records, &spec);
        assert_eq!(view.len(), 3);
        assert_eq!(view.inflow_total, Money::zero());
        assert_eq!(view.outflow_total, Money::from_cents(9500));
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let records = mixed_batch();
        for query in ["acme", "CORP", "  Acme Corp  "] {
            let view = apply_filter(&records, &FilterSpec::new().search(query));
            assert_eq!(view.len(), 1, "query {:?}", query);
            assert_eq!(view.visible[0].counterpart.name(), Some("Acme Corp"));
        }
    }

    #[test]
    fn test_search_matches_document_and_every_counterpart_kind() {
        let records = mixed_batch();
        let count = |q: &str| apply_filter(&records, &FilterSpec::new().search(q)).len();

        assert_eq!(count("po-77"), 1);
        assert_eq!(count("inv-0103"), 1);
        assert_eq!(count("power"), 1);
        assert_eq!(count("mills"), 1);
        assert_eq!(count("cafe"), 1);
        assert_eq!(count("zzz"), 0);
    }

    #[test]
    fn test_search_never_matches_absent_fields() {
        let bare = movement(MovementType::Adjustment, 300, day(2024, 3, 6));
        let short_id = bare.id.short();
        let records = vec![bare];

        // The short id is only a display fallback, not searchable text
        let view = apply_filter(&records, &FilterSpec::new().search(short_id));
        assert!(view.is_empty());
        assert_eq!(view.outflow_total, Money::zero());
    }

    #[test]
    fn test_blank_search_is_no_filter() {
        let records = mixed_batch();
        let view = apply_filter(&records, &FilterSpec::new().search("   "));
        assert_eq!(view.len(), records.len());
        assert!(FilterSpec::new().search("  ").is_unfiltered());
    }

    #[test]
    fn test_malformed_dates_fail_every_date_bound() {
        let mut broken = movement(MovementType::Expense, 700, day(2024, 3, 5));
        broken.date = MovementDate::Malformed("not-a-date".to_string());
        let records = vec![broken];

        assert_eq!(apply_filter(&records, &FilterSpec::new()).len(), 1);
        assert!(apply_filter(&records, &FilterSpec::new().date_from(day(2000, 1, 1))).is_empty());
        assert!(apply_filter(&records, &FilterSpec::new().date_to(day(2100, 1, 1))).is_empty());
    }

    #[test]
    fn test_from_inputs_degrades_to_no_filter() {
        let spec = FilterSpec::from_inputs("refunds", "2024-13-45", "", "   ");
        assert!(spec.is_unfiltered());

        let spec = FilterSpec::from_inputs("Purchase", " 2024-03-01 ", "2024-03-31", "mill");
        assert_eq!(spec.type_filter, TypeFilter::Only(MovementType::Purchase));
        assert_eq!(spec.date_from, Some(day(2024, 3, 1)));
        assert_eq!(spec.date_to, Some(day(2024, 3, 31)));
        assert_eq!(spec.normalized_query().as_deref(), Some("mill"));
    }

    #[test]
    fn test_type_filter_parse_and_display() {
        assert_eq!("ALL".parse::<TypeFilter>().unwrap(), TypeFilter::All);
        assert_eq!(
            "expense".parse::<TypeFilter>().unwrap(),
            TypeFilter::Only(MovementType::Expense)
        );
        assert!("bogus".parse::<TypeFilter>().is_err());
        assert_eq!(TypeFilter::Only(MovementType::Sale).to_string(), "sale");
    }
}

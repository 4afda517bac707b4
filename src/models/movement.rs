//! Movement model
//!
//! A movement is one recorded financial transaction: a sale, purchase,
//! expense or stock adjustment. Totals are stored as non-negative amounts;
//! whether a movement is money in or money out follows from its type.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::counterpart::Counterpart;
use super::ids::MovementId;
use super::money::Money;

/// Kind of movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementType {
    Sale,
    Purchase,
    Expense,
    Adjustment,
}

impl MovementType {
    pub fn all() -> &'static [MovementType] {
        &[Self::Sale, Self::Purchase, Self::Expense, Self::Adjustment]
    }

    /// Sales bring money in; every other type takes money out
    pub fn is_inflow(&self) -> bool {
        matches!(self, Self::Sale)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sale => "sale",
            Self::Purchase => "purchase",
            Self::Expense => "expense",
            Self::Adjustment => "adjustment",
        }
    }
}

impl fmt::Display for MovementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sale => write!(f, "Sale"),
            Self::Purchase => write!(f, "Purchase"),
            Self::Expense => write!(f, "Expense"),
            Self::Adjustment => write!(f, "Adjustment"),
        }
    }
}

impl FromStr for MovementType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sale" => Ok(Self::Sale),
            "purchase" => Ok(Self::Purchase),
            "expense" => Ok(Self::Expense),
            "adjustment" => Ok(Self::Adjustment),
            other => Err(format!(
                "Unknown movement type '{}'. Use sale, purchase, expense, or adjustment",
                other
            )),
        }
    }
}

/// Lifecycle status of a movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MovementStatus {
    #[default]
    Draft,
    Confirmed,
    Voided,
    Completed,
}

impl MovementStatus {
    /// Voided movements are final and completed movements can only be voided
    pub fn can_transition_to(&self, next: MovementStatus) -> bool {
        match (self, next) {
            (a, b) if *a == b => false,
            (Self::Voided, _) => false,
            (Self::Completed, next) => next == Self::Voided,
            (Self::Confirmed, next) => next != Self::Draft,
            (Self::Draft, _) => true,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Confirmed => "confirmed",
            Self::Voided => "voided",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for MovementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft => write!(f, "Draft"),
            Self::Confirmed => write!(f, "Confirmed"),
            Self::Voided => write!(f, "Voided"),
            Self::Completed => write!(f, "Completed"),
        }
    }
}

impl FromStr for MovementStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "confirmed" => Ok(Self::Confirmed),
            "voided" | "void" => Ok(Self::Voided),
            "completed" | "complete" => Ok(Self::Completed),
            other => Err(format!(
                "Unknown status '{}'. Use draft, confirmed, voided, or completed",
                other
            )),
        }
    }
}

/// When a movement happened.
///
/// Stored as text. Values that cannot be read as a date are kept verbatim so
/// one bad row never prevents the rest of a batch from loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MovementDate {
    At(DateTime<Utc>),
    Malformed(String),
}

impl MovementDate {
    /// Parse RFC 3339, a naive `YYYY-MM-DD[ T]HH:MM:SS[.fff]` (read as UTC),
    /// or a bare `YYYY-MM-DD` (midnight UTC)
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return Self::At(dt.with_timezone(&Utc));
        }
        for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
                return Self::At(naive.and_utc());
            }
        }
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
                return Self::At(midnight.and_utc());
            }
        }

        Self::Malformed(raw.to_string())
    }

    pub fn from_date(date: NaiveDate) -> Self {
        match date.and_hms_opt(0, 0, 0) {
            Some(midnight) => Self::At(midnight.and_utc()),
            None => Self::Malformed(date.to_string()),
        }
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::At(dt) => Some(*dt),
            Self::Malformed(_) => None,
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed(_))
    }
}

impl From<DateTime<Utc>> for MovementDate {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::At(dt)
    }
}

impl fmt::Display for MovementDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::At(dt) => write!(f, "{}", dt.to_rfc3339_opts(SecondsFormat::Millis, true)),
            Self::Malformed(raw) => write!(f, "{}", raw),
        }
    }
}

impl Serialize for MovementDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MovementDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// A recorded movement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    pub id: MovementId,

    #[serde(rename = "type")]
    pub movement_type: MovementType,

    #[serde(default)]
    pub status: MovementStatus,

    pub date: MovementDate,

    /// Human-facing label such as an invoice or receipt number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_number: Option<String>,

    /// Always stored non-negative
    pub total: Money,

    #[serde(default)]
    pub counterpart: Counterpart,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Movement {
    pub fn new(movement_type: MovementType, date: impl Into<MovementDate>, total: Money) -> Self {
        let now = Utc::now();
        Self {
            id: MovementId::new(),
            movement_type,
            status: MovementStatus::Draft,
            date: date.into(),
            document_number: None,
            total,
            counterpart: Counterpart::None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_counterpart(mut self, counterpart: Counterpart) -> Self {
        self.counterpart = counterpart;
        self
    }

    pub fn with_document_number(mut self, document_number: impl Into<String>) -> Self {
        self.document_number = Some(document_number.into());
        self
    }

    pub fn with_status(mut self, status: MovementStatus) -> Self {
        self.status = status;
        self
    }

    /// Document number, or the short id when none was recorded
    pub fn document_label(&self) -> String {
        match self.document_number.as_deref().map(str::trim) {
            Some(doc) if !doc.is_empty() => doc.to_string(),
            _ => self.id.short(),
        }
    }

    pub fn is_inflow(&self) -> bool {
        self.movement_type.is_inflow()
    }

    /// Total with the display sign applied: positive for inflows,
    /// negative for outflows
    pub fn signed_total(&self) -> Money {
        if self.is_inflow() {
            self.total.abs()
        } else {
            -self.total.abs()
        }
    }

    pub fn set_status(&mut self, status: MovementStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }

    pub fn validate(&self) -> Result<(), MovementValidationError> {
        if self.total.is_negative() {
            return Err(MovementValidationError::NegativeTotal(self.total));
        }

        if let Some(name) = self.counterpart.name() {
            if name.trim().is_empty() {
                return Err(MovementValidationError::EmptyCounterpartName);
            }
        }

        if self.date.is_malformed() {
            return Err(MovementValidationError::MalformedDate(self.date.to_string()));
        }

        Ok(())
    }
}

impl fmt::Display for Movement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.document_label(),
            self.movement_type,
            self.counterpart,
            self.signed_total()
        )
    }
}

/// Validation errors for movements
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MovementValidationError {
    NegativeTotal(Money),
    EmptyCounterpartName,
    MalformedDate(String),
}

impl fmt::Display for MovementValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativeTotal(total) => {
                write!(f, "Movement total cannot be negative ({})", total)
            }
            Self::EmptyCounterpartName => write!(f, "Counterpart name cannot be empty"),
            Self::MalformedDate(raw) => write!(f, "Movement date is not a valid date: '{}'", raw),
        }
    }
}

impl std::error::Error for MovementValidationError {}

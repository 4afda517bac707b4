//! Movement line model
//!
//! Lines are the itemized contents of a movement (products sold, ingredients
//! bought). They belong to exactly one movement and are only loaded when that
//! movement's details are opened.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::MovementId;
use super::money::Money;
use super::movement::MovementType;

/// One itemized line of a movement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementLine {
    /// Owning movement
    pub movement_id: MovementId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Name of the linked product or ingredient
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_name: Option<String>,

    pub quantity: f64,

    /// Selling price per unit (sales)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Money>,

    /// Cost per unit (purchases, expenses, adjustments)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_cost: Option<Money>,

    pub line_total: Money,
}

impl MovementLine {
    /// Build a line for a movement of the given type. The unit amount is
    /// stored as a price for sales and as a cost otherwise, and the line
    /// total is computed from it.
    pub fn for_movement(
        movement_type: MovementType,
        movement_id: MovementId,
        description: impl Into<String>,
        quantity: f64,
        unit_amount: Money,
    ) -> Self {
        let (unit_price, unit_cost) = if movement_type.is_inflow() {
            (Some(unit_amount), None)
        } else {
            (None, Some(unit_amount))
        };

        Self {
            movement_id,
            description: Some(description.into()),
            item_name: None,
            quantity,
            unit_price,
            unit_cost,
            line_total: unit_amount.times_quantity(quantity),
        }
    }

    pub fn with_item_name(mut self, item_name: impl Into<String>) -> Self {
        self.item_name = Some(item_name.into());
        self
    }

    /// Description, falling back to the linked item's name
    pub fn label(&self) -> &str {
        [self.description.as_deref(), self.item_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|s| !s.is_empty())
            .unwrap_or("(no description)")
    }

    /// Unit amount as shown for the parent movement's type
    pub fn unit_amount(&self, movement_type: MovementType) -> Money {
        let (preferred, other) = if movement_type.is_inflow() {
            (self.unit_price, self.unit_cost)
        } else {
            (self.unit_cost, self.unit_price)
        };
        preferred.or(other).unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), LineValidationError> {
        if !self.quantity.is_finite() || self.quantity < 0.0 {
            return Err(LineValidationError::InvalidQuantity(self.quantity));
        }
        if self.line_total.is_negative() {
            return Err(LineValidationError::NegativeTotal(self.line_total));
        }
        Ok(())
    }
}

impl fmt::Display for MovementLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x{} {}", self.label(), self.quantity, self.line_total)
    }
}

/// Validation errors for movement lines
#[derive(Debug, Clone, PartialEq)]
pub enum LineValidationError {
    InvalidQuantity(f64),
    NegativeTotal(Money),
}

impl fmt::Display for LineValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidQuantity(q) => write!(f, "Line quantity must be zero or more (got {})", q),
            Self::NegativeTotal(total) => write!(f, "Line total cannot be negative ({})", total),
        }
    }
}

impl std::error::Error for LineValidationError {}

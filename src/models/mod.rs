//! Core data models for Costbook
//!
//! This module contains the data structures of the cost ledger: movements,
//! their itemized lines, counterparts, money amounts and typed ids.

pub mod counterpart;
pub mod ids;
pub mod line;
pub mod money;
pub mod movement;

pub use counterpart::Counterpart;
pub use ids::MovementId;
pub use line::{LineValidationError, MovementLine};
pub use money::{Money, MoneyParseError};
pub use movement::{
    Movement, MovementDate, MovementStatus, MovementType, MovementValidationError,
};

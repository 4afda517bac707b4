//! Counterpart model
//!
//! The customer, provider or service a movement was recorded against. It is
//! resolved once when records are fetched, so display and search code never
//! has to probe for which kind of party is attached.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The party on the other side of a movement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Counterpart {
    Customer { name: String },
    Provider { name: String },
    Service { name: String },
    /// No counterpart attached
    #[default]
    None,
}

impl Counterpart {
    pub fn customer(name: impl Into<String>) -> Self {
        Self::Customer { name: name.into() }
    }

    pub fn provider(name: impl Into<String>) -> Self {
        Self::Provider { name: name.into() }
    }

    pub fn service(name: impl Into<String>) -> Self {
        Self::Service { name: name.into() }
    }

    /// Display name, if a counterpart is attached
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Customer { name } | Self::Provider { name } | Self::Service { name } => {
                Some(name.as_str())
            }
            Self::None => None,
        }
    }

    /// Lower-case kind label ("customer", "provider", "service")
    pub fn kind(&self) -> Option<&'static str> {
        match self {
            Self::Customer { .. } => Some("customer"),
            Self::Provider { .. } => Some("provider"),
            Self::Service { .. } => Some("service"),
            Self::None => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl fmt::Display for Counterpart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.kind(), self.name()) {
            (Some(kind), Some(name)) => write!(f, "{} ({})", name, kind),
            _ => write!(f, "(none)"),
        }
    }
}

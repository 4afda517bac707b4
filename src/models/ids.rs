//! Strongly-typed ID wrappers
//!
//! Newtype wrappers keep movement ids from being confused with any other
//! UUID-shaped value at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Number of UUID characters shown in short labels
pub const SHORT_ID_LEN: usize = 8;

macro_rules! define_id {
    ($name:ident, $display_prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new random ID
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// First characters of the UUID, used wherever a human label is missing
            pub fn short(&self) -> String {
                self.0.to_string()[..SHORT_ID_LEN].to_string()
            }

            /// Check whether a user-typed fragment names this id.
            ///
            /// Accepts the full UUID, the prefixed display form, or a bare
            /// prefix of at least the short length.
            pub fn matches_fragment(&self, fragment: &str) -> bool {
                let fragment = fragment.trim().to_lowercase();
                let fragment = fragment.strip_prefix($display_prefix).unwrap_or(&fragment);
                fragment.len() >= SHORT_ID_LEN && self.0.to_string().starts_with(fragment)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $display_prefix, self.short())
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                let s = s.strip_prefix($display_prefix).unwrap_or(s);
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

define_id!(MovementId, "mov-");

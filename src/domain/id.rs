//! Domain ID Types with NewType Pattern
//!
//! Type-safe wrappers for the numeric identifiers used by orders and analysis
//! records. Parsing from a path segment accepts only positive integers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ListenerError;

/// Macro to generate NewType ID wrappers over positive `i64` values
macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw database value
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Get the inner value for binding into queries
            pub const fn as_i64(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ListenerError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().parse::<i64>() {
                    Ok(value) if value > 0 => Ok(Self(value)),
                    _ => Err(ListenerError::invalid_id(s)),
                }
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> i64 {
                id.0
            }
        }
    };
}

numeric_id!(
    /// Identifier of a repository ingestion order
    OrderId
);

numeric_id!(
    /// Identifier of a rating, statistic or expert analysis record
    AnalysisId
);

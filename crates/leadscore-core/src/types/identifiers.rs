//! Row-id newtypes for the CRM records the engine reads.
//!
//! Each type wraps the SQLite rowid so a `TeamId` cannot be passed where a
//! `StageId` is expected.

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Create a new ID from a raw rowid.
            pub fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Get the raw rowid.
            pub fn raw(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Lead / opportunity identifier.
    LeadId
);

define_id!(
    /// Sales team identifier.
    TeamId
);

define_id!(
    /// Pipeline stage identifier.
    StageId
);

define_id!(
    /// Lead tag identifier.
    TagId
);

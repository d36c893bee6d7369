//! Identifier newtypes and collection re-exports.

pub mod collections;
pub mod identifiers;

pub use collections::{FxHashMap, FxHashSet, SmallVec8};
pub use identifiers::{LeadId, StageId, TagId, TeamId};

//! # leadscore-engine
//!
//! Naive-Bayes lead scoring over a SQLite frequency table.
//!
//! - [`features`]: whitelisted (variable, value) pairs per lead
//! - [`classifier`]: won probability per lead from the frequency table
//! - [`increment`]: live count updates on won/lost transitions
//! - [`rebuild`]: scheduled truncate-and-rebuild plus open lead refresh
//! - [`engine`]: the [`ScoringEngine`] facade

pub mod classifier;
pub mod engine;
pub mod features;
pub mod fields;
pub mod frequency;
pub mod increment;
pub mod rebuild;
pub mod stages;
pub mod state;

pub use classifier::{NaiveBayesClassifier, ProbabilityMap};
pub use engine::{ScheduledUpdateReport, ScoringEngine};
pub use features::{ExtractionMode, Feature, FeatureExtractor, LeadFeatures, LeadSelection};
pub use fields::{FieldWhitelist, LeadField};
pub use increment::{IncrementReport, LiveIncrementer};
pub use rebuild::{AccessRights, BatchRebuilder, RebuildReport, RefreshReport, WriteStats};
pub use stages::StageCatalog;
pub use state::{plan_transition, LeadState, PendingChange, Transition};

//! FeatureExtractor: (variable, value) pairs per lead for a resolved whitelist.
//!
//! Two strategies with identical output:
//! - bulk: one scalar query plus one tag query for the whole selection
//! - per-record: one lead at a time, for small interactive recomputes

mod bulk;
mod per_record;

use leadscore_core::constants::PER_RECORD_EXTRACTION_LIMIT;
use leadscore_core::errors::StorageError;
use leadscore_core::types::{LeadId, SmallVec8, StageId, TagId, TeamId};
use leadscore_storage::queries::leads::{LeadFilter, LeadRow};
use rusqlite::types::Value;
use rusqlite::Connection;
use serde::Serialize;

use crate::fields::{FieldWhitelist, LeadField};
use crate::state::{LeadState, LeadStatus};

/// One categorical observation on a lead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Feature {
    pub variable: &'static str,
    pub value: String,
}

impl Feature {
    pub fn new(variable: &'static str, value: impl Into<String>) -> Self {
        Self {
            variable,
            value: value.into(),
        }
    }
}

/// Extracted scoring input of one lead.
///
/// Stage and team are carried as typed fields; `features` holds the
/// whitelisted scalar fields followed by one `tag_id` entry per tag.
#[derive(Debug, Clone, PartialEq)]
pub struct LeadFeatures {
    pub lead_id: LeadId,
    pub team_id: Option<TeamId>,
    pub stage_id: Option<StageId>,
    pub state: LeadState,
    pub features: SmallVec8<Feature>,
}

/// Which leads to extract.
#[derive(Debug, Clone)]
pub enum LeadSelection {
    Ids(Vec<LeadId>),
    Filter(LeadFilter),
}

/// Extraction strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMode {
    Bulk,
    PerRecord,
}

impl ExtractionMode {
    pub fn from_batch_flag(batch_mode: bool) -> Self {
        if batch_mode {
            Self::Bulk
        } else {
            Self::PerRecord
        }
    }

    /// Per-record for small lead counts, bulk otherwise.
    pub fn for_count(count: usize) -> Self {
        Self::from_batch_flag(count > PER_RECORD_EXTRACTION_LIMIT)
    }
}

/// Reads scoring features off leads for a fixed whitelist.
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    whitelist: FieldWhitelist,
    columns: Vec<&'static str>,
}

impl FeatureExtractor {
    pub fn new(whitelist: FieldWhitelist) -> Self {
        let columns = whitelist.columns();
        Self { whitelist, columns }
    }

    pub fn whitelist(&self) -> &FieldWhitelist {
        &self.whitelist
    }

    /// Extract features for `selection`, ordered by lead id.
    pub fn extract(
        &self,
        conn: &Connection,
        selection: &LeadSelection,
        mode: ExtractionMode,
    ) -> Result<Vec<LeadFeatures>, StorageError> {
        let leads = match mode {
            ExtractionMode::Bulk => bulk::extract(self, conn, selection)?,
            ExtractionMode::PerRecord => per_record::extract(self, conn, selection)?,
        };
        tracing::debug!(leads = leads.len(), ?mode, "features extracted");
        Ok(leads)
    }

    /// Build the feature list of one lead from its scalar row and sorted tags.
    fn assemble(&self, row: LeadRow, tags: &[TagId]) -> LeadFeatures {
        let mut features = SmallVec8::new();
        for (field, value) in self.whitelist.scalar_fields().iter().zip(row.values.iter()) {
            if let Some(value) = feature_value(*field, value) {
                features.push(Feature::new(field.variable(), value));
            }
        }
        if self.whitelist.includes_tags() {
            for tag in tags {
                features.push(Feature::new(LeadField::Tags.variable(), tag.raw().to_string()));
            }
        }
        let status = LeadStatus {
            stage_id: row.stage_id,
            probability: row.probability,
            active: row.active,
        };
        LeadFeatures {
            lead_id: row.id,
            team_id: row.team_id,
            stage_id: row.stage_id,
            state: status.state(),
            features,
        }
    }

    fn columns(&self) -> &[&'static str] {
        &self.columns
    }
}

/// String form of a raw column value, or `None` when the value is falsy and
/// the field does not keep falsy values.
pub fn feature_value(field: LeadField, value: &Value) -> Option<String> {
    let rendered = match value {
        Value::Null => None,
        Value::Integer(0) => None,
        Value::Integer(i) => Some(i.to_string()),
        Value::Real(r) if *r == 0.0 => None,
        Value::Real(r) => Some(r.to_string()),
        Value::Text(t) if t.is_empty() => None,
        Value::Text(t) => Some(t.clone()),
        Value::Blob(_) => None,
    };
    match rendered {
        Some(v) => Some(v),
        None if field.keeps_falsy() => Some("false".to_string()),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_value_falsy_rules() {
        assert_eq!(feature_value(LeadField::Country, &Value::Null), None);
        assert_eq!(feature_value(LeadField::Country, &Value::Integer(0)), None);
        assert_eq!(
            feature_value(LeadField::Country, &Value::Integer(12)),
            Some("12".to_string())
        );
        assert_eq!(
            feature_value(LeadField::EmailState, &Value::Null),
            Some("false".to_string())
        );
        assert_eq!(
            feature_value(LeadField::PhoneState, &Value::Text("incorrect".into())),
            Some("incorrect".to_string())
        );
        assert_eq!(feature_value(LeadField::Lang, &Value::Text(String::new())), None);
    }

    #[test]
    fn test_mode_for_count() {
        assert_eq!(ExtractionMode::for_count(1), ExtractionMode::PerRecord);
        assert_eq!(
            ExtractionMode::for_count(PER_RECORD_EXTRACTION_LIMIT + 1),
            ExtractionMode::Bulk
        );
    }
}

//! Lead field schema descriptor and the resolved feature whitelist.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Every lead field the engine knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadField {
    Stage,
    Team,
    Country,
    State,
    Lang,
    Source,
    Medium,
    Campaign,
    EmailState,
    PhoneState,
    Tags,
}

impl LeadField {
    pub const ALL: [LeadField; 11] = [
        Self::Stage,
        Self::Team,
        Self::Country,
        Self::State,
        Self::Lang,
        Self::Source,
        Self::Medium,
        Self::Campaign,
        Self::EmailState,
        Self::PhoneState,
        Self::Tags,
    ];

    /// Schema name, as written in the whitelist.
    pub fn name(self) -> &'static str {
        match self {
            Self::Stage => "stage_id",
            Self::Team => "team_id",
            Self::Country => "country_id",
            Self::State => "state_id",
            Self::Lang => "lang_id",
            Self::Source => "source_id",
            Self::Medium => "medium_id",
            Self::Campaign => "campaign_id",
            Self::EmailState => "email_state",
            Self::PhoneState => "phone_state",
            Self::Tags => "tag_ids",
        }
    }

    /// Variable name used in the frequency table.
    pub fn variable(self) -> &'static str {
        match self {
            Self::Tags => "tag_id",
            other => other.name(),
        }
    }

    /// Leads-table column, `None` for the many-to-many tags.
    pub fn column(self) -> Option<&'static str> {
        match self {
            Self::Tags => None,
            other => Some(other.name()),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    /// Stage and team are always read and never whitelisted.
    pub fn is_structural(self) -> bool {
        matches!(self, Self::Stage | Self::Team)
    }

    /// Quality flags keep an empty value as the explicit value `"false"`.
    pub fn keeps_falsy(self) -> bool {
        matches!(self, Self::EmailState | Self::PhoneState)
    }
}

/// Whitelisted feature fields, resolved once from the comma-delimited setting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldWhitelist {
    scalars: SmallVec<[LeadField; 8]>,
    tags: bool,
}

impl FieldWhitelist {
    /// Resolve a comma-delimited whitelist. Unknown, structural and duplicate
    /// names are dropped.
    pub fn parse(raw: &str) -> Self {
        let mut whitelist = Self::default();
        for name in raw.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            match LeadField::from_name(name) {
                Some(field) if field.is_structural() => {
                    tracing::debug!(field = name, "structural field in whitelist ignored");
                }
                Some(LeadField::Tags) => whitelist.tags = true,
                Some(field) => {
                    if !whitelist.scalars.contains(&field) {
                        whitelist.scalars.push(field);
                    }
                }
                None => {
                    tracing::debug!(field = name, "unknown field in whitelist dropped");
                }
            }
        }
        whitelist
    }

    /// Whitelisted scalar fields, in whitelist order.
    pub fn scalar_fields(&self) -> &[LeadField] {
        &self.scalars
    }

    /// Leads-table columns of the scalar fields.
    pub fn columns(&self) -> Vec<&'static str> {
        self.scalars.iter().filter_map(|f| f.column()).collect()
    }

    pub fn includes_tags(&self) -> bool {
        self.tags
    }

    pub fn contains(&self, field: LeadField) -> bool {
        match field {
            LeadField::Tags => self.tags,
            other => self.scalars.contains(&other),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.scalars.is_empty() && !self.tags
    }
}

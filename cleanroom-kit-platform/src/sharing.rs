//! Wire model for catalog resources: exchanges, listings, grants, and the
//! privacy policies attached to shared views.
//!
//! The serialized form of these types is the platform's canonical JSON
//! shape; the state file and the provisioning engine's outcome report both
//! use it directly.

use serde::{Deserialize, Serialize};

use crate::ids::{DatasetId, ExchangeName, ListingName, TableId};

/// Whether an exchange enforces clean-room analysis rules on its listings
/// or shares data openly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SharingEnvironment {
    CleanRoom,
    Open,
}

/// Definition of a data exchange, the container listings are published
/// into. The environment is fixed at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeSpec {
    pub display_name: String,
    pub description: String,
    pub environment: SharingEnvironment,
}

/// An exchange that exists on the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeInfo {
    pub name: ExchangeName,
    pub spec: ExchangeSpec,
}

/// Marketplace category a listing is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Financial,
    Retail,
}

/// What a listing exposes: a whole dataset, or a single table-shaped
/// object (a table or a policy view).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingSource {
    Dataset(DatasetId),
    Table(TableId),
}

/// Definition of a listing. `source` and `allow_egress` are the binding
/// parts of the definition; the display fields are cosmetic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingSpec {
    pub display_name: String,
    pub description: String,
    pub categories: Vec<Category>,
    pub source: ListingSource,
    /// When false, subscribers may query the listing but not copy rows out
    /// of it.
    pub allow_egress: bool,
}

/// A listing that exists on the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingInfo {
    pub name: ListingName,
    pub spec: ListingSpec,
}

/// Join condition accepted by a join restriction policy. The platform
/// only supports unconditional overlap joins today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JoinCondition {
    JoinAny,
}

/// Requires query results to aggregate at least `threshold` distinct
/// values of the privacy unit column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationThresholdPolicy {
    pub threshold: u32,
    pub privacy_unit_column: String,
}

/// Restricts joins against the view to the named columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRestrictionPolicy {
    pub join_condition: JoinCondition,
    pub join_allowed_columns: Vec<String>,
}

/// Privacy policy attached to a shared view. At most one field is set per
/// view; which one depends on the analysis rule derived for the table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivacyPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation_threshold_policy: Option<AggregationThresholdPolicy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_restriction_policy: Option<JoinRestrictionPolicy>,
}

impl PrivacyPolicy {
    pub fn aggregation_threshold(threshold: u32, privacy_unit_column: impl Into<String>) -> Self {
        Self {
            aggregation_threshold_policy: Some(AggregationThresholdPolicy {
                threshold,
                privacy_unit_column: privacy_unit_column.into(),
            }),
            join_restriction_policy: None,
        }
    }

    pub fn join_restriction(join_allowed_columns: Vec<String>) -> Self {
        Self {
            aggregation_threshold_policy: None,
            join_restriction_policy: Some(JoinRestrictionPolicy {
                join_condition: JoinCondition::JoinAny,
                join_allowed_columns,
            }),
        }
    }
}

/// Definition of a view: its query and the privacy policy enforced on
/// anyone querying through it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewDefinition {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privacy_policy: Option<PrivacyPolicy>,
}

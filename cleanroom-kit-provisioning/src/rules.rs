//! Mapping from table roles to the analysis rules that protect them.
//!
//! The mapping is a closed table, not a heuristic: every [`TableRole`] maps
//! to exactly one rule shape, so reviewers can audit the full policy surface
//! by reading one function.

use serde::Serialize;

use cleanroom_kit_platform::sharing::PrivacyPolicy;

use crate::types::{TableProfile, TableRole};

/// Minimum distinct privacy units a group must contain before an
/// aggregate row is released.
pub const DEFAULT_AGGREGATION_THRESHOLD: u32 = 50;

/// The analysis rule attached to a policy view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum AnalysisRule {
    /// Rows may only be joined on the stated column; no row-level reads.
    ListOverlap { join_column: String },
    /// Results must aggregate at least `threshold` distinct values of the
    /// privacy unit column.
    AggregationThreshold {
        privacy_unit_column: String,
        threshold: u32,
    },
}

impl AnalysisRule {
    /// The column the rule constrains.
    pub fn column(&self) -> &str {
        match self {
            Self::ListOverlap { join_column } => join_column,
            Self::AggregationThreshold {
                privacy_unit_column, ..
            } => privacy_unit_column,
        }
    }

    /// The wire-level privacy policy enforcing this rule.
    pub(crate) fn privacy_policy(&self) -> PrivacyPolicy {
        match self {
            Self::ListOverlap { join_column } => {
                PrivacyPolicy::join_restriction(vec![join_column.clone()])
            }
            Self::AggregationThreshold {
                privacy_unit_column,
                threshold,
            } => PrivacyPolicy::aggregation_threshold(*threshold, privacy_unit_column.clone()),
        }
    }
}

/// Derives the analysis rule for a table from its declared role.
pub fn rule_for(profile: &TableProfile) -> AnalysisRule {
    match profile.role {
        TableRole::Identity | TableRole::Transactional => AnalysisRule::ListOverlap {
            join_column: profile.rule_column.clone(),
        },
        TableRole::AggregateMetric => AnalysisRule::AggregationThreshold {
            privacy_unit_column: profile.rule_column.clone(),
            threshold: DEFAULT_AGGREGATION_THRESHOLD,
        },
    }
}

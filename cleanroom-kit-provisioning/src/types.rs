//! Request and outcome types for the publish operation.

use std::fmt;

use serde::Serialize;

use cleanroom_kit_platform::ids::{DatasetId, Principal, ShareScope, TableId};
use cleanroom_kit_platform::sharing::SharingEnvironment;

use crate::rules::AnalysisRule;

/// How a shared table is used by the subscribing party. The role alone
/// decides which analysis rule protects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableRole {
    /// User-level identity data joined via the hashed join key.
    Identity,
    /// Profile data queried in aggregate over a privacy unit.
    AggregateMetric,
    /// Event-level data matched against the other party's references.
    Transactional,
}

/// A table to share, with the declared role and the column its analysis
/// rule applies to. Callers state both explicitly; the engine never
/// infers them from names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableProfile {
    pub table: TableId,
    pub role: TableRole,
    pub rule_column: String,
}

/// What a listing publishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareTarget {
    /// A whole dataset, shared as-is. Only open exchanges accept this.
    Dataset(DatasetId),
    /// One table, shared through a policy view in clean-room exchanges or
    /// directly in open ones.
    Table(TableProfile),
}

/// One publish request: which exchange and listing to converge, what they
/// share, and who may subscribe.
#[derive(Debug, Clone)]
pub struct PublishRequest {
    pub scope: ShareScope,
    pub exchange_id: String,
    pub listing_id: String,
    pub environment: SharingEnvironment,
    pub target: ShareTarget,
    pub subscriber: Principal,
    /// Listing display name; derived from the listing id when absent.
    pub display_name: Option<String>,
    /// Whether subscribers may copy query results out of the clean room.
    pub allow_egress: bool,
}

/// Kinds of resources the engine ensures, in publish order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Exchange,
    View,
    Listing,
    Grant,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Exchange => "exchange",
            Self::View => "view",
            Self::Listing => "listing",
            Self::Grant => "grant",
        };
        f.write_str(label)
    }
}

/// Whether an ensure step created the resource or found it already in the
/// desired state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnsureOutcome {
    Created,
    Adopted,
}

/// Everything a completed publish converged, resource by resource. A rerun
/// of the same request reports `Adopted` across the board.
#[derive(Debug, Clone, Serialize)]
pub struct PublishOutcome {
    pub exchange: String,
    pub exchange_outcome: EnsureOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<AnalysisRule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_outcome: Option<EnsureOutcome>,
    pub listing: String,
    pub listing_outcome: EnsureOutcome,
    pub subscriber: String,
    pub grant_outcome: EnsureOutcome,
}

impl PublishOutcome {
    /// True when the run changed nothing on the platform.
    pub fn fully_adopted(&self) -> bool {
        self.exchange_outcome == EnsureOutcome::Adopted
            && self.view_outcome.unwrap_or(EnsureOutcome::Adopted) == EnsureOutcome::Adopted
            && self.listing_outcome == EnsureOutcome::Adopted
            && self.grant_outcome == EnsureOutcome::Adopted
    }
}

//! Policy views, the protected objects clean-room listings actually share.
//!
//! A listing in a clean-room exchange never points at the raw table: it
//! points at a pass-through view that carries the table's privacy policy.
//! The view lives in the same dataset as its backing table and is named
//! after the listing so either can be traced from the other.

use cleanroom_kit_platform::ids::TableId;
use cleanroom_kit_platform::sharing::ViewDefinition;
use cleanroom_kit_platform::{PlatformError, Warehouse};

use crate::error::{PublishError, PublishResult};
use crate::rules::AnalysisRule;
use crate::types::ResourceKind;

/// Id of the policy view backing a listing.
pub(crate) fn policy_view_id(listing_id: &str, backing: &TableId) -> PublishResult<TableId> {
    backing
        .dataset()
        .table(format!("{listing_id}_view"))
        .map_err(|err| PublishError::Input(err.to_string()))
}

/// Definition of the policy view: the table passed through unchanged, with
/// the rule's privacy policy attached.
pub(crate) fn policy_view_definition(backing: &TableId, rule: &AnalysisRule) -> ViewDefinition {
    ViewDefinition {
        query: format!("SELECT * FROM `{backing}`"),
        privacy_policy: Some(rule.privacy_policy()),
    }
}

/// Checks that the rule's column exists on the backing table. A rule
/// naming a missing column would otherwise surface only when a subscriber
/// first queries the view.
pub(crate) async fn check_rule_column(
    warehouse: &dyn Warehouse,
    backing: &TableId,
    rule: &AnalysisRule,
) -> PublishResult<()> {
    let schema = match warehouse.table_schema(backing).await {
        Ok(schema) => schema,
        Err(PlatformError::NotFound { .. }) => {
            return Err(PublishError::Input(format!(
                "table `{backing}` does not exist; generate the datasets before publishing"
            )));
        }
        Err(err) => {
            return Err(PublishError::from_platform(
                ResourceKind::View,
                &backing.to_string(),
                err,
            ));
        }
    };
    if !schema.has_column(rule.column()) {
        return Err(PublishError::Input(format!(
            "table `{backing}` has no column `{}` named by its analysis rule",
            rule.column()
        )));
    }
    Ok(())
}

//! End-to-end publish flows against the in-memory platform.

use std::sync::Arc;

use cleanroom_kit_platform::ids::{DatasetId, Location, Principal, ProjectId, ShareScope};
use cleanroom_kit_platform::memory::InMemoryPlatform;
use cleanroom_kit_platform::schema::{ColumnSpec, ColumnType, TableSchema};
use cleanroom_kit_platform::sharing::{
    ListingSource, PrivacyPolicy, SharingEnvironment, ViewDefinition,
};
use cleanroom_kit_platform::{ExchangeCatalog, Warehouse};
use cleanroom_kit_provisioning::{
    AnalysisRule, EnsureOutcome, PublishError, PublishRequest, ShareTarget, SharingService,
    TableProfile, TableRole,
};

fn project() -> ProjectId {
    ProjectId::new("acme-retail").unwrap()
}

fn scope() -> ShareScope {
    ShareScope::new(project(), Location::new("US").unwrap())
}

fn subscriber() -> Principal {
    Principal::new("analyst@merchant.example.com").unwrap()
}

fn wallet_dataset() -> DatasetId {
    DatasetId::new(project(), "wallet_provider").unwrap()
}

/// Platform with the wallet provider's generated tables already in place,
/// as they would be after a `generate` run.
async fn seeded_platform() -> Arc<InMemoryPlatform> {
    let platform = Arc::new(InMemoryPlatform::new());
    let dataset = wallet_dataset();
    platform.ensure_dataset(&dataset).await.unwrap();

    let wallet_users = dataset.table("wallet_users").unwrap();
    let schema = TableSchema::new(vec![
        ColumnSpec::new("wallet_user_id", ColumnType::Int64),
        ColumnSpec::new("hashed_email", ColumnType::String),
        ColumnSpec::new("account_tier", ColumnType::String),
    ]);
    platform
        .replace_table(&wallet_users, &schema, Vec::new())
        .await
        .unwrap();

    let transactions = dataset.table("transactions").unwrap();
    let schema = TableSchema::new(vec![
        ColumnSpec::new("transaction_id", ColumnType::String),
        ColumnSpec::new("order_id", ColumnType::Int64),
        ColumnSpec::new("transaction_amount", ColumnType::Float64),
    ]);
    platform
        .replace_table(&transactions, &schema, Vec::new())
        .await
        .unwrap();

    platform
}

fn service(platform: &Arc<InMemoryPlatform>) -> SharingService {
    SharingService::new(platform.clone(), platform.clone())
}

fn wallet_users_request() -> PublishRequest {
    PublishRequest {
        scope: scope(),
        exchange_id: "commerce_clean_room".to_string(),
        listing_id: "wallet_users_share".to_string(),
        environment: SharingEnvironment::CleanRoom,
        target: ShareTarget::Table(TableProfile {
            table: wallet_dataset().table("wallet_users").unwrap(),
            role: TableRole::AggregateMetric,
            rule_column: "hashed_email".to_string(),
        }),
        subscriber: subscriber(),
        display_name: None,
        allow_egress: false,
    }
}

#[tokio::test]
async fn first_publish_creates_the_full_chain() {
    let platform = seeded_platform().await;
    let outcome = service(&platform)
        .publish(&wallet_users_request())
        .await
        .unwrap();

    assert_eq!(outcome.exchange_outcome, EnsureOutcome::Created);
    assert_eq!(outcome.view_outcome, Some(EnsureOutcome::Created));
    assert_eq!(outcome.listing_outcome, EnsureOutcome::Created);
    assert_eq!(outcome.grant_outcome, EnsureOutcome::Created);

    // The listing points at the policy view, not the raw table.
    let listing_name = scope()
        .exchange("commerce_clean_room")
        .unwrap()
        .listing("wallet_users_share")
        .unwrap();
    let listing = platform.get_listing(&listing_name).await.unwrap().unwrap();
    let view_id = wallet_dataset().table("wallet_users_share_view").unwrap();
    assert_eq!(listing.spec.source, ListingSource::Table(view_id.clone()));
    assert!(!listing.spec.allow_egress);

    // The view carries the aggregation rule for the declared role.
    let view = platform.get_view(&view_id).await.unwrap().unwrap();
    assert_eq!(
        view.query,
        "SELECT * FROM `acme-retail.wallet_provider.wallet_users`"
    );
    let policy = view.privacy_policy.unwrap().aggregation_threshold_policy.unwrap();
    assert_eq!(policy.threshold, 50);
    assert_eq!(policy.privacy_unit_column, "hashed_email");

    let grants = platform.list_grants(&listing_name).await.unwrap();
    assert_eq!(grants, vec![subscriber()]);
}

#[tokio::test]
async fn republish_adopts_every_resource() {
    let platform = seeded_platform().await;
    let service = service(&platform);
    let request = wallet_users_request();

    service.publish(&request).await.unwrap();
    let second = service.publish(&request).await.unwrap();

    assert_eq!(second.exchange_outcome, EnsureOutcome::Adopted);
    assert_eq!(second.view_outcome, Some(EnsureOutcome::Adopted));
    assert_eq!(second.listing_outcome, EnsureOutcome::Adopted);
    assert_eq!(second.grant_outcome, EnsureOutcome::Adopted);
    assert!(second.fully_adopted());

    // No duplicate grant for the same subscriber.
    let listing_name = scope()
        .exchange("commerce_clean_room")
        .unwrap()
        .listing("wallet_users_share")
        .unwrap();
    let grants = platform.list_grants(&listing_name).await.unwrap();
    assert_eq!(grants.len(), 1);
}

#[tokio::test]
async fn egress_flip_is_a_conflict_and_mutates_nothing() {
    let platform = seeded_platform().await;
    let service = service(&platform);
    let request = wallet_users_request();
    service.publish(&request).await.unwrap();

    let mut flipped = request.clone();
    flipped.allow_egress = true;
    let err = service.publish(&flipped).await.unwrap_err();
    assert!(matches!(err, PublishError::Conflict { .. }));
    assert!(err.to_string().contains("allow_egress"));

    // The listing kept its original definition and grants.
    let listing_name = scope()
        .exchange("commerce_clean_room")
        .unwrap()
        .listing("wallet_users_share")
        .unwrap();
    let listing = platform.get_listing(&listing_name).await.unwrap().unwrap();
    assert!(!listing.spec.allow_egress);
    let grants = platform.list_grants(&listing_name).await.unwrap();
    assert_eq!(grants, vec![subscriber()]);
}

#[tokio::test]
async fn each_role_gets_its_rule() {
    let cases = [
        ("wallet_users", TableRole::Identity, "hashed_email"),
        ("wallet_users", TableRole::AggregateMetric, "hashed_email"),
        ("transactions", TableRole::Transactional, "order_id"),
    ];

    for (table, role, column) in cases {
        let platform = seeded_platform().await;
        let mut request = wallet_users_request();
        request.target = ShareTarget::Table(TableProfile {
            table: wallet_dataset().table(table).unwrap(),
            role,
            rule_column: column.to_string(),
        });
        let outcome = service(&platform).publish(&request).await.unwrap();

        let expected = match role {
            TableRole::AggregateMetric => AnalysisRule::AggregationThreshold {
                privacy_unit_column: column.to_string(),
                threshold: 50,
            },
            TableRole::Identity | TableRole::Transactional => AnalysisRule::ListOverlap {
                join_column: column.to_string(),
            },
        };
        assert_eq!(outcome.rule, Some(expected));

        let view_id = wallet_dataset().table("wallet_users_share_view").unwrap();
        let view = platform.get_view(&view_id).await.unwrap().unwrap();
        let policy = view.privacy_policy.unwrap();
        match role {
            TableRole::AggregateMetric => {
                assert!(policy.aggregation_threshold_policy.is_some());
                assert!(policy.join_restriction_policy.is_none());
            }
            TableRole::Identity | TableRole::Transactional => {
                let join = policy.join_restriction_policy.unwrap();
                assert_eq!(join.join_allowed_columns, vec![column.to_string()]);
                assert!(policy.aggregation_threshold_policy.is_none());
            }
        }
    }
}

#[tokio::test]
async fn orphaned_view_is_reused_by_name() {
    let platform = seeded_platform().await;

    // A previous run created the view, then failed before the listing.
    let view_id = wallet_dataset().table("wallet_users_share_view").unwrap();
    let definition = ViewDefinition {
        query: "SELECT * FROM `acme-retail.wallet_provider.wallet_users`".to_string(),
        privacy_policy: Some(PrivacyPolicy::aggregation_threshold(50, "hashed_email")),
    };
    platform.create_view(&view_id, &definition).await.unwrap();

    let outcome = service(&platform)
        .publish(&wallet_users_request())
        .await
        .unwrap();
    assert_eq!(outcome.view_outcome, Some(EnsureOutcome::Adopted));
    assert_eq!(outcome.listing_outcome, EnsureOutcome::Created);
    assert_eq!(outcome.grant_outcome, EnsureOutcome::Created);
}

#[tokio::test]
async fn repurposed_view_name_is_a_conflict() {
    let platform = seeded_platform().await;

    // Someone already owns the view name with an unrelated definition.
    let view_id = wallet_dataset().table("wallet_users_share_view").unwrap();
    let definition = ViewDefinition {
        query: "SELECT 1 AS probe".to_string(),
        privacy_policy: None,
    };
    platform.create_view(&view_id, &definition).await.unwrap();

    let err = service(&platform)
        .publish(&wallet_users_request())
        .await
        .unwrap_err();
    assert!(matches!(err, PublishError::Conflict { .. }));

    // The run stopped before the listing step.
    let listing_name = scope()
        .exchange("commerce_clean_room")
        .unwrap()
        .listing("wallet_users_share")
        .unwrap();
    assert!(platform.get_listing(&listing_name).await.unwrap().is_none());
}

#[tokio::test]
async fn open_exchange_shares_a_dataset_without_a_view() {
    let platform = seeded_platform().await;
    let request = PublishRequest {
        scope: scope(),
        exchange_id: "retail_open_exchange".to_string(),
        listing_id: "wallet_full_dataset".to_string(),
        environment: SharingEnvironment::Open,
        target: ShareTarget::Dataset(wallet_dataset()),
        subscriber: subscriber(),
        display_name: None,
        allow_egress: false,
    };
    let outcome = service(&platform).publish(&request).await.unwrap();

    assert!(outcome.rule.is_none());
    assert!(outcome.view.is_none());
    assert!(outcome.view_outcome.is_none());

    let listing_name = scope()
        .exchange("retail_open_exchange")
        .unwrap()
        .listing("wallet_full_dataset")
        .unwrap();
    let listing = platform.get_listing(&listing_name).await.unwrap().unwrap();
    assert_eq!(listing.spec.source, ListingSource::Dataset(wallet_dataset()));
    assert!(!listing.spec.allow_egress);
}

#[tokio::test]
async fn egress_outside_a_clean_room_is_an_input_error() {
    let platform = seeded_platform().await;
    let mut request = wallet_users_request();
    request.exchange_id = "retail_open_exchange".to_string();
    request.environment = SharingEnvironment::Open;
    request.allow_egress = true;
    let err = service(&platform).publish(&request).await.unwrap_err();
    assert!(matches!(err, PublishError::Input(_)));
    assert!(err.to_string().contains("allow_egress"));

    // Rejected before anything was provisioned.
    let exchange_name = scope().exchange("retail_open_exchange").unwrap();
    assert!(platform
        .get_data_exchange(&exchange_name)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn egress_is_recorded_on_clean_room_listings() {
    let platform = seeded_platform().await;
    let mut request = wallet_users_request();
    request.allow_egress = true;
    service(&platform).publish(&request).await.unwrap();

    let listing_name = scope()
        .exchange("commerce_clean_room")
        .unwrap()
        .listing("wallet_users_share")
        .unwrap();
    let listing = platform.get_listing(&listing_name).await.unwrap().unwrap();
    assert!(listing.spec.allow_egress);
}

#[tokio::test]
async fn open_exchange_shares_a_table_unrestricted() {
    let platform = seeded_platform().await;
    let mut request = wallet_users_request();
    request.exchange_id = "retail_open_exchange".to_string();
    request.environment = SharingEnvironment::Open;
    let outcome = service(&platform).publish(&request).await.unwrap();

    assert!(outcome.rule.is_none());
    assert!(outcome.view.is_none());

    let listing_name = scope()
        .exchange("retail_open_exchange")
        .unwrap()
        .listing("wallet_users_share")
        .unwrap();
    let listing = platform.get_listing(&listing_name).await.unwrap().unwrap();
    let raw_table = wallet_dataset().table("wallet_users").unwrap();
    assert_eq!(listing.spec.source, ListingSource::Table(raw_table));
}

#[tokio::test]
async fn clean_room_rejects_dataset_targets() {
    let platform = seeded_platform().await;
    let mut request = wallet_users_request();
    request.target = ShareTarget::Dataset(wallet_dataset());
    let err = service(&platform).publish(&request).await.unwrap_err();
    assert!(matches!(err, PublishError::Input(_)));

    // Rejected before anything was provisioned.
    let exchange_name = scope().exchange("commerce_clean_room").unwrap();
    assert!(platform
        .get_data_exchange(&exchange_name)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn missing_rule_column_is_an_input_error() {
    let platform = seeded_platform().await;
    let mut request = wallet_users_request();
    request.target = ShareTarget::Table(TableProfile {
        table: wallet_dataset().table("wallet_users").unwrap(),
        role: TableRole::AggregateMetric,
        rule_column: "email".to_string(),
    });
    let err = service(&platform).publish(&request).await.unwrap_err();
    assert!(matches!(err, PublishError::Input(_)));
    assert!(err.to_string().contains("email"));

    // The exchange from step one stays; later runs adopt it. The listing
    // was never created.
    let exchange_name = scope().exchange("commerce_clean_room").unwrap();
    assert!(platform
        .get_data_exchange(&exchange_name)
        .await
        .unwrap()
        .is_some());
    let listing_name = exchange_name.listing("wallet_users_share").unwrap();
    assert!(platform.get_listing(&listing_name).await.unwrap().is_none());
}

#[tokio::test]
async fn listing_display_name_defaults_to_the_id() {
    let platform = seeded_platform().await;
    service(&platform)
        .publish(&wallet_users_request())
        .await
        .unwrap();

    let listing_name = scope()
        .exchange("commerce_clean_room")
        .unwrap()
        .listing("wallet_users_share")
        .unwrap();
    let listing = platform.get_listing(&listing_name).await.unwrap().unwrap();
    assert_eq!(listing.spec.display_name, "Wallet Users Share");
}

#[tokio::test]
async fn listing_display_name_can_be_overridden() {
    let platform = seeded_platform().await;
    let mut request = wallet_users_request();
    request.display_name = Some("Wallet Users (hashed)".to_string());
    service(&platform).publish(&request).await.unwrap();

    let listing_name = scope()
        .exchange("commerce_clean_room")
        .unwrap()
        .listing("wallet_users_share")
        .unwrap();
    let listing = platform.get_listing(&listing_name).await.unwrap().unwrap();
    assert_eq!(listing.spec.display_name, "Wallet Users (hashed)");
}

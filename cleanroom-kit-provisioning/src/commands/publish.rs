//! Publish logic for the sharing service.

use cleanroom_kit_platform::sharing::{
    Category, ExchangeInfo, ExchangeSpec, ListingInfo, ListingSource, ListingSpec,
    SharingEnvironment, ViewDefinition,
};
use cleanroom_kit_platform::PlatformResult;

use crate::ensure::ensure;
use crate::error::{PublishError, PublishResult};
use crate::rules::rule_for;
use crate::types::{PublishOutcome, PublishRequest, ResourceKind, ShareTarget};
use crate::view::{check_rule_column, policy_view_definition, policy_view_id};

impl super::service::SharingService {
    /// Publish a share: converge the exchange, the policy view (for
    /// clean-room tables), the listing, and the subscriber grant, in that
    /// order. Every step adopts matching resources and creates missing
    /// ones; a mismatch stops the run before anything is mutated.
    pub async fn publish(&self, request: &PublishRequest) -> PublishResult<PublishOutcome> {
        let exchange_name = request
            .scope
            .exchange(request.exchange_id.clone())
            .map_err(|err| PublishError::Input(err.to_string()))?;
        let listing_name = exchange_name
            .listing(request.listing_id.clone())
            .map_err(|err| PublishError::Input(err.to_string()))?;

        // A whole dataset has no single rule column to protect, so clean
        // rooms only accept table targets.
        if request.environment == SharingEnvironment::CleanRoom
            && matches!(request.target, ShareTarget::Dataset(_))
        {
            return Err(PublishError::Input(
                "clean-room exchanges share individual tables, not whole datasets".to_string(),
            ));
        }

        // Egress is a clean-room listing property; open exchanges grant
        // direct reads with no policy to loosen.
        if request.allow_egress && request.environment == SharingEnvironment::Open {
            return Err(PublishError::Input(
                "allow_egress applies only to clean-room table sharing".to_string(),
            ));
        }

        let exchange_spec = ExchangeSpec {
            display_name: display_name_from_id(&request.exchange_id),
            description: match request.environment {
                SharingEnvironment::CleanRoom => {
                    "Clean-room data exchange provisioned by cleanroom-kit".to_string()
                }
                SharingEnvironment::Open => {
                    "Open data exchange provisioned by cleanroom-kit".to_string()
                }
            },
            environment: request.environment,
        };
        let requested_environment = request.environment;
        let exchange = ensure(
            ResourceKind::Exchange,
            &exchange_name.to_string(),
            self.catalog.get_data_exchange(&exchange_name),
            self.catalog.create_data_exchange(&exchange_name, &exchange_spec),
            |existing: ExchangeInfo| {
                // The environment is fixed at creation; listings inherit
                // whatever the exchange already enforces.
                if existing.spec.environment != requested_environment {
                    log::warn!(
                        "exchange `{}` already exists as {:?}, not {:?}; keeping it",
                        existing.name,
                        existing.spec.environment,
                        requested_environment
                    );
                }
                Ok(existing)
            },
        )
        .await?;

        let (source, rule, view, view_outcome) = match (&request.target, request.environment) {
            (ShareTarget::Dataset(dataset), _) => {
                (ListingSource::Dataset(dataset.clone()), None, None, None)
            }
            (ShareTarget::Table(profile), SharingEnvironment::Open) => {
                (ListingSource::Table(profile.table.clone()), None, None, None)
            }
            (ShareTarget::Table(profile), SharingEnvironment::CleanRoom) => {
                let rule = rule_for(profile);
                check_rule_column(self.warehouse.as_ref(), &profile.table, &rule).await?;

                let view_id = policy_view_id(&request.listing_id, &profile.table)?;
                let definition = policy_view_definition(&profile.table, &rule);
                let ensured = ensure(
                    ResourceKind::View,
                    &view_id.to_string(),
                    self.warehouse.get_view(&view_id),
                    self.warehouse.create_view(&view_id, &definition),
                    |existing: ViewDefinition| {
                        if existing == definition {
                            Ok(())
                        } else {
                            Err("an object with this name already exists with a different \
                                 definition"
                                .to_string())
                        }
                    },
                )
                .await?;

                let view_path = view_id.to_string();
                (
                    ListingSource::Table(view_id),
                    Some(rule),
                    Some(view_path),
                    Some(ensured.outcome),
                )
            }
        };

        let listing_spec = ListingSpec {
            display_name: request
                .display_name
                .clone()
                .unwrap_or_else(|| display_name_from_id(&request.listing_id)),
            description: format!(
                "Listing for `{}`, provisioned by cleanroom-kit",
                source_path(&source)
            ),
            categories: vec![Category::Financial, Category::Retail],
            source,
            allow_egress: request.allow_egress,
        };
        let listing = ensure(
            ResourceKind::Listing,
            &listing_name.to_string(),
            self.catalog.get_listing(&listing_name),
            self.catalog.create_listing(&listing_name, &listing_spec),
            |existing: ListingInfo| {
                // Source and egress are the binding parts of a listing;
                // display fields may drift without a conflict.
                if existing.spec.source != listing_spec.source {
                    return Err(format!(
                        "listing already points at `{}`",
                        source_path(&existing.spec.source)
                    ));
                }
                if existing.spec.allow_egress != listing_spec.allow_egress {
                    return Err(format!(
                        "listing already exists with allow_egress = {}",
                        existing.spec.allow_egress
                    ));
                }
                Ok(existing)
            },
        )
        .await?;

        let grant_lookup = async {
            let grants = self.catalog.list_grants(&listing_name).await?;
            PlatformResult::Ok(grants.contains(&request.subscriber).then_some(()))
        };
        let grant = ensure(
            ResourceKind::Grant,
            &format!("{} on {}", request.subscriber, listing_name),
            grant_lookup,
            self.catalog.grant_subscriber(&listing_name, &request.subscriber),
            Ok,
        )
        .await?;

        Ok(PublishOutcome {
            exchange: exchange.handle.name.to_string(),
            exchange_outcome: exchange.outcome,
            rule,
            view,
            view_outcome,
            listing: listing.handle.name.to_string(),
            listing_outcome: listing.outcome,
            subscriber: request.subscriber.to_string(),
            grant_outcome: grant.outcome,
        })
    }
}

/// Title-cases an underscore-separated id: `commerce_clean_room` becomes
/// `Commerce Clean Room`.
fn display_name_from_id(id: &str) -> String {
    id.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().collect::<String>() + chars.as_str()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn source_path(source: &ListingSource) -> String {
    match source {
        ListingSource::Dataset(dataset) => dataset.to_string(),
        ListingSource::Table(table) => table.to_string(),
    }
}

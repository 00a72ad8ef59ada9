use async_trait::async_trait;

use crate::error::PlatformResult;
use crate::ids::{DatasetId, ExchangeName, ListingName, Principal, TableId};
use crate::schema::{Row, TableSchema};
use crate::sharing::{ExchangeInfo, ExchangeSpec, ListingInfo, ListingSpec, ViewDefinition};

/// Tabular storage side of the platform: datasets, tables, and views.
///
/// Writes are full replacements; the contract has no append or mutate
/// operations, so re-running a producer converges on the same content.
#[async_trait]
pub trait Warehouse: Send + Sync {
    /// Creates the dataset if it does not exist. Existing datasets are
    /// left untouched.
    async fn ensure_dataset(&self, dataset: &DatasetId) -> PlatformResult<()>;

    /// Schema of an existing table.
    async fn table_schema(&self, table: &TableId) -> PlatformResult<TableSchema>;

    /// All rows of an existing table.
    async fn read_rows(&self, table: &TableId) -> PlatformResult<Vec<Row>>;

    /// Creates or fully replaces a table with the given schema and rows.
    async fn replace_table(
        &self,
        table: &TableId,
        schema: &TableSchema,
        rows: Vec<Row>,
    ) -> PlatformResult<()>;

    /// Definition of a view, or `None` if no view with that name exists.
    async fn get_view(&self, view: &TableId) -> PlatformResult<Option<ViewDefinition>>;

    /// Creates a view. Re-creating with an identical definition is a
    /// no-op; an existing view (or table) with a different definition is a
    /// `DefinitionConflict`.
    async fn create_view(&self, view: &TableId, definition: &ViewDefinition) -> PlatformResult<()>;
}

/// Sharing side of the platform: exchanges, listings, and grants.
///
/// Creates are not idempotent here; callers look up first and treat a
/// racing `AlreadyExists` as a conflict.
#[async_trait]
pub trait ExchangeCatalog: Send + Sync {
    async fn get_data_exchange(&self, name: &ExchangeName) -> PlatformResult<Option<ExchangeInfo>>;

    async fn create_data_exchange(
        &self,
        name: &ExchangeName,
        spec: &ExchangeSpec,
    ) -> PlatformResult<ExchangeInfo>;

    async fn get_listing(&self, name: &ListingName) -> PlatformResult<Option<ListingInfo>>;

    /// Creates a listing inside an existing exchange. Fails with
    /// `NotFound` if the exchange is missing.
    async fn create_listing(
        &self,
        name: &ListingName,
        spec: &ListingSpec,
    ) -> PlatformResult<ListingInfo>;

    /// Principals currently granted subscriber access to a listing.
    async fn list_grants(&self, listing: &ListingName) -> PlatformResult<Vec<Principal>>;

    /// Grants subscriber access. Granting to a principal that already has
    /// access is a no-op.
    async fn grant_subscriber(
        &self,
        listing: &ListingName,
        principal: &Principal,
    ) -> PlatformResult<()>;
}

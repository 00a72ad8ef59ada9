//! Sharing service layer.
//!
//! The service holds the two platform clients (warehouse and exchange
//! catalog) and exposes the high-level publish operation used by the CLI.
//! Both clients are trait objects, so tests and the CLI can back them with
//! the in-memory platform while a deployment backs them with a real one.

use std::sync::Arc;

use cleanroom_kit_platform::{ExchangeCatalog, Warehouse};

/// Main service struct that holds platform clients and provides the
/// provisioning operations.
pub struct SharingService {
    pub(crate) warehouse: Arc<dyn Warehouse>,
    pub(crate) catalog: Arc<dyn ExchangeCatalog>,
}

impl SharingService {
    /// Create a new service instance over the given platform clients.
    pub fn new(warehouse: Arc<dyn Warehouse>, catalog: Arc<dyn ExchangeCatalog>) -> Self {
        Self { warehouse, catalog }
    }

    // publish() method implementation is in publish.rs
}

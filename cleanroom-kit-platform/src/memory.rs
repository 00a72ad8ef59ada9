//! In-memory platform used by the simulator.
//!
//! A single process-local catalog implements both platform traits. The
//! whole catalog serializes to one JSON state file so consecutive CLI
//! invocations observe the resources earlier invocations created; the
//! platform stays the only state of record.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{PlatformError, PlatformResult};
use crate::ids::{DatasetId, ExchangeName, ListingName, Principal, TableId};
use crate::schema::{Row, TableSchema};
use crate::sharing::{ExchangeInfo, ExchangeSpec, ListingInfo, ListingSpec, ViewDefinition};
use crate::traits::{ExchangeCatalog, Warehouse};

#[derive(Debug, Serialize, Deserialize)]
struct StoredTable {
    schema: TableSchema,
    rows: Vec<Row>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct DatasetEntry {
    tables: BTreeMap<String, StoredTable>,
    views: BTreeMap<String, ViewDefinition>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ListingEntry {
    spec: ListingSpec,
    subscribers: BTreeSet<Principal>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ExchangeEntry {
    spec: ExchangeSpec,
    listings: BTreeMap<String, ListingEntry>,
}

/// Everything the simulated platform knows, keyed by canonical resource
/// names so the serialized state file is stable and diffable.
#[derive(Debug, Default, Serialize, Deserialize)]
struct CatalogState {
    datasets: BTreeMap<String, DatasetEntry>,
    exchanges: BTreeMap<String, ExchangeEntry>,
}

/// Both halves of the platform contract, backed by process memory.
#[derive(Debug, Default)]
pub struct InMemoryPlatform {
    state: Mutex<CatalogState>,
}

impl InMemoryPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a platform from a previously saved state file. A missing
    /// file yields an empty platform; an unreadable one is `Corrupt`.
    pub fn load(path: &Path) -> PlatformResult<Self> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("no state file at {}, starting empty", path.display());
                return Ok(Self::new());
            }
            Err(e) => {
                return Err(PlatformError::Transient(format!(
                    "failed to read state file {}: {e}",
                    path.display()
                )))
            }
        };
        let state: CatalogState = serde_json::from_str(&contents).map_err(|e| {
            PlatformError::Corrupt(format!(
                "state file {} does not parse: {e}",
                path.display()
            ))
        })?;
        debug!(
            "loaded state file {} ({} datasets, {} exchanges)",
            path.display(),
            state.datasets.len(),
            state.exchanges.len()
        );
        Ok(Self {
            state: Mutex::new(state),
        })
    }

    /// Writes the current catalog back to `path`.
    pub fn save(&self, path: &Path) -> PlatformResult<()> {
        let state = self.lock()?;
        let contents = serde_json::to_string_pretty(&*state)
            .map_err(|e| PlatformError::Corrupt(format!("state does not serialize: {e}")))?;
        fs::write(path, contents).map_err(|e| {
            PlatformError::Transient(format!(
                "failed to write state file {}: {e}",
                path.display()
            ))
        })?;
        debug!("saved state file {}", path.display());
        Ok(())
    }

    fn lock(&self) -> PlatformResult<MutexGuard<'_, CatalogState>> {
        self.state
            .lock()
            .map_err(|_| PlatformError::Transient("platform state lock poisoned".to_string()))
    }
}

fn dataset_entry<'a>(
    state: &'a CatalogState,
    dataset: &DatasetId,
) -> PlatformResult<&'a DatasetEntry> {
    state
        .datasets
        .get(&dataset.to_string())
        .ok_or_else(|| PlatformError::NotFound {
            kind: "dataset",
            id: dataset.to_string(),
        })
}

fn dataset_entry_mut<'a>(
    state: &'a mut CatalogState,
    dataset: &DatasetId,
) -> PlatformResult<&'a mut DatasetEntry> {
    state
        .datasets
        .get_mut(&dataset.to_string())
        .ok_or_else(|| PlatformError::NotFound {
            kind: "dataset",
            id: dataset.to_string(),
        })
}

#[async_trait]
impl Warehouse for InMemoryPlatform {
    async fn ensure_dataset(&self, dataset: &DatasetId) -> PlatformResult<()> {
        let mut state = self.lock()?;
        let key = dataset.to_string();
        if !state.datasets.contains_key(&key) {
            info!("creating dataset {key}");
            state.datasets.insert(key, DatasetEntry::default());
        }
        Ok(())
    }

    async fn table_schema(&self, table: &TableId) -> PlatformResult<TableSchema> {
        let state = self.lock()?;
        let entry = dataset_entry(&state, table.dataset())?;
        entry
            .tables
            .get(table.name())
            .map(|t| t.schema.clone())
            .ok_or_else(|| PlatformError::NotFound {
                kind: "table",
                id: table.to_string(),
            })
    }

    async fn read_rows(&self, table: &TableId) -> PlatformResult<Vec<Row>> {
        let state = self.lock()?;
        let entry = dataset_entry(&state, table.dataset())?;
        entry
            .tables
            .get(table.name())
            .map(|t| t.rows.clone())
            .ok_or_else(|| PlatformError::NotFound {
                kind: "table",
                id: table.to_string(),
            })
    }

    async fn replace_table(
        &self,
        table: &TableId,
        schema: &TableSchema,
        rows: Vec<Row>,
    ) -> PlatformResult<()> {
        let mut state = self.lock()?;
        let entry = dataset_entry_mut(&mut state, table.dataset())?;
        if entry.views.contains_key(table.name()) {
            return Err(PlatformError::DefinitionConflict {
                kind: "table",
                id: table.to_string(),
                detail: "a view with this name already exists".to_string(),
            });
        }
        info!("writing table {table} ({} rows)", rows.len());
        entry.tables.insert(
            table.name().to_string(),
            StoredTable {
                schema: schema.clone(),
                rows,
            },
        );
        Ok(())
    }

    async fn get_view(&self, view: &TableId) -> PlatformResult<Option<ViewDefinition>> {
        let state = self.lock()?;
        let entry = dataset_entry(&state, view.dataset())?;
        Ok(entry.views.get(view.name()).cloned())
    }

    async fn create_view(&self, view: &TableId, definition: &ViewDefinition) -> PlatformResult<()> {
        let mut state = self.lock()?;
        let entry = dataset_entry_mut(&mut state, view.dataset())?;
        if entry.tables.contains_key(view.name()) {
            return Err(PlatformError::DefinitionConflict {
                kind: "view",
                id: view.to_string(),
                detail: "a table with this name already exists".to_string(),
            });
        }
        if let Some(existing) = entry.views.get(view.name()) {
            if existing == definition {
                debug!("view {view} already current");
                return Ok(());
            }
            return Err(PlatformError::DefinitionConflict {
                kind: "view",
                id: view.to_string(),
                detail: "existing view has a different definition".to_string(),
            });
        }
        info!("creating view {view}");
        entry
            .views
            .insert(view.name().to_string(), definition.clone());
        Ok(())
    }
}

#[async_trait]
impl ExchangeCatalog for InMemoryPlatform {
    async fn get_data_exchange(&self, name: &ExchangeName) -> PlatformResult<Option<ExchangeInfo>> {
        let state = self.lock()?;
        Ok(state.exchanges.get(&name.to_string()).map(|e| ExchangeInfo {
            name: name.clone(),
            spec: e.spec.clone(),
        }))
    }

    async fn create_data_exchange(
        &self,
        name: &ExchangeName,
        spec: &ExchangeSpec,
    ) -> PlatformResult<ExchangeInfo> {
        let mut state = self.lock()?;
        let key = name.to_string();
        if state.exchanges.contains_key(&key) {
            return Err(PlatformError::AlreadyExists {
                kind: "data exchange",
                id: key,
            });
        }
        info!("creating data exchange {key}");
        state.exchanges.insert(
            key,
            ExchangeEntry {
                spec: spec.clone(),
                listings: BTreeMap::new(),
            },
        );
        Ok(ExchangeInfo {
            name: name.clone(),
            spec: spec.clone(),
        })
    }

    async fn get_listing(&self, name: &ListingName) -> PlatformResult<Option<ListingInfo>> {
        let state = self.lock()?;
        let listing = state
            .exchanges
            .get(&name.exchange().to_string())
            .and_then(|e| e.listings.get(name.id()));
        Ok(listing.map(|l| ListingInfo {
            name: name.clone(),
            spec: l.spec.clone(),
        }))
    }

    async fn create_listing(
        &self,
        name: &ListingName,
        spec: &ListingSpec,
    ) -> PlatformResult<ListingInfo> {
        let mut state = self.lock()?;
        let exchange = state
            .exchanges
            .get_mut(&name.exchange().to_string())
            .ok_or_else(|| PlatformError::NotFound {
                kind: "data exchange",
                id: name.exchange().to_string(),
            })?;
        if exchange.listings.contains_key(name.id()) {
            return Err(PlatformError::AlreadyExists {
                kind: "listing",
                id: name.to_string(),
            });
        }
        info!("creating listing {name}");
        exchange.listings.insert(
            name.id().to_string(),
            ListingEntry {
                spec: spec.clone(),
                subscribers: BTreeSet::new(),
            },
        );
        Ok(ListingInfo {
            name: name.clone(),
            spec: spec.clone(),
        })
    }

    async fn list_grants(&self, listing: &ListingName) -> PlatformResult<Vec<Principal>> {
        let state = self.lock()?;
        let entry = state
            .exchanges
            .get(&listing.exchange().to_string())
            .and_then(|e| e.listings.get(listing.id()))
            .ok_or_else(|| PlatformError::NotFound {
                kind: "listing",
                id: listing.to_string(),
            })?;
        Ok(entry.subscribers.iter().cloned().collect())
    }

    async fn grant_subscriber(
        &self,
        listing: &ListingName,
        principal: &Principal,
    ) -> PlatformResult<()> {
        let mut state = self.lock()?;
        let entry = state
            .exchanges
            .get_mut(&listing.exchange().to_string())
            .and_then(|e| e.listings.get_mut(listing.id()))
            .ok_or_else(|| PlatformError::NotFound {
                kind: "listing",
                id: listing.to_string(),
            })?;
        if entry.subscribers.insert(principal.clone()) {
            info!("granted subscriber {principal} on {listing}");
        } else {
            debug!("subscriber {principal} already granted on {listing}");
        }
        Ok(())
    }
}

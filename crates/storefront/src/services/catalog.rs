//! Catalog service.
//!
//! Owns the shared [`Catalog`] and sequences Catalog Source calls with the
//! in-memory transitions: a write reaches the Catalog Source first and the
//! local transition is applied only once the response is back, under the
//! write lock. Two racing edits therefore land in response order.
//!
//! At most one catalog fetch runs at a time; a reload requested while a
//! fetch is in flight is ignored.

use showroom_core::catalog::validate_patch;
use showroom_core::{Catalog, CatalogAction, CatalogError, ProductDraft, ProductId, ProductPatch, ProductRecord};
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, instrument, warn};

use crate::config::{CatalogSourceConfig, CatalogSources, WriteMode};
use crate::source::conversions::{convert_product, convert_products, new_product_body, patch_body};
use crate::source::{CatalogClient, SourceError};

/// Errors from catalog writes.
#[derive(Debug, Error)]
pub enum CatalogServiceError {
    /// The Catalog Source rejected the write.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// The input failed validation; nothing was sent.
    #[error(transparent)]
    Invalid(#[from] CatalogError),
}

/// Where the catalog is in its load cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Loading,
    Ready,
    /// The last fetch failed; the message is shown next to a retry button.
    Failed(String),
}

/// Result of a [`CatalogService::load`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    Failed,
    /// Another fetch was already running.
    AlreadyRunning,
}

/// A consistent view of the catalog and its load status.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    pub catalog: Catalog,
    pub status: LoadStatus,
}

/// Shared catalog plus the Catalog Source it is reconciled with.
pub struct CatalogService {
    client: Option<CatalogClient>,
    sources: CatalogSources,
    writes: WriteMode,
    static_products: Vec<ProductRecord>,
    state: RwLock<CatalogSnapshot>,
    fetch_guard: Mutex<()>,
}

impl CatalogService {
    /// Create the service.
    ///
    /// In static-only mode the catalog is ready immediately and no HTTP
    /// client is built.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        config: &CatalogSourceConfig,
        static_products: Vec<ProductRecord>,
    ) -> Result<Self, SourceError> {
        let client = if config.sources.uses_remote() {
            Some(CatalogClient::new(config)?)
        } else {
            None
        };

        let initial = if client.is_some() {
            CatalogSnapshot {
                catalog: Catalog::default(),
                status: LoadStatus::Loading,
            }
        } else {
            CatalogSnapshot {
                catalog: Catalog::new(static_products.clone()),
                status: LoadStatus::Ready,
            }
        };

        Ok(Self {
            client,
            sources: config.sources,
            writes: config.writes,
            static_products,
            state: RwLock::new(initial),
            fetch_guard: Mutex::new(()),
        })
    }

    /// Current catalog and load status.
    pub async fn snapshot(&self) -> CatalogSnapshot {
        self.state.read().await.clone()
    }

    /// Current load status.
    pub async fn status(&self) -> LoadStatus {
        self.state.read().await.status.clone()
    }

    /// Fetch the catalog and replace the one on display.
    ///
    /// On failure the previous products stay in place and the status
    /// becomes [`LoadStatus::Failed`].
    #[instrument(skip(self), fields(sources = %self.sources))]
    pub async fn load(&self) -> LoadOutcome {
        let Ok(_guard) = self.fetch_guard.try_lock() else {
            debug!("Catalog fetch already in flight, ignoring");
            return LoadOutcome::AlreadyRunning;
        };

        let Some(client) = &self.client else {
            let mut state = self.state.write().await;
            state.catalog = Catalog::new(self.static_products.clone());
            state.status = LoadStatus::Ready;
            return LoadOutcome::Loaded;
        };

        self.state.write().await.status = LoadStatus::Loading;

        match client.list_products().await {
            Ok(remote) => {
                let local = if self.sources.uses_static() {
                    self.static_products.clone()
                } else {
                    Vec::new()
                };
                let catalog = Catalog::merged(convert_products(remote), local);
                info!(products = catalog.len(), "Catalog loaded");

                let mut state = self.state.write().await;
                state.catalog = catalog;
                state.status = LoadStatus::Ready;
                LoadOutcome::Loaded
            }
            Err(e) => {
                error!(error = %e, "Failed to load catalog");
                self.state.write().await.status = LoadStatus::Failed(e.to_string());
                LoadOutcome::Failed
            }
        }
    }

    /// Whether a write to `id` goes to the Catalog Source first.
    fn passthrough_client(&self, id: Option<ProductId>) -> Option<&CatalogClient> {
        let remote_id = id.is_none_or(|id| id.is_remote());
        (self.writes == WriteMode::Passthrough && remote_id)
            .then_some(self.client.as_ref())
            .flatten()
    }

    /// Create a product and return the ID it was stored under.
    ///
    /// With passthrough writes the Catalog Source assigns the ID; otherwise
    /// the next free `local-N` is used. A taken ID is re-keyed.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogServiceError::Source`] if the Catalog Source rejects
    /// the create; the catalog is unchanged.
    #[instrument(skip(self, draft), fields(title = %draft.title))]
    pub async fn create(&self, draft: ProductDraft) -> Result<ProductId, CatalogServiceError> {
        let created = match self.passthrough_client(None) {
            Some(client) => {
                let response = client.create_product(&new_product_body(&draft)).await?;
                Some(convert_product(response)?)
            }
            None => None,
        };

        let mut state = self.state.write().await;
        let record = match created {
            Some(record) => record,
            None => draft.into_record(state.catalog.next_local_id()),
        };
        let requested = record.id;
        let (catalog, id) = std::mem::take(&mut state.catalog).create(record);
        state.catalog = catalog;

        if id == requested {
            info!(product_id = %id, "Product created");
        } else {
            warn!(requested = %requested, assigned = %id, "Product ID already in use, re-keyed");
        }
        Ok(id)
    }

    /// Replace the flagged fields of a product.
    ///
    /// Unknown IDs are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogServiceError::Invalid`] for an empty patch or blank
    /// title, and [`CatalogServiceError::Source`] if the Catalog Source
    /// rejects the update. The catalog is unchanged in both cases.
    #[instrument(skip(self, patch), fields(product_id = %id))]
    pub async fn update(&self, id: ProductId, patch: ProductPatch) -> Result<(), CatalogServiceError> {
        validate_patch(&patch)?;

        if !self.state.read().await.catalog.contains(id) {
            debug!("Update of unknown product ignored");
            return Ok(());
        }

        if let Some(client) = self.passthrough_client(Some(id)) {
            client.update_product(id.number(), &patch_body(&patch)).await?;
        }

        let fields = patch.field_names();
        self.dispatch(CatalogAction::Update { id, patch }).await?;
        info!(?fields, "Product updated");
        Ok(())
    }

    /// Delete a product. Returns `false` for unknown IDs.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogServiceError::Source`] if the Catalog Source rejects
    /// the delete; the catalog is unchanged.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete(&self, id: ProductId) -> Result<bool, CatalogServiceError> {
        if !self.state.read().await.catalog.contains(id) {
            debug!("Delete of unknown product ignored");
            return Ok(false);
        }

        if let Some(client) = self.passthrough_client(Some(id)) {
            client.delete_product(id.number()).await?;
        }

        self.dispatch(CatalogAction::Delete(id)).await?;
        info!("Product deleted");
        Ok(true)
    }

    async fn dispatch(&self, action: CatalogAction) -> Result<(), CatalogError> {
        let mut state = self.state.write().await;
        state.catalog = state.catalog.clone().apply(action)?;
        Ok(())
    }
}

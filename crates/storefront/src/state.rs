//! Application state shared across handlers.

use std::sync::Arc;

use showroom_core::ProductRecord;

use crate::config::StorefrontConfig;
use crate::middleware::SessionLocks;
use crate::services::catalog::CatalogService;
use crate::source::SourceError;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the catalog service and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: CatalogService,
    session_locks: SessionLocks,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `static_products` - The static catalog, already loaded
    ///
    /// # Errors
    ///
    /// Returns an error if the Catalog Source client cannot be built.
    pub fn new(
        config: StorefrontConfig,
        static_products: Vec<ProductRecord>,
    ) -> Result<Self, SourceError> {
        let catalog = CatalogService::new(&config.catalog, static_products)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                session_locks: SessionLocks::default(),
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the catalog service.
    #[must_use]
    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }

    /// Get the per-session request locks.
    #[must_use]
    pub fn session_locks(&self) -> &SessionLocks {
        &self.inner.session_locks
    }

    /// Start the initial catalog fetch in the background.
    ///
    /// The server starts answering immediately; pages show a loading
    /// notice until the fetch completes.
    pub fn start_catalog_load(&self) {
        let state = self.clone();
        tokio::spawn(async move {
            let outcome = state.catalog().load().await;
            tracing::info!(?outcome, "Initial catalog load finished");
        });
    }
}

//! Catalog inspection commands.
//!
//! # Usage
//!
//! ```bash
//! showroom-cli catalog list --search turbo
//! showroom-cli catalog list --sources remote --min-price 50 --json
//! showroom-cli catalog categories
//! ```
//!
//! # Environment Variables
//!
//! - `SHOWROOM_CATALOG_URL` - Catalog Source base URL
//! - `SHOWROOM_CATALOG_SOURCES` - `merged`, `remote` or `static`
//! - `SHOWROOM_CATALOG_TIMEOUT_SECS` - Optional request timeout
//! - `SHOWROOM_STATIC_CATALOG` - Static catalog file (bundled copy if unset)

use std::io::Write;

use showroom_core::{ProductFilter, ProductRecord, RawFilter};
use showroom_storefront::config::{CatalogSourceConfig, CatalogSources, ConfigError};
use showroom_storefront::filters::truncate_chars;
use showroom_storefront::services::catalog::{CatalogService, CatalogSnapshot, LoadStatus};
use showroom_storefront::source::SourceError;
use showroom_storefront::static_catalog::{self, StaticCatalogError};
use thiserror::Error;
use tracing::info;

/// Titles longer than this are cut in table output.
const TITLE_WIDTH: usize = 40;

/// Catalog command errors.
#[derive(Debug, Error)]
pub enum CatalogCommandError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("static catalog error: {0}")]
    StaticCatalog(#[from] StaticCatalogError),

    #[error("catalog source error: {0}")]
    Source(#[from] SourceError),

    #[error("catalog failed to load: {0}")]
    LoadFailed(String),

    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Options for `catalog list`.
#[derive(Debug, Default)]
pub struct ListOptions {
    pub sources: Option<CatalogSources>,
    pub search: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub category: Option<String>,
    pub year: Option<String>,
    pub json: bool,
}

impl ListOptions {
    fn raw_filter(&self) -> RawFilter {
        RawFilter {
            q: self.search.clone(),
            min_price: self.min_price.clone(),
            max_price: self.max_price.clone(),
            category: self.category.clone(),
            year: self.year.clone(),
        }
    }
}

/// Load the catalog and print the products matching the filters.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the static catalog cannot
/// be read, or the catalog fails to load.
pub async fn list(options: ListOptions) -> Result<(), CatalogCommandError> {
    let snapshot = load_snapshot(options.sources).await?;
    let predicates = ProductFilter::from(&options.raw_filter());
    let products = snapshot.catalog.filter(&predicates);

    info!(
        matched = products.len(),
        total = snapshot.catalog.len(),
        "Catalog filtered"
    );

    let output = if options.json {
        let mut json = serde_json::to_string_pretty(&products)?;
        json.push('\n');
        json
    } else {
        render_table(&products)
    };

    std::io::stdout().lock().write_all(output.as_bytes())?;
    Ok(())
}

/// Print the distinct categories in the catalog, one per line.
///
/// # Errors
///
/// Same as [`list`].
pub async fn categories(sources: Option<CatalogSources>) -> Result<(), CatalogCommandError> {
    let snapshot = load_snapshot(sources).await?;

    let mut stdout = std::io::stdout().lock();
    for category in snapshot.catalog.categories() {
        writeln!(stdout, "{category}")?;
    }
    Ok(())
}

/// Load the catalog the way the storefront does, and wait for the result.
async fn load_snapshot(
    sources: Option<CatalogSources>,
) -> Result<CatalogSnapshot, CatalogCommandError> {
    let mut config = CatalogSourceConfig::from_env()?;
    if let Some(sources) = sources {
        config.sources = sources;
    }

    let static_products = static_catalog::load(config.static_catalog_path.as_deref()).await?;
    let service = CatalogService::new(&config, static_products)?;
    service.load().await;

    let snapshot = service.snapshot().await;
    match &snapshot.status {
        LoadStatus::Failed(message) => Err(CatalogCommandError::LoadFailed(message.clone())),
        LoadStatus::Loading | LoadStatus::Ready => Ok(snapshot),
    }
}

/// Format products as a fixed-width table.
fn render_table(products: &[&ProductRecord]) -> String {
    let mut table = format!(
        "{:<10} {:<width$} {:>12} {:<16} {:>4}\n",
        "ID",
        "TITLE",
        "PRICE",
        "CATEGORY",
        "YEAR",
        width = TITLE_WIDTH + 3,
    );

    for product in products {
        table.push_str(&format!(
            "{:<10} {:<width$} {:>12} {:<16} {:>4}\n",
            product.id.to_string(),
            truncate_chars(&product.title, TITLE_WIDTH),
            product.price.display(),
            product.category.as_deref().unwrap_or("-"),
            product.year.map_or_else(|| "-".to_string(), |year| year.to_string()),
            width = TITLE_WIDTH + 3,
        ));
    }

    table.push_str(&format!("{} products\n", products.len()));
    table
}

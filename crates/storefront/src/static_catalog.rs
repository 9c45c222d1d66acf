//! Bundled static catalog.
//!
//! The static catalog is a JSON array of `{name, year, category, price,
//! image|img, description}` objects. It is compiled into the binary and can
//! be replaced at startup with `SHOWROOM_STATIC_CATALOG`. Records are
//! numbered `local-1..n` in file order.

use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use showroom_core::{Price, ProductId, ProductRecord};
use thiserror::Error;

const BUNDLED: &str = include_str!("../catalog/static_products.json");

/// Errors loading the static catalog.
#[derive(Debug, Error)]
pub enum StaticCatalogError {
    #[error("Failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error("Static catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Static product #{position} is invalid: {reason}")]
    InvalidRecord { position: usize, reason: String },
}

/// A product as written in the static catalog file.
#[derive(Debug, Clone, Deserialize)]
pub struct StaticProduct {
    #[serde(alias = "title")]
    pub name: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub category: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "img")]
    pub image: String,
}

/// The catalog compiled into the binary.
///
/// # Errors
///
/// Only fails if the bundled file itself is broken.
pub fn bundled() -> Result<Vec<ProductRecord>, StaticCatalogError> {
    parse(BUNDLED)
}

/// Load the bundled catalog, or the file at `path` when given.
///
/// # Errors
///
/// Returns an error if the file cannot be read or contains an invalid record.
pub async fn load(path: Option<&Path>) -> Result<Vec<ProductRecord>, StaticCatalogError> {
    let Some(path) = path else {
        return bundled();
    };

    let json = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| StaticCatalogError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
    let products = parse(&json)?;
    tracing::info!(path = %path.display(), count = products.len(), "Loaded static catalog");
    Ok(products)
}

/// Parse a static catalog document.
///
/// # Errors
///
/// Returns an error for malformed JSON or a negative price.
pub fn parse(json: &str) -> Result<Vec<ProductRecord>, StaticCatalogError> {
    let products: Vec<StaticProduct> = serde_json::from_str(json)?;

    products
        .into_iter()
        .zip(1_i32..)
        .map(|(product, number)| convert(product, number))
        .collect()
}

fn convert(product: StaticProduct, number: i32) -> Result<ProductRecord, StaticCatalogError> {
    let price = Price::new(product.price).map_err(|e| StaticCatalogError::InvalidRecord {
        position: usize::try_from(number).unwrap_or_default(),
        reason: e.to_string(),
    })?;

    let mut record = ProductRecord::new(
        ProductId::local(number),
        product.name,
        price,
        product.description,
        product.image,
    );
    if let Some(category) = product.category.filter(|c| !c.is_empty()) {
        record = record.with_category(category);
    }
    if let Some(year) = product.year {
        record = record.with_year(year);
    }
    Ok(record)
}

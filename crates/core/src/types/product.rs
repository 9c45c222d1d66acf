//! Canonical product record.
//!
//! Every catalog shape (remote `title`/`image`, static `name`/`img`) is
//! converted into a [`ProductRecord`] at the boundary, so the cart and filter
//! engines only ever see this one type.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// A product as shown in the grid and snapshotted into cart lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    pub description: String,
    pub image_url: String,
    /// Only some sources categorize products.
    #[serde(default)]
    pub category: Option<String>,
    /// Model year; only the static catalog carries one.
    #[serde(default)]
    pub year: Option<i32>,
}

impl ProductRecord {
    /// Create a record with no category or year.
    #[must_use]
    pub fn new(
        id: ProductId,
        title: impl Into<String>,
        price: Price,
        description: impl Into<String>,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            price,
            description: description.into(),
            image_url: image_url.into(),
            category: None,
            year: None,
        }
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    /// The same record under a different ID.
    #[must_use]
    pub fn rekeyed(mut self, id: ProductId) -> Self {
        self.id = id;
        self
    }
}

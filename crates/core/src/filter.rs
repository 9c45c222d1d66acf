//! Predicate-based product filtering.
//!
//! A [`ProductFilter`] is a set of optional predicates combined with AND. The
//! filtered list is always recomputed from the full catalog and keeps the
//! catalog's order.
//!
//! User input arrives as a [`RawFilter`] of strings (query parameters) and is
//! parsed leniently: empty or non-numeric values simply switch the predicate
//! off.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::ProductRecord;

/// Unparsed filter input, as it comes off a query string or CLI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFilter {
    /// Free-text search.
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub min_price: Option<String>,
    #[serde(default)]
    pub max_price: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
}

/// Active filter predicates. `None` means "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Case-insensitive substring of title or description.
    pub search_text: Option<String>,
    /// Inclusive lower price bound.
    pub min_price: Option<Decimal>,
    /// Inclusive upper price bound.
    pub max_price: Option<Decimal>,
    /// Exact category.
    pub category: Option<String>,
    /// Exact model year.
    pub year: Option<i32>,
}

impl From<&RawFilter> for ProductFilter {
    fn from(raw: &RawFilter) -> Self {
        Self {
            search_text: non_empty(raw.q.as_deref()).map(str::to_string),
            min_price: non_empty(raw.min_price.as_deref()).and_then(parse_decimal),
            max_price: non_empty(raw.max_price.as_deref()).and_then(parse_decimal),
            category: non_empty(raw.category.as_deref()).map(str::to_string),
            year: non_empty(raw.year.as_deref()).and_then(|y| y.trim().parse().ok()),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn parse_decimal(value: &str) -> Option<Decimal> {
    let value = value.trim();
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .ok()
}

impl ProductFilter {
    /// Whether any predicate is switched on.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.search_text.is_some()
            || self.min_price.is_some()
            || self.max_price.is_some()
            || self.category.is_some()
            || self.year.is_some()
    }

    /// Whether `product` satisfies every active predicate.
    #[must_use]
    pub fn matches(&self, product: &ProductRecord) -> bool {
        let price = product.price.amount();

        let search = self.search_text.as_deref().is_none_or(|needle| {
            let needle = needle.to_lowercase();
            product.title.to_lowercase().contains(&needle)
                || product.description.to_lowercase().contains(&needle)
        });
        let min = self.min_price.is_none_or(|min| price >= min);
        let max = self.max_price.is_none_or(|max| price <= max);
        let category = self
            .category
            .as_deref()
            .is_none_or(|wanted| product.category.as_deref() == Some(wanted));
        let year = self.year.is_none_or(|wanted| product.year == Some(wanted));

        search && min && max && category && year
    }

    /// The order-preserving subsequence of `products` that matches.
    #[must_use]
    pub fn apply<'a>(&self, products: &'a [ProductRecord]) -> Vec<&'a ProductRecord> {
        products.iter().filter(|product| self.matches(product)).collect()
    }
}

/// Distinct categories in first-seen order.
#[must_use]
pub fn categories(products: &[ProductRecord]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for category in products.iter().filter_map(|p| p.category.as_deref()) {
        if !category.is_empty() && !seen.contains(&category) {
            seen.push(category);
        }
    }
    seen
}

/// Distinct model years, newest first.
#[must_use]
pub fn years(products: &[ProductRecord]) -> Vec<i32> {
    let mut years: Vec<i32> = products.iter().filter_map(|p| p.year).collect();
    years.sort_unstable_by(|a, b| b.cmp(a));
    years.dedup();
    years
}

//! In-memory catalog store.
//!
//! Holds the merged product list (remote records first, then static ones)
//! and the reconciliation rules for create, update and delete. Like the cart,
//! every mutation consumes the catalog and returns the next value.
//!
//! IDs are unique within a catalog: inserting a record whose ID is already
//! taken re-keys it to the next free `local-N` ID instead of shadowing the
//! existing product.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::filter::{self, ProductFilter};
use crate::types::{CatalogOrigin, Price, PriceError, ProductId, ProductRecord};

/// Validation failures for catalog writes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Update requested with no field selected.
    #[error("select at least one field to update")]
    NoFieldsSelected,

    /// A product needs a title.
    #[error("title cannot be empty")]
    EmptyTitle,

    /// Price input did not parse or was negative.
    #[error("invalid price: {0}")]
    InvalidPrice(#[from] PriceError),
}

/// Field-level replacement values for an update.
///
/// A `Some` field is flagged for replacement; `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl ProductPatch {
    /// Whether no field is flagged.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.price.is_none()
            && self.description.is_none()
            && self.image_url.is_none()
    }

    /// Names of the flagged fields, for logging.
    #[must_use]
    pub fn field_names(&self) -> Vec<&'static str> {
        [
            ("title", self.title.is_some()),
            ("price", self.price.is_some()),
            ("description", self.description.is_some()),
            ("image", self.image_url.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
        .collect()
    }

    fn apply_to(&self, product: &mut ProductRecord) {
        if let Some(title) = &self.title {
            product.title.clone_from(title);
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(description) = &self.description {
            product.description.clone_from(description);
        }
        if let Some(image_url) = &self.image_url {
            product.image_url.clone_from(image_url);
        }
    }
}

/// Validated input for a new product, before it has an ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub title: String,
    pub price: Price,
    pub description: String,
    pub image_url: String,
    #[serde(default)]
    pub category: Option<String>,
}

impl ProductDraft {
    /// Parse raw form input.
    ///
    /// Title is trimmed and must be non-empty; a blank category is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::EmptyTitle`] or [`CatalogError::InvalidPrice`].
    pub fn parse(
        title: &str,
        price: &str,
        description: &str,
        image_url: &str,
        category: &str,
    ) -> Result<Self, CatalogError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(CatalogError::EmptyTitle);
        }
        let category = category.trim();
        Ok(Self {
            title: title.to_string(),
            price: price.parse()?,
            description: description.trim().to_string(),
            image_url: image_url.trim().to_string(),
            category: (!category.is_empty()).then(|| category.to_string()),
        })
    }

    /// Attach an ID.
    #[must_use]
    pub fn into_record(self, id: ProductId) -> ProductRecord {
        let record = ProductRecord::new(id, self.title, self.price, self.description, self.image_url);
        match self.category {
            Some(category) => record.with_category(category),
            None => record,
        }
    }
}

/// A single catalog transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogAction {
    /// Swap in a freshly loaded product list.
    Replace(Vec<ProductRecord>),
    Create(ProductRecord),
    Update { id: ProductId, patch: ProductPatch },
    Delete(ProductId),
}

/// The product list currently on display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    products: Vec<ProductRecord>,
}

impl Catalog {
    /// Build a catalog, re-keying any duplicate IDs.
    #[must_use]
    pub fn new(products: Vec<ProductRecord>) -> Self {
        products
            .into_iter()
            .fold(Self::default(), |catalog, product| catalog.create(product).0)
    }

    /// Remote records followed by static ones, without dropping either.
    ///
    /// Static IDs are claimed first, so a duplicate remote ID is re-keyed
    /// above them and the static catalog keeps the same IDs on every load.
    #[must_use]
    pub fn merged(remote: Vec<ProductRecord>, local: Vec<ProductRecord>) -> Self {
        let remote_count = remote.len();
        let mut catalog = remote
            .into_iter()
            .fold(Self::new(local), |catalog, product| catalog.create(product).0);

        let static_count = catalog.products.len().saturating_sub(remote_count);
        catalog.products.rotate_left(static_count);
        catalog
    }

    /// All products, unfiltered, in display order.
    #[must_use]
    pub fn products(&self) -> &[ProductRecord] {
        &self.products
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&ProductRecord> {
        self.products.iter().find(|product| product.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.get(id).is_some()
    }

    /// The first `local-N` ID above every local ID in use.
    #[must_use]
    pub fn next_local_id(&self) -> ProductId {
        let highest = self
            .products
            .iter()
            .filter(|product| product.id.origin() == CatalogOrigin::Local)
            .map(|product| product.id.number().as_i32())
            .max()
            .unwrap_or(0);
        ProductId::local(highest.saturating_add(1))
    }

    /// Append a product and return the ID it was stored under.
    ///
    /// The ID differs from `product.id` only when that ID was already taken.
    #[must_use]
    pub fn create(mut self, product: ProductRecord) -> (Self, ProductId) {
        let product = if self.contains(product.id) {
            let id = self.next_local_id();
            product.rekeyed(id)
        } else {
            product
        };
        let id = product.id;
        self.products.push(product);
        (self, id)
    }

    /// Replace the flagged fields of one product.
    ///
    /// Unknown IDs leave the catalog unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NoFieldsSelected`] for an empty patch and
    /// [`CatalogError::EmptyTitle`] when the patch blanks the title.
    pub fn update(mut self, id: ProductId, patch: &ProductPatch) -> Result<Self, CatalogError> {
        validate_patch(patch)?;
        if let Some(product) = self.products.iter_mut().find(|product| product.id == id) {
            patch.apply_to(product);
        }
        Ok(self)
    }

    /// Remove a product. Unknown IDs leave the catalog unchanged.
    #[must_use]
    pub fn delete(mut self, id: ProductId) -> Self {
        self.products.retain(|product| product.id != id);
        self
    }

    /// Apply a dispatched action.
    ///
    /// # Errors
    ///
    /// Propagates validation failures from [`Catalog::update`].
    pub fn apply(self, action: CatalogAction) -> Result<Self, CatalogError> {
        match action {
            CatalogAction::Replace(products) => Ok(Self::new(products)),
            CatalogAction::Create(product) => Ok(self.create(product).0),
            CatalogAction::Update { id, patch } => self.update(id, &patch),
            CatalogAction::Delete(id) => Ok(self.delete(id)),
        }
    }

    /// Products matching every active predicate, in catalog order.
    #[must_use]
    pub fn filter(&self, predicates: &ProductFilter) -> Vec<&ProductRecord> {
        predicates.apply(&self.products)
    }

    /// Distinct categories in first-seen order.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        filter::categories(&self.products)
    }

    /// Distinct model years, newest first.
    #[must_use]
    pub fn years(&self) -> Vec<i32> {
        filter::years(&self.products)
    }
}

/// Check a patch before it reaches the Catalog Source or the store.
///
/// # Errors
///
/// Same as [`Catalog::update`].
pub fn validate_patch(patch: &ProductPatch) -> Result<(), CatalogError> {
    if patch.is_empty() {
        return Err(CatalogError::NoFieldsSelected);
    }
    if patch.title.as_deref().is_some_and(|title| title.trim().is_empty()) {
        return Err(CatalogError::EmptyTitle);
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn remote(number: i32, units: u32) -> ProductRecord {
        ProductRecord::new(
            ProductId::remote(number),
            format!("Remote {number}"),
            Price::from_units(units),
            "from the API",
            "https://example.com/r.png",
        )
    }

    fn local(number: i32, units: u32) -> ProductRecord {
        ProductRecord::new(
            ProductId::local(number),
            format!("Local {number}"),
            Price::from_units(units),
            "bundled",
            "/static/img/l.png",
        )
        .with_category("SUV")
        .with_year(2024)
    }

    #[test]
    fn test_merged_keeps_both_sources_in_order() {
        let catalog = Catalog::merged(vec![remote(1, 10), remote(2, 20)], vec![local(1, 30)]);

        let ids: Vec<String> = catalog.products().iter().map(|p| p.id.to_string()).collect();
        assert_eq!(ids, vec!["remote-1", "remote-2", "local-1"]);
    }

    #[test]
    fn test_merged_duplicate_remote_id_leaves_static_ids_alone() {
        let catalog = Catalog::merged(
            vec![remote(1, 10), remote(1, 15), remote(2, 20)],
            vec![local(1, 30), local(2, 40)],
        );

        let ids: Vec<String> = catalog.products().iter().map(|p| p.id.to_string()).collect();
        assert_eq!(ids, vec!["remote-1", "local-3", "remote-2", "local-1", "local-2"]);
        assert_eq!(catalog.get(ProductId::local(1)).unwrap().title, "Local 1");
        assert_eq!(catalog.get(ProductId::local(3)).unwrap().price, Price::from_units(15));
    }

    #[test]
    fn test_create_appends() {
        let (catalog, id) = Catalog::new(vec![remote(1, 10)]).create(remote(2, 5));

        assert_eq!(id, ProductId::remote(2));
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.products()[1].id, id);
    }

    #[test]
    fn test_create_rekeys_duplicate_id() {
        let catalog = Catalog::new(vec![remote(21, 10), local(1, 3), local(4, 3)]);
        let (catalog, id) = catalog.create(remote(21, 99));

        assert_eq!(id, ProductId::local(5));
        assert_eq!(catalog.get(ProductId::remote(21)).unwrap().price.display(), "10.00");
        assert_eq!(catalog.get(id).unwrap().price.display(), "99.00");
    }

    #[test]
    fn test_next_local_id_on_empty_catalog() {
        assert_eq!(Catalog::default().next_local_id(), ProductId::local(1));
    }

    #[test]
    fn test_update_replaces_only_flagged_fields() {
        let catalog = Catalog::new(vec![remote(1, 10)]);
        let patch = ProductPatch {
            price: Some(Price::from_units(12)),
            ..ProductPatch::default()
        };

        let catalog = catalog.update(ProductId::remote(1), &patch).unwrap();
        let product = catalog.get(ProductId::remote(1)).unwrap();
        assert_eq!(product.price.display(), "12.00");
        assert_eq!(product.title, "Remote 1");
        assert_eq!(product.description, "from the API");
    }

    #[test]
    fn test_update_with_no_fields_is_rejected() {
        let catalog = Catalog::new(vec![remote(1, 10)]);
        let err = catalog
            .update(ProductId::remote(1), &ProductPatch::default())
            .unwrap_err();
        assert_eq!(err, CatalogError::NoFieldsSelected);
    }

    #[test]
    fn test_update_blank_title_is_rejected() {
        let patch = ProductPatch {
            title: Some("   ".to_string()),
            ..ProductPatch::default()
        };
        assert_eq!(validate_patch(&patch), Err(CatalogError::EmptyTitle));
    }

    #[test]
    fn test_update_unknown_id_is_no_op() {
        let catalog = Catalog::new(vec![remote(1, 10)]);
        let patch = ProductPatch {
            title: Some("New".to_string()),
            ..ProductPatch::default()
        };

        let updated = catalog.clone().update(ProductId::local(1), &patch).unwrap();
        assert_eq!(updated, catalog);
    }

    #[test]
    fn test_delete() {
        let catalog = Catalog::new(vec![remote(1, 10), local(1, 5)]);

        let catalog = catalog.delete(ProductId::local(1));
        assert!(!catalog.contains(ProductId::local(1)));
        assert!(catalog.contains(ProductId::remote(1)));

        let unchanged = catalog.clone().delete(ProductId::local(9));
        assert_eq!(unchanged, catalog);
    }

    #[test]
    fn test_patch_field_names() {
        let patch = ProductPatch {
            title: Some("x".to_string()),
            image_url: Some("y".to_string()),
            ..ProductPatch::default()
        };
        assert_eq!(patch.field_names(), vec!["title", "image"]);
    }

    #[test]
    fn test_apply_replace_then_delete() {
        let catalog = Catalog::default()
            .apply(CatalogAction::Replace(vec![remote(1, 1), remote(2, 2)]))
            .unwrap()
            .apply(CatalogAction::Delete(ProductId::remote(1)))
            .unwrap();

        assert_eq!(catalog.len(), 1);
        assert!(catalog.contains(ProductId::remote(2)));
    }

    #[test]
    fn test_draft_parse() {
        let draft = ProductDraft::parse("  Shirt ", "5", "cotton", "", " ").unwrap();
        assert_eq!(draft.title, "Shirt");
        assert_eq!(draft.price.display(), "5.00");
        assert_eq!(draft.category, None);

        assert_eq!(
            ProductDraft::parse(" ", "5", "", "", ""),
            Err(CatalogError::EmptyTitle)
        );
        assert!(matches!(
            ProductDraft::parse("Shirt", "-5", "", "", ""),
            Err(CatalogError::InvalidPrice(PriceError::Negative(_)))
        ));
        assert!(matches!(
            ProductDraft::parse("Shirt", "", "", "", ""),
            Err(CatalogError::InvalidPrice(PriceError::NotANumber(_)))
        ));
    }

    #[test]
    fn test_draft_into_record_uses_next_local_id() {
        let catalog = Catalog::new(vec![local(1, 1), local(2, 1)]);
        let draft = ProductDraft::parse("Shirt", "5", "", "", "Tops").unwrap();

        let (catalog, id) = catalog.create(draft.into_record(ProductId::local(3)));
        assert_eq!(id, ProductId::local(3));
        assert_eq!(catalog.get(id).unwrap().category.as_deref(), Some("Tops"));
    }

    #[test]
    fn test_facets() {
        let catalog = Catalog::new(vec![
            remote(1, 1),
            local(1, 1),
            local(2, 1).with_category("Roadster").with_year(1995),
            local(3, 1),
        ]);

        assert_eq!(catalog.categories(), vec!["SUV", "Roadster"]);
        assert_eq!(catalog.years(), vec![2024, 1995]);
    }
}

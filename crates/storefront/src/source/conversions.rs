//! Conversions between Catalog Source wire types and domain records.

use showroom_core::{Price, ProductDraft, ProductId, ProductPatch, ProductRecord};
use tracing::warn;

use super::SourceError;
use super::types::{NewRemoteProduct, RemoteProduct, RemoteProductPatch};

/// Convert one remote record, namespacing its ID as `remote-N`.
///
/// # Errors
///
/// Returns [`SourceError::InvalidRecord`] for a negative price.
pub fn convert_product(remote: RemoteProduct) -> Result<ProductRecord, SourceError> {
    let price = Price::new(remote.price).map_err(|e| SourceError::InvalidRecord {
        id: remote.id,
        reason: e.to_string(),
    })?;

    let record = ProductRecord::new(
        ProductId::remote(remote.id),
        remote.title,
        price,
        remote.description,
        remote.image,
    );
    Ok(match remote.category.filter(|c| !c.is_empty()) {
        Some(category) => record.with_category(category),
        None => record,
    })
}

/// Convert a product list, skipping (and logging) invalid records.
#[must_use]
pub fn convert_products(remote: Vec<RemoteProduct>) -> Vec<ProductRecord> {
    remote
        .into_iter()
        .filter_map(|product| match convert_product(product) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(error = %e, "Skipping invalid Catalog Source record");
                None
            }
        })
        .collect()
}

/// Request body for creating `draft` on the Catalog Source.
#[must_use]
pub fn new_product_body(draft: &ProductDraft) -> NewRemoteProduct {
    NewRemoteProduct {
        title: draft.title.clone(),
        price: draft.price.amount(),
        description: draft.description.clone(),
        image: draft.image_url.clone(),
        category: draft.category.clone(),
    }
}

/// Request body carrying only the flagged fields of `patch`.
#[must_use]
pub fn patch_body(patch: &ProductPatch) -> RemoteProductPatch {
    RemoteProductPatch {
        title: patch.title.clone(),
        price: patch.price.map(|price| price.amount()),
        description: patch.description.clone(),
        image: patch.image_url.clone(),
    }
}

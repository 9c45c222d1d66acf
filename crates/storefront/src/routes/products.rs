//! Product route handlers.
//!
//! The grid is rendered both inside the home page and as a standalone HTMX
//! fragment; both take the same filter query parameters. Catalog writes are
//! plain form posts that redirect with a flash notice.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use showroom_core::{
    Cart, CatalogError, Price, ProductDraft, ProductFilter, ProductId, ProductPatch, ProductRecord,
    RawFilter,
};
use tower_sessions::Session;
use tracing::{instrument, warn};
use url::form_urlencoded;

use super::session::{load_cart, push_notice, save_cart, take_notice};
use crate::error::{Result, add_breadcrumb, capitalize};
use crate::filters;
use crate::models::Notice;
use crate::services::catalog::{CatalogServiceError, CatalogSnapshot, LoadStatus};
use crate::state::AppState;

// =============================================================================
// View Models
// =============================================================================

/// Product card display data for templates.
#[derive(Debug, Clone)]
pub struct ProductCardView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: String,
    pub image_url: String,
    pub category: Option<String>,
    pub year: Option<i32>,
    pub origin: &'static str,
    /// Units of this product already in the visitor's cart.
    pub in_cart: u32,
}

impl ProductCardView {
    fn new(product: &ProductRecord, cart: &Cart) -> Self {
        Self {
            id: product.id.to_string(),
            title: product.title.clone(),
            description: product.description.clone(),
            price: product.price.display(),
            image_url: product.image_url.clone(),
            category: product.category.clone(),
            year: product.year,
            origin: product.id.origin().as_str(),
            in_cart: cart.quantity_of(product.id),
        }
    }
}

/// A `<select>` option.
#[derive(Debug, Clone)]
pub struct OptionView {
    pub value: String,
    pub selected: bool,
}

/// Filter form display data: the raw input echoed back plus the choices
/// derived from the catalog.
#[derive(Debug, Clone, Default)]
pub struct FilterFormView {
    pub q: String,
    pub min_price: String,
    pub max_price: String,
    pub categories: Vec<OptionView>,
    pub years: Vec<OptionView>,
    pub active: bool,
}

impl FilterFormView {
    /// Build the form for the current catalog and input.
    #[must_use]
    pub fn new(snapshot: &CatalogSnapshot, raw: &RawFilter) -> Self {
        let category = raw.category.as_deref().unwrap_or_default();
        let year = raw.year.as_deref().unwrap_or_default();

        Self {
            q: raw.q.clone().unwrap_or_default(),
            min_price: raw.min_price.clone().unwrap_or_default(),
            max_price: raw.max_price.clone().unwrap_or_default(),
            categories: snapshot
                .catalog
                .categories()
                .into_iter()
                .map(|value| OptionView {
                    selected: value == category,
                    value: value.to_string(),
                })
                .collect(),
            years: snapshot
                .catalog
                .years()
                .into_iter()
                .map(|value| {
                    let value = value.to_string();
                    OptionView {
                        selected: value == year,
                        value,
                    }
                })
                .collect(),
            active: ProductFilter::from(raw).is_active(),
        }
    }
}

/// Product grid display data.
#[derive(Debug, Clone)]
pub struct GridView {
    pub products: Vec<ProductCardView>,
    /// Size of the unfiltered catalog.
    pub total: usize,
    pub loading: bool,
    pub error: Option<String>,
    /// Encoded filter query, without the leading `?`.
    pub query: String,
    /// Where plain form posts from the grid should land afterwards.
    pub return_to: String,
}

impl GridView {
    /// Filter the catalog and annotate each card with cart quantities.
    #[must_use]
    pub fn new(snapshot: &CatalogSnapshot, cart: &Cart, raw: &RawFilter) -> Self {
        let predicates = ProductFilter::from(raw);
        let query = encode_query(raw);
        let return_to = if query.is_empty() {
            "/".to_string()
        } else {
            format!("/?{query}")
        };

        let (loading, error) = match &snapshot.status {
            LoadStatus::Loading => (true, None),
            LoadStatus::Ready => (false, None),
            LoadStatus::Failed(message) => (false, Some(message.clone())),
        };

        Self {
            products: snapshot
                .catalog
                .filter(&predicates)
                .into_iter()
                .map(|product| ProductCardView::new(product, cart))
                .collect(),
            total: snapshot.catalog.len(),
            loading,
            error,
            query,
            return_to,
        }
    }
}

/// Re-encode the non-empty filter inputs as a query string.
fn encode_query(raw: &RawFilter) -> String {
    let pairs = [
        ("q", &raw.q),
        ("min_price", &raw.min_price),
        ("max_price", &raw.max_price),
        ("category", &raw.category),
        ("year", &raw.year),
    ];

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs {
        if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
            serializer.append_pair(key, value);
        }
    }
    serializer.finish()
}

/// Edit form display data.
#[derive(Debug, Clone)]
pub struct ProductFormView {
    pub id: String,
    pub title: String,
    pub price: String,
    pub description: String,
    pub image_url: String,
}

impl From<&ProductRecord> for ProductFormView {
    fn from(product: &ProductRecord) -> Self {
        Self {
            id: product.id.to_string(),
            title: product.title.clone(),
            price: product.price.display(),
            description: product.description.clone(),
            image_url: product.image_url.clone(),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Product grid fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/product_grid.html")]
pub struct ProductGridTemplate {
    pub grid: GridView,
}

/// Create product page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/new.html")]
pub struct NewProductTemplate {
    pub cart_count: u64,
    pub notice: Option<Notice>,
}

/// Edit product page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/edit.html")]
pub struct EditProductTemplate {
    pub cart_count: u64,
    pub notice: Option<Notice>,
    pub product: ProductFormView,
}

// =============================================================================
// Forms
// =============================================================================

/// Create product form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NewProductForm {
    pub title: String,
    pub price: String,
    pub description: String,
    pub image_url: String,
    pub category: String,
}

/// Edit product form data.
///
/// Each `update_*` checkbox flags its field for replacement; unflagged
/// values are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EditProductForm {
    pub update_title: Option<String>,
    pub title: String,
    pub update_price: Option<String>,
    pub price: String,
    pub update_description: Option<String>,
    pub description: String,
    pub update_image: Option<String>,
    pub image_url: String,
}

impl EditProductForm {
    /// Turn the flagged fields into a patch.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidPrice`] if the price is flagged and does
    /// not parse.
    pub fn into_patch(self) -> std::result::Result<ProductPatch, CatalogError> {
        let price = match self.update_price {
            Some(_) => Some(self.price.parse::<Price>()?),
            None => None,
        };

        Ok(ProductPatch {
            title: self.update_title.map(|_| self.title.trim().to_string()),
            price,
            description: self.update_description.map(|_| self.description.trim().to_string()),
            image_url: self.update_image.map(|_| self.image_url.trim().to_string()),
        })
    }
}

/// Form data for delete.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteProductForm {
    #[serde(default)]
    pub return_to: Option<String>,
}

/// Notice for a failed catalog write.
///
/// Validation messages are shown as-is; Catalog Source failures are logged
/// and replaced with a generic message.
fn write_failure_notice(action: &str, err: &CatalogServiceError) -> Notice {
    match err {
        CatalogServiceError::Invalid(e) => Notice::error(capitalize(&e.to_string())),
        CatalogServiceError::Source(e) => {
            warn!(error = %e, action, "Catalog Source rejected write");
            Notice::error(format!(
                "Could not {action} the product: the catalog service is unavailable. Please try again."
            ))
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Product grid fragment.
#[instrument(skip(state, session))]
pub async fn grid(
    State(state): State<AppState>,
    session: Session,
    Query(raw): Query<RawFilter>,
) -> Result<ProductGridTemplate> {
    let snapshot = state.catalog().snapshot().await;
    let cart = load_cart(&session, &snapshot).await?;

    Ok(ProductGridTemplate {
        grid: GridView::new(&snapshot, &cart, &raw),
    })
}

/// Display the create form.
#[instrument(skip(state, session))]
pub async fn new_form(State(state): State<AppState>, session: Session) -> Result<NewProductTemplate> {
    let snapshot = state.catalog().snapshot().await;
    let cart = load_cart(&session, &snapshot).await?;

    Ok(NewProductTemplate {
        cart_count: cart.totals().total_items,
        notice: take_notice(&session).await?,
    })
}

/// Create a product.
#[instrument(skip(state, session, form))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<NewProductForm>,
) -> Result<Redirect> {
    let draft = match ProductDraft::parse(
        &form.title,
        &form.price,
        &form.description,
        &form.image_url,
        &form.category,
    ) {
        Ok(draft) => draft,
        Err(e) => {
            push_notice(&session, Notice::error(capitalize(&e.to_string()))).await?;
            return Ok(Redirect::to("/products/new"));
        }
    };

    let title = draft.title.clone();
    match state.catalog().create(draft).await {
        Ok(id) => {
            let product_id = id.to_string();
            add_breadcrumb(
                "catalog",
                "Created product",
                Some(&[("product_id", product_id.as_str())][..]),
            );
            push_notice(&session, Notice::info(format!("Created \"{title}\"."))).await?;
            Ok(Redirect::to("/"))
        }
        Err(e) => {
            push_notice(&session, write_failure_notice("create", &e)).await?;
            Ok(Redirect::to("/products/new"))
        }
    }
}

/// Display the edit form. Unknown products redirect home.
#[instrument(skip(state, session))]
pub async fn edit_form(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Response> {
    let snapshot = state.catalog().snapshot().await;
    let Some(product) = id
        .parse::<ProductId>()
        .ok()
        .and_then(|id| snapshot.catalog.get(id))
    else {
        return Ok(Redirect::to("/").into_response());
    };

    let cart = load_cart(&session, &snapshot).await?;
    Ok(EditProductTemplate {
        cart_count: cart.totals().total_items,
        notice: take_notice(&session).await?,
        product: ProductFormView::from(product),
    }
    .into_response())
}

/// Replace the flagged fields of a product.
#[instrument(skip(state, session, form))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<EditProductForm>,
) -> Result<Redirect> {
    let Ok(product_id) = id.parse::<ProductId>() else {
        return Ok(Redirect::to("/"));
    };
    let edit_page = format!("/products/{product_id}/edit");

    let patch = match form.into_patch() {
        Ok(patch) => patch,
        Err(e) => {
            push_notice(&session, Notice::error(capitalize(&e.to_string()))).await?;
            return Ok(Redirect::to(&edit_page));
        }
    };

    match state.catalog().update(product_id, patch).await {
        Ok(()) => {
            push_notice(&session, Notice::info("Product updated.")).await?;
            Ok(Redirect::to("/"))
        }
        Err(e) => {
            push_notice(&session, write_failure_notice("update", &e)).await?;
            Ok(Redirect::to(&edit_page))
        }
    }
}

/// Delete a product and drop it from the visitor's cart.
///
/// Other visitors' carts are reconciled the next time they are read.
#[instrument(skip(state, session, form))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<DeleteProductForm>,
) -> Result<Redirect> {
    let return_to = super::safe_return_to(form.return_to.as_deref());
    let Ok(product_id) = id.parse::<ProductId>() else {
        return Ok(Redirect::to(&return_to));
    };

    let title = state
        .catalog()
        .snapshot()
        .await
        .catalog
        .get(product_id)
        .map(|product| product.title.clone());

    match state.catalog().delete(product_id).await {
        Ok(true) => {
            let snapshot = state.catalog().snapshot().await;
            let cart = load_cart(&session, &snapshot).await?.remove(product_id);
            save_cart(&session, &cart).await?;

            let title = title.unwrap_or_else(|| product_id.to_string());
            push_notice(&session, Notice::info(format!("Deleted \"{title}\"."))).await?;
        }
        Ok(false) => {}
        Err(e) => push_notice(&session, write_failure_notice("delete", &e)).await?,
    }
    Ok(Redirect::to(&return_to))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use showroom_core::Catalog;

    use super::*;

    fn snapshot(status: LoadStatus) -> CatalogSnapshot {
        let products = vec![
            ProductRecord::new(ProductId::remote(1), "Backpack", Price::from_units(110), "Fits laptops", "")
                .with_category("bags"),
            ProductRecord::new(ProductId::local(1), "911 Carrera", Price::from_units(120_000), "Coupe", "")
                .with_category("coupe")
                .with_year(1989),
            ProductRecord::new(ProductId::local(2), "944 Turbo", Price::from_units(45_000), "Coupe", "")
                .with_category("coupe")
                .with_year(1986),
        ];
        CatalogSnapshot {
            catalog: Catalog::new(products),
            status,
        }
    }

    #[test]
    fn test_grid_filters_and_marks_cart_quantities() {
        let snapshot = snapshot(LoadStatus::Ready);
        let cart = Cart::new().add(snapshot.catalog.get(ProductId::local(2)).unwrap());
        let raw = RawFilter {
            category: Some("coupe".to_string()),
            ..RawFilter::default()
        };

        let grid = GridView::new(&snapshot, &cart, &raw);
        assert_eq!(grid.total, 3);
        assert_eq!(grid.products.len(), 2);
        assert_eq!(grid.products[0].id, "local-1");
        assert_eq!(grid.products[0].in_cart, 0);
        assert_eq!(grid.products[1].in_cart, 1);
        assert_eq!(grid.query, "category=coupe");
        assert_eq!(grid.return_to, "/?category=coupe");
        assert!(!grid.loading);
        assert!(grid.error.is_none());
    }

    #[test]
    fn test_grid_reports_load_status() {
        let grid = GridView::new(&snapshot(LoadStatus::Loading), &Cart::new(), &RawFilter::default());
        assert!(grid.loading);
        assert_eq!(grid.return_to, "/");

        let failed = LoadStatus::Failed("connection refused".to_string());
        let grid = GridView::new(&snapshot(failed), &Cart::new(), &RawFilter::default());
        assert_eq!(grid.error.as_deref(), Some("connection refused"));
    }

    #[test]
    fn test_encode_query_skips_empty_values() {
        let raw = RawFilter {
            q: Some("turbo & co".to_string()),
            min_price: Some(String::new()),
            year: Some("1986".to_string()),
            ..RawFilter::default()
        };
        assert_eq!(encode_query(&raw), "q=turbo+%26+co&year=1986");
    }

    #[test]
    fn test_filter_form_marks_selection() {
        let raw = RawFilter {
            category: Some("coupe".to_string()),
            year: Some("1989".to_string()),
            ..RawFilter::default()
        };
        let form = FilterFormView::new(&snapshot(LoadStatus::Ready), &raw);

        assert!(form.active);
        assert_eq!(form.categories.len(), 2);
        assert!(form.categories.iter().any(|o| o.value == "coupe" && o.selected));
        assert!(form.categories.iter().any(|o| o.value == "bags" && !o.selected));
        assert!(form.years.iter().any(|o| o.value == "1989" && o.selected));
        assert!(form.years.iter().any(|o| o.value == "1986" && !o.selected));
    }

    #[test]
    fn test_edit_form_only_flags_checked_fields() {
        let form = EditProductForm {
            update_price: Some("on".to_string()),
            price: "12.50".to_string(),
            title: "ignored".to_string(),
            ..EditProductForm::default()
        };
        let patch = form.into_patch().unwrap();

        assert_eq!(patch.price, Some("12.50".parse().unwrap()));
        assert!(patch.title.is_none());
        assert!(patch.description.is_none());
        assert!(patch.image_url.is_none());
    }

    #[test]
    fn test_edit_form_rejects_bad_price() {
        let form = EditProductForm {
            update_price: Some("on".to_string()),
            price: "cheap".to_string(),
            ..EditProductForm::default()
        };
        assert!(matches!(form.into_patch(), Err(CatalogError::InvalidPrice(_))));
    }

    #[test]
    fn test_edit_form_without_flags_is_empty_patch() {
        let patch = EditProductForm::default().into_patch().unwrap();
        assert!(patch.is_empty());
    }
}

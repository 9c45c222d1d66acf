//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Product grid, filters and cart sidebar
//! GET  /health                 - Liveness check
//! GET  /health/ready           - 200 once the catalog has loaded
//!
//! # Products
//! GET  /products               - Product grid fragment (HTMX, same query params as /)
//! GET  /products/new           - Create form
//! POST /products               - Create product
//! GET  /products/{id}/edit     - Edit form (field checkboxes)
//! POST /products/{id}          - Update flagged fields
//! POST /products/{id}/delete   - Delete product (cascades to the cart)
//!
//! # Catalog
//! POST /catalog/reload         - Retry the catalog fetch
//!
//! # Cart (HTMX fragments)
//! GET  /cart                   - Cart sidebar fragment
//! GET  /cart/count             - Cart count badge fragment
//! POST /cart/add               - Add one unit (triggers cart-updated)
//! POST /cart/increment         - Add one unit to a line
//! POST /cart/decrement         - Take one unit off a line
//! POST /cart/remove            - Remove a line
//! POST /cart/checkout          - Simulated checkout
//! ```

pub mod cart;
pub mod catalog;
pub mod health;
pub mod home;
pub mod products;
mod session;

use axum::{
    Router,
    http::HeaderMap,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::grid).post(products::create))
        .route("/new", get(products::new_form))
        .route("/{id}", post(products::update))
        .route("/{id}/edit", get(products::edit_form))
        .route("/{id}/delete", post(products::delete))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/count", get(cart::count))
        .route("/add", post(cart::add))
        .route("/increment", post(cart::increment))
        .route("/decrement", post(cart::decrement))
        .route("/remove", post(cart::remove))
        .route("/checkout", post(cart::checkout))
}

/// Create the health check router.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health::health))
        .route("/ready", get(health::ready))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Product routes
        .nest("/products", product_routes())
        // Catalog maintenance
        .route("/catalog/reload", post(catalog::reload))
        // Cart routes
        .nest("/cart", cart_routes())
        // Health checks
        .nest("/health", health_routes())
}

/// Whether the request was issued by HTMX.
pub fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get("HX-Request")
        .is_some_and(|value| value.as_bytes().eq_ignore_ascii_case(b"true"))
}

/// Sanitize a client-supplied redirect target.
///
/// Only same-site absolute paths are honoured; anything else (including
/// protocol-relative `//host` URLs) falls back to `/`.
pub fn safe_return_to(return_to: Option<&str>) -> String {
    match return_to {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path.to_string()
        }
        _ => "/".to_string(),
    }
}

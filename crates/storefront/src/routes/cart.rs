//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! HTMX requests get the cart fragment back with an `HX-Trigger:
//! cart-updated` header; plain form posts are redirected back to the page
//! they came from.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::HeaderMap,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use showroom_core::{Cart, CartAction, CartLine, CheckoutReceipt, ProductId};
use tower_sessions::Session;
use tracing::{debug, info, instrument};

use super::session::{load_cart, push_notice, save_cart};
use super::{is_htmx, safe_return_to};
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::models::Notice;
use crate::state::AppState;

/// Cart item display data for templates.
#[derive(Debug, Clone)]
pub struct CartItemView {
    pub id: String,
    pub title: String,
    pub image_url: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
}

/// Cart display data for templates.
#[derive(Debug, Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u64,
}

impl From<&CartLine> for CartItemView {
    fn from(line: &CartLine) -> Self {
        Self {
            id: line.product_id().to_string(),
            title: line.product().title.clone(),
            image_url: line.product().image_url.clone(),
            quantity: line.quantity(),
            price: line.product().price.display(),
            line_price: line.line_total().display(),
        }
    }
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        let totals = cart.totals();
        Self {
            items: cart.lines().iter().map(CartItemView::from).collect(),
            subtotal: totals.cart_total.display(),
            item_count: totals.total_items,
        }
    }
}

/// Checkout confirmation display data.
#[derive(Debug, Clone)]
pub struct ReceiptView {
    pub confirmation: String,
    pub total_items: u64,
    pub total: String,
    pub placed_at: String,
}

impl From<&CheckoutReceipt> for ReceiptView {
    fn from(receipt: &CheckoutReceipt) -> Self {
        Self {
            confirmation: receipt.confirmation.to_string(),
            total_items: receipt.total_items,
            total: receipt.cart_total.display(),
            placed_at: receipt.placed_at.format("%Y-%m-%d %H:%M UTC").to_string(),
        }
    }
}

/// Form data naming one cart line.
#[derive(Debug, Deserialize)]
pub struct CartLineForm {
    pub product_id: String,
    #[serde(default)]
    pub return_to: Option<String>,
}

impl CartLineForm {
    fn id(&self) -> Option<ProductId> {
        self.product_id.parse().ok()
    }
}

/// Form data for checkout.
#[derive(Debug, Default, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub return_to: Option<String>,
}

/// Cart sidebar fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart.html")]
pub struct CartTemplate {
    pub cart: CartView,
    pub receipt: Option<ReceiptView>,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub cart_count: u64,
}

/// Persist the cart and answer in the shape the client asked for.
async fn respond(
    session: &Session,
    headers: &HeaderMap,
    cart: &Cart,
    return_to: Option<&str>,
) -> Result<Response> {
    save_cart(session, cart).await?;

    if is_htmx(headers) {
        Ok((
            AppendHeaders([("HX-Trigger", "cart-updated")]),
            CartTemplate {
                cart: CartView::from(cart),
                receipt: None,
            },
        )
            .into_response())
    } else {
        Ok(Redirect::to(&safe_return_to(return_to)).into_response())
    }
}

/// Apply a cart action naming an existing line.
async fn apply_line_action(
    state: &AppState,
    session: &Session,
    headers: &HeaderMap,
    form: &CartLineForm,
    action: fn(ProductId) -> CartAction,
) -> Result<Response> {
    let snapshot = state.catalog().snapshot().await;
    let cart = load_cart(session, &snapshot).await?;

    let cart = match form.id() {
        Some(id) => cart.apply(action(id)),
        None => cart,
    };

    respond(session, headers, &cart, form.return_to.as_deref()).await
}

/// Cart sidebar fragment.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<CartTemplate> {
    let snapshot = state.catalog().snapshot().await;
    let cart = load_cart(&session, &snapshot).await?;

    Ok(CartTemplate {
        cart: CartView::from(&cart),
        receipt: None,
    })
}

/// Cart count badge fragment.
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: Session) -> Result<CartCountTemplate> {
    let snapshot = state.catalog().snapshot().await;
    let cart = load_cart(&session, &snapshot).await?;

    Ok(CartCountTemplate {
        cart_count: cart.totals().total_items,
    })
}

/// Add one unit of a product.
///
/// The product record is snapshotted from the catalog; unknown IDs are
/// ignored.
#[instrument(skip(state, session, headers))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<CartLineForm>,
) -> Result<Response> {
    let snapshot = state.catalog().snapshot().await;
    let cart = load_cart(&session, &snapshot).await?;

    let product = form.id().and_then(|id| snapshot.catalog.get(id));
    let cart = match product {
        Some(product) => {
            add_breadcrumb(
                "cart",
                "Added product",
                Some(&[("product_id", form.product_id.as_str())][..]),
            );
            cart.apply(CartAction::Add(product.clone()))
        }
        None => {
            debug!(product_id = %form.product_id, "Add of unknown product ignored");
            cart
        }
    };

    respond(&session, &headers, &cart, form.return_to.as_deref()).await
}

/// Add one unit to an existing line.
#[instrument(skip(state, session, headers))]
pub async fn increment(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<CartLineForm>,
) -> Result<Response> {
    apply_line_action(&state, &session, &headers, &form, CartAction::Increment).await
}

/// Take one unit off a line; the line goes away at zero.
#[instrument(skip(state, session, headers))]
pub async fn decrement(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<CartLineForm>,
) -> Result<Response> {
    apply_line_action(&state, &session, &headers, &form, CartAction::Decrement).await
}

/// Drop a line.
#[instrument(skip(state, session, headers))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<CartLineForm>,
) -> Result<Response> {
    apply_line_action(&state, &session, &headers, &form, CartAction::Remove).await
}

/// Simulated checkout: records a receipt and empties the cart.
///
/// Checking out an empty cart does nothing.
#[instrument(skip(state, session, headers))]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let snapshot = state.catalog().snapshot().await;
    let cart = load_cart(&session, &snapshot).await?;

    if cart.is_empty() {
        return respond(&session, &headers, &cart, form.return_to.as_deref()).await;
    }

    let (cart, receipt) = cart.checkout();
    save_cart(&session, &cart).await?;
    info!(
        confirmation = %receipt.confirmation,
        total_items = receipt.total_items,
        cart_total = %receipt.cart_total,
        "Checkout completed"
    );
    let receipt = ReceiptView::from(&receipt);

    if is_htmx(&headers) {
        return Ok((
            AppendHeaders([("HX-Trigger", "cart-updated")]),
            CartTemplate {
                cart: CartView::from(&cart),
                receipt: Some(receipt),
            },
        )
            .into_response());
    }

    push_notice(
        &session,
        Notice::info(format!(
            "Thank you for your purchase! Order {} for ${} is confirmed.",
            receipt.confirmation, receipt.total
        )),
    )
    .await?;
    Ok(Redirect::to(&safe_return_to(form.return_to.as_deref())).into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use showroom_core::{Price, ProductRecord};

    use super::*;

    #[test]
    fn test_cart_view_formats_totals() {
        let product = ProductRecord::new(
            ProductId::remote(1),
            "Backpack",
            "109.95".parse::<Price>().unwrap(),
            "",
            "",
        );
        let cart = Cart::new().add(&product).add(&product);

        let view = CartView::from(&cart);
        assert_eq!(view.item_count, 2);
        assert_eq!(view.subtotal, "219.90");
        assert_eq!(view.items.len(), 1);
        assert!(view.items.iter().all(|item| item.line_price == "219.90" && item.price == "109.95"));
    }

    #[test]
    fn test_empty_cart_view() {
        let view = CartView::from(&Cart::new());
        assert_eq!(view.item_count, 0);
        assert_eq!(view.subtotal, "0.00");
        assert!(view.items.is_empty());
    }
}

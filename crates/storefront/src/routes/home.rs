//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use showroom_core::RawFilter;
use tower_sessions::Session;
use tracing::instrument;

use super::cart::{CartView, ReceiptView};
use super::products::{FilterFormView, GridView};
use super::session::{load_cart, take_notice};
use crate::error::Result;
use crate::filters;
use crate::models::Notice;
use crate::state::AppState;

/// Home page template: filters, product grid and cart sidebar.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct HomeTemplate {
    pub cart_count: u64,
    pub notice: Option<Notice>,
    pub filter: FilterFormView,
    pub grid: GridView,
    pub cart: CartView,
    pub receipt: Option<ReceiptView>,
}

/// Display the home page.
#[instrument(skip(state, session))]
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    Query(raw): Query<RawFilter>,
) -> Result<HomeTemplate> {
    let snapshot = state.catalog().snapshot().await;
    let cart = load_cart(&session, &snapshot).await?;

    Ok(HomeTemplate {
        cart_count: cart.totals().total_items,
        notice: take_notice(&session).await?,
        filter: FilterFormView::new(&snapshot, &raw),
        grid: GridView::new(&snapshot, &cart, &raw),
        cart: CartView::from(&cart),
        receipt: None,
    })
}

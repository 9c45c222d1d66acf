//! Session helpers shared by the handlers.

use showroom_core::Cart;
use tower_sessions::Session;
use tracing::debug;

use crate::error::Result;
use crate::models::{Notice, session_keys};
use crate::services::catalog::{CatalogSnapshot, LoadStatus};

/// Load the visitor's cart, dropping lines whose product left the catalog.
///
/// Reconciliation only runs against a fully loaded catalog, so a reload in
/// progress never empties anyone's cart.
pub async fn load_cart(session: &Session, snapshot: &CatalogSnapshot) -> Result<Cart> {
    let cart = session
        .get::<Cart>(session_keys::CART)
        .await?
        .unwrap_or_default();

    if snapshot.status != LoadStatus::Ready {
        return Ok(cart);
    }

    let reconciled = cart.clone().retain_products(&snapshot.catalog);
    if reconciled != cart {
        debug!("Dropped cart lines for products no longer in the catalog");
        save_cart(session, &reconciled).await?;
    }
    Ok(reconciled)
}

/// Store the visitor's cart.
pub async fn save_cart(session: &Session, cart: &Cart) -> Result<()> {
    session.insert(session_keys::CART, cart).await?;
    Ok(())
}

/// Queue a notice for the next page render.
pub async fn push_notice(session: &Session, notice: Notice) -> Result<()> {
    session.insert(session_keys::NOTICE, notice).await?;
    Ok(())
}

/// Take the pending notice, if any.
pub async fn take_notice(session: &Session) -> Result<Option<Notice>> {
    Ok(session.remove::<Notice>(session_keys::NOTICE).await?)
}

//! Quantity-tracked shopping cart.
//!
//! A [`Cart`] is an insertion-ordered list of [`CartLine`]s with at most one
//! line per product. Every operation consumes the cart and returns the next
//! one; nothing is mutated behind the caller's back.
//!
//! Unknown product IDs are tolerated everywhere: incrementing, decrementing
//! or removing a product that has no line returns the cart unchanged.
//!
//! ```rust
//! use showroom_core::{Cart, Price, ProductId, ProductRecord};
//!
//! let product = ProductRecord::new(ProductId::remote(1), "Mug", Price::from_units(10), "", "");
//! let cart = Cart::new().add(&product).add(&product);
//!
//! let totals = cart.totals();
//! assert_eq!(totals.total_items, 2);
//! assert_eq!(totals.cart_total.display(), "20.00");
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::types::{Price, ProductId, ProductRecord};

/// One product in the cart.
///
/// Holds a snapshot of the product taken when it was first added; later
/// catalog edits do not reach existing lines. The quantity is always at
/// least 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    product: ProductRecord,
    quantity: u32,
}

impl CartLine {
    fn new(product: ProductRecord) -> Self {
        Self {
            product,
            quantity: 1,
        }
    }

    #[must_use]
    pub const fn product_id(&self) -> ProductId {
        self.product.id
    }

    #[must_use]
    pub const fn product(&self) -> &ProductRecord {
        &self.product
    }

    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price.times(self.quantity)
    }
}

/// Aggregates derived from a cart. Never stored, always recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CartTotals {
    /// Sum of line quantities.
    pub total_items: u64,
    /// Sum of line totals.
    pub cart_total: Price,
}

/// Confirmation of a simulated checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutReceipt {
    pub confirmation: Uuid,
    pub total_items: u64,
    pub cart_total: Price,
    pub placed_at: DateTime<Utc>,
}

/// A single cart transition, as dispatched by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartAction {
    Add(ProductRecord),
    Increment(ProductId),
    Decrement(ProductId),
    Remove(ProductId),
    Clear,
}

/// The shopping cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Lines in the order their products were first added.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Quantity of `id` in the cart, or 0 when it has no line.
    #[must_use]
    pub fn quantity_of(&self, id: ProductId) -> u32 {
        self.line(id).map_or(0, CartLine::quantity)
    }

    #[must_use]
    pub fn line(&self, id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product_id() == id)
    }

    fn line_mut(&mut self, id: ProductId) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|line| line.product_id() == id)
    }

    /// Add one unit of `product`.
    ///
    /// Bumps the existing line if there is one, otherwise appends a new line
    /// with quantity 1. The record is accepted as-is.
    #[must_use]
    pub fn add(mut self, product: &ProductRecord) -> Self {
        match self.line_mut(product.id) {
            Some(line) => line.quantity = line.quantity.saturating_add(1),
            None => self.lines.push(CartLine::new(product.clone())),
        }
        self
    }

    /// Add one unit to an existing line. No-op for unknown IDs.
    #[must_use]
    pub fn increment(mut self, id: ProductId) -> Self {
        if let Some(line) = self.line_mut(id) {
            line.quantity = line.quantity.saturating_add(1);
        }
        self
    }

    /// Take one unit off a line, dropping the line when it would reach zero.
    /// No-op for unknown IDs.
    #[must_use]
    pub fn decrement(mut self, id: ProductId) -> Self {
        match self.line_mut(id) {
            Some(line) if line.quantity > 1 => line.quantity -= 1,
            Some(_) => self.lines.retain(|line| line.product_id() != id),
            None => {}
        }
        self
    }

    /// Drop a line regardless of quantity. No-op for unknown IDs.
    #[must_use]
    pub fn remove(mut self, id: ProductId) -> Self {
        self.lines.retain(|line| line.product_id() != id);
        self
    }

    /// Drop every line whose product is no longer in `catalog`.
    #[must_use]
    pub fn retain_products(mut self, catalog: &Catalog) -> Self {
        self.lines.retain(|line| catalog.contains(line.product_id()));
        self
    }

    /// Derived totals. O(n) and side-effect free.
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        CartTotals {
            total_items: self.lines.iter().map(|line| u64::from(line.quantity)).sum(),
            cart_total: self.lines.iter().map(CartLine::line_total).sum(),
        }
    }

    /// Simulated checkout. Always succeeds and leaves the cart empty.
    #[must_use]
    pub fn checkout(self) -> (Self, CheckoutReceipt) {
        let totals = self.totals();
        let receipt = CheckoutReceipt {
            confirmation: Uuid::new_v4(),
            total_items: totals.total_items,
            cart_total: totals.cart_total,
            placed_at: Utc::now(),
        };
        (Self::new(), receipt)
    }

    /// Apply a dispatched action.
    #[must_use]
    pub fn apply(self, action: CartAction) -> Self {
        match action {
            CartAction::Add(product) => self.add(&product),
            CartAction::Increment(id) => self.increment(id),
            CartAction::Decrement(id) => self.decrement(id),
            CartAction::Remove(id) => self.remove(id),
            CartAction::Clear => Self::new(),
        }
    }
}

//! Showroom Core - Cart, filter and catalog engines.
//!
//! This crate provides the domain values shared by every Showroom component:
//! - `storefront` - Public-facing web storefront
//! - `cli` - Command-line tools for inspecting the catalog
//!
//! # Architecture
//!
//! The core crate contains only values and pure transitions - no I/O, no HTTP
//! clients, no clocks except where a receipt needs a timestamp. Every
//! operation takes the current state by value and returns the next state, so
//! callers (the storefront's request handlers) own the event loop.
//!
//! # Modules
//!
//! - [`types`] - Namespaced product IDs, non-negative prices, product records
//! - [`cart`] - Quantity-tracked cart and derived totals
//! - [`filter`] - Predicate-based product filtering
//! - [`catalog`] - In-memory catalog store and its reconciliation rules

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod filter;
pub mod types;

pub use cart::{Cart, CartAction, CartLine, CartTotals, CheckoutReceipt};
pub use catalog::{Catalog, CatalogAction, CatalogError, ProductDraft, ProductPatch};
pub use filter::{ProductFilter, RawFilter};
pub use types::*;

//! Business logic services for storefront.
//!
//! # Services
//!
//! - [`catalog`] - Catalog store, load status and write-through to the
//!   Catalog Source
//!
//! The cart has no service: it lives in the visitor's session and every
//! transition is a pure function from `showroom_core`.

pub mod catalog;

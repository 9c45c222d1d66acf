//! Catalog Source client.
//!
//! # Architecture
//!
//! - Plain JSON over HTTP with `reqwest`; no auth, no pagination
//! - The Catalog Source is the system of record for `remote-*` products
//! - Wire shapes ([`RemoteProduct`]) are converted to
//!   [`showroom_core::ProductRecord`] at this boundary and nowhere else
//!
//! # Contract
//!
//! - `GET /products` - every product
//! - `POST /products` - create, answers with the created record
//! - `PUT /products/{id}` - partial update
//! - `DELETE /products/{id}` - delete
//!
//! # Example
//!
//! ```rust,ignore
//! use showroom_storefront::source::CatalogClient;
//!
//! let client = CatalogClient::new(&config.catalog)?;
//! let products = client.list_products().await?;
//! ```

mod client;
pub mod conversions;
pub mod types;

pub use client::CatalogClient;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when talking to the Catalog Source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The Catalog Source answered with a non-success status.
    #[error("Catalog Source returned {status} for {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A record parsed but breaks a domain rule (e.g. negative price).
    #[error("Invalid product record {id}: {reason}")]
    InvalidRecord { id: i32, reason: String },
}

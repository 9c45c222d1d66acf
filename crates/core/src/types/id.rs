//! Newtype IDs for type-safe product references.
//!
//! Product identifiers are only unique within the catalog they came from: the
//! remote Catalog Source and the bundled static catalog both number their
//! products with small integers. [`ProductId`] therefore pairs a per-source
//! number ([`SourceId`]) with the [`CatalogOrigin`] it belongs to.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `i32` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_i32()`
/// - `From<i32>` and `Into<i32>` implementations
///
/// # Example
///
/// ```rust
/// # use showroom_core::define_id;
/// define_id!(ReviewId);
/// define_id!(VendorId);
///
/// let review_id = ReviewId::new(1);
/// let vendor_id = VendorId::new(1);
///
/// // These are different types, so this won't compile:
/// // let _: ReviewId = vendor_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Create a new ID from an i32 value.
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// Get the underlying i32 value.
            #[must_use]
            pub const fn as_i32(&self) -> i32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Number assigned by the catalog a product came from
define_id!(SourceId);

/// The catalog a product record originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogOrigin {
    /// Served by the remote Catalog Source.
    Remote,
    /// Bundled static catalog, or synthesized in memory.
    Local,
}

impl CatalogOrigin {
    /// Prefix used in the string form of a [`ProductId`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Local => "local",
        }
    }
}

impl fmt::Display for CatalogOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error parsing a [`ProductId`] from its string form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductIdError {
    #[error("product id must look like `remote-3` or `local-3`, got `{0}`")]
    Malformed(String),
    #[error("unknown catalog origin `{0}`")]
    UnknownOrigin(String),
}

/// Globally unique product identifier, namespaced by catalog origin.
///
/// Renders as `remote-3` or `local-3`; that string form is also what gets
/// serialized, so IDs survive round trips through forms, URLs and sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProductId {
    origin: CatalogOrigin,
    number: SourceId,
}

impl ProductId {
    /// Create a product ID.
    #[must_use]
    pub const fn new(origin: CatalogOrigin, number: SourceId) -> Self {
        Self { origin, number }
    }

    /// ID of a product served by the remote Catalog Source.
    #[must_use]
    pub const fn remote(number: i32) -> Self {
        Self::new(CatalogOrigin::Remote, SourceId::new(number))
    }

    /// ID of a bundled or locally synthesized product.
    #[must_use]
    pub const fn local(number: i32) -> Self {
        Self::new(CatalogOrigin::Local, SourceId::new(number))
    }

    #[must_use]
    pub const fn origin(&self) -> CatalogOrigin {
        self.origin
    }

    /// The number the originating catalog knows this product by.
    #[must_use]
    pub const fn number(&self) -> SourceId {
        self.number
    }

    /// Whether the Catalog Source knows this product.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(self.origin, CatalogOrigin::Remote)
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.origin, self.number)
    }
}

impl FromStr for ProductId {
    type Err = ProductIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (origin, number) = s
            .split_once('-')
            .ok_or_else(|| ProductIdError::Malformed(s.to_string()))?;

        let origin = match origin {
            "remote" => CatalogOrigin::Remote,
            "local" => CatalogOrigin::Local,
            other => return Err(ProductIdError::UnknownOrigin(other.to_string())),
        };

        let number = number
            .parse::<i32>()
            .map_err(|_| ProductIdError::Malformed(s.to_string()))?;

        Ok(Self::new(origin, SourceId::new(number)))
    }
}

impl TryFrom<String> for ProductId {
    type Error = ProductIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ProductId> for String {
    fn from(id: ProductId) -> Self {
        id.to_string()
    }
}

//! Catalog Source wire types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A product as the Catalog Source returns it.
///
/// `price` is accepted as a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteProduct {
    pub id: i32,
    pub title: String,
    pub price: Decimal,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub category: Option<String>,
}

/// Request body for `POST /products`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRemoteProduct {
    pub title: String,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub price: Decimal,
    pub description: String,
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Request body for `PUT /products/{id}`; only flagged fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RemoteProductPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "rust_decimal::serde::float_option::serialize"
    )]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_product_accepts_string_price() {
        let json = r#"{"id": 3, "title": "Mens Cotton Jacket", "price": "55.99",
                       "description": "great", "image": "https://i.example/3.png",
                       "category": "men's clothing", "rating": {"rate": 4.7}}"#;
        let product: RemoteProduct = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, 3);
        assert_eq!(product.price.to_string(), "55.99");
        assert_eq!(product.category.as_deref(), Some("men's clothing"));
    }

    #[test]
    fn test_remote_product_optional_fields_default() {
        let product: RemoteProduct =
            serde_json::from_str(r#"{"id": 1, "title": "Bare", "price": 1}"#).unwrap();
        assert_eq!(product.description, "");
        assert_eq!(product.image, "");
        assert!(product.category.is_none());
    }

    #[test]
    fn test_patch_body_sends_only_flagged_fields() {
        let patch = RemoteProductPatch {
            price: Some(Decimal::new(1250, 2)),
            ..RemoteProductPatch::default()
        };
        let body = serde_json::to_value(&patch).unwrap();
        assert_eq!(body, serde_json::json!({ "price": 12.5 }));
    }

    #[test]
    fn test_new_product_body_price_is_a_number() {
        let body = NewRemoteProduct {
            title: "Shirt".to_string(),
            price: Decimal::new(10, 0),
            description: String::new(),
            image: String::new(),
            category: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json["price"].is_number());
        assert!(json.get("category").is_none());
    }
}

//! HTTP client for the Catalog Source.

use std::sync::Arc;

use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use showroom_core::SourceId;
use tracing::{debug, instrument};

use super::SourceError;
use super::types::{NewRemoteProduct, RemoteProduct, RemoteProductPatch};
use crate::config::CatalogSourceConfig;

/// Response bodies are truncated to this many characters in logs.
const LOGGED_BODY_CHARS: usize = 500;

/// Client for the Catalog Source's `/products` resource.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    products_url: String,
}

impl CatalogClient {
    /// Create a new Catalog Source client.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &CatalogSourceConfig) -> Result<Self, SourceError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            inner: Arc::new(CatalogClientInner {
                client: builder.build()?,
                products_url: format!("{}/products", config.base_url.trim_end_matches('/')),
            }),
        })
    }

    fn product_url(&self, id: SourceId) -> String {
        format!("{}/{id}", self.inner.products_url)
    }

    /// Send a request and return the body of a 2xx response.
    async fn send(&self, request: RequestBuilder, url: &str) -> Result<String, SourceError> {
        let response = request.send().await?;
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if status == StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            tracing::error!(
                status = %status,
                url = %url,
                body = %response_text.chars().take(LOGGED_BODY_CHARS).collect::<String>(),
                "Catalog Source returned non-success status"
            );
            return Err(SourceError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response_text)
    }

    /// Send a request and parse the JSON body of a 2xx response.
    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        url: &str,
    ) -> Result<T, SourceError> {
        let response_text = self.send(request, url).await?;

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                url = %url,
                body = %response_text.chars().take(LOGGED_BODY_CHARS).collect::<String>(),
                "Failed to parse Catalog Source response"
            );
            SourceError::Parse(e)
        })
    }

    /// Fetch every product.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-2xx status or a malformed body.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<RemoteProduct>, SourceError> {
        let url = &self.inner.products_url;
        let products: Vec<RemoteProduct> =
            self.send_json(self.inner.client.get(url), url).await?;

        debug!(count = products.len(), "Fetched products");
        Ok(products)
    }

    /// Create a product; returns the record as the Catalog Source stored it.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-2xx status or a malformed body.
    #[instrument(skip(self, product), fields(title = %product.title))]
    pub async fn create_product(
        &self,
        product: &NewRemoteProduct,
    ) -> Result<RemoteProduct, SourceError> {
        let url = &self.inner.products_url;
        let created: RemoteProduct = self
            .send_json(self.inner.client.post(url).json(product), url)
            .await?;

        debug!(id = created.id, "Created product");
        Ok(created)
    }

    /// Send a partial update.
    ///
    /// Only the status is checked; the body is not needed because the
    /// patch is applied locally.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or non-2xx status.
    #[instrument(skip(self, patch), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: SourceId,
        patch: &RemoteProductPatch,
    ) -> Result<(), SourceError> {
        let url = self.product_url(id);
        self.send(self.inner.client.put(&url).json(patch), &url)
            .await?;

        debug!("Updated product");
        Ok(())
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or non-2xx status.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: SourceId) -> Result<(), SourceError> {
        let url = self.product_url(id);
        self.send(self.inner.client.delete(&url), &url).await?;

        debug!("Deleted product");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client_for(server: &MockServer) -> CatalogClient {
        let config = CatalogSourceConfig {
            base_url: server.uri(),
            ..CatalogSourceConfig::default()
        };
        CatalogClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_list_products_parses_array() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "title": "Backpack", "price": 109.95, "description": "Fits 15in laptops",
                 "category": "men's clothing", "image": "https://i.example/1.jpg"},
                {"id": 2, "title": "T-Shirt", "price": "22.3", "description": "Slim fit",
                 "category": "men's clothing", "image": "https://i.example/2.jpg"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let products = client_for(&server).list_products().await.unwrap();

        assert_eq!(products.len(), 2);
        assert_eq!(products[0].title, "Backpack");
        assert_eq!(products[1].price, Decimal::new(223, 1));
    }

    #[tokio::test]
    async fn test_list_products_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let err = client_for(&server).list_products().await.unwrap_err();
        assert!(matches!(err, SourceError::UnexpectedStatus { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_list_products_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).list_products().await.unwrap_err();
        assert!(matches!(err, SourceError::Parse(_)));
    }

    #[tokio::test]
    async fn test_create_product_posts_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/products"))
            .and(body_json(json!({
                "title": "Ring", "price": 9.5, "description": "gold", "image": ""
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": 21, "title": "Ring", "price": 9.5, "description": "gold", "image": ""
            })))
            .expect(1)
            .mount(&server)
            .await;

        let body = NewRemoteProduct {
            title: "Ring".to_string(),
            price: Decimal::new(95, 1),
            description: "gold".to_string(),
            image: String::new(),
            category: None,
        };
        let created = client_for(&server).create_product(&body).await.unwrap();
        assert_eq!(created.id, 21);
    }

    #[tokio::test]
    async fn test_update_product_puts_partial_body() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/products/7"))
            .and(body_json(json!({ "title": "Renamed" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 7, "title": "Renamed" })))
            .expect(1)
            .mount(&server)
            .await;

        let patch = RemoteProductPatch {
            title: Some("Renamed".to_string()),
            ..RemoteProductPatch::default()
        };
        client_for(&server)
            .update_product(SourceId::new(7), &patch)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_product_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/products/99"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .delete_product(SourceId::new(99))
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_trailing_slash_in_base_url() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/products/3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 3 })))
            .expect(1)
            .mount(&server)
            .await;

        let config = CatalogSourceConfig {
            base_url: format!("{}/", server.uri()),
            ..CatalogSourceConfig::default()
        };
        CatalogClient::new(&config)
            .unwrap()
            .delete_product(SourceId::new(3))
            .await
            .unwrap();
    }
}

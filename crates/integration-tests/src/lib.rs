//! Integration tests for Showroom.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p showroom-integration-tests
//! ```
//!
//! Each test starts its own storefront on an ephemeral port, backed by a
//! `wiremock` Catalog Source, and drives it over HTTP with a cookie-keeping
//! `reqwest` client, so the session cart behaves as it would in a browser.
//!
//! # Test Categories
//!
//! - `storefront_flows` - Grid, filters, cart and checkout
//! - `catalog_writes` - Create, update, delete and load failures

use std::net::SocketAddr;

use reqwest::{Client, Response, StatusCode, redirect};
use serde_json::{Value, json};
use showroom_storefront::config::{
    CatalogSourceConfig, CatalogSources, StorefrontConfig, WriteMode,
};
use showroom_storefront::state::AppState;
use showroom_storefront::{app, static_catalog};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Fake-store shaped products served by the mock Catalog Source.
#[must_use]
pub fn remote_products() -> Value {
    json!([
        {
            "id": 1,
            "title": "Fjallraven Backpack",
            "price": 109.95,
            "description": "Your perfect pack for everyday use",
            "category": "men's clothing",
            "image": "https://fakestoreapi.com/img/81fPKd-2AYL._AC_SL1500_.jpg"
        },
        {
            "id": 2,
            "title": "Mens Casual Slim Fit",
            "price": 15.99,
            "description": "The color could be slightly different",
            "category": "men's clothing",
            "image": "https://fakestoreapi.com/img/71YXzeOuslL._AC_UY879_.jpg"
        },
        {
            "id": 3,
            "title": "Solid Gold Petite Micropave",
            "price": 168,
            "description": "Satisfaction guaranteed",
            "category": "jewelery",
            "image": "https://fakestoreapi.com/img/61sbMiUnoGL._AC_UL640_QL65_ML3_.jpg"
        }
    ])
}

/// A running storefront and the mock Catalog Source behind it.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
    pub catalog_source: MockServer,
    pub state: AppState,
}

impl TestContext {
    /// Storefront with the merged catalog and passthrough writes, serving
    /// [`remote_products`].
    pub async fn new() -> Self {
        let catalog_source = MockServer::start().await;
        mount_products(&catalog_source, remote_products()).await;
        Self::start(catalog_source, CatalogSources::Merged, WriteMode::Passthrough).await
    }

    /// Storefront whose Catalog Source answers every list with a 500.
    pub async fn with_failing_source() -> Self {
        let catalog_source = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
            .mount(&catalog_source)
            .await;
        Self::start(catalog_source, CatalogSources::Merged, WriteMode::Passthrough).await
    }

    /// Storefront with the given modes; the Catalog Source mocks must
    /// already be mounted.
    ///
    /// The initial catalog load finishes before this returns.
    pub async fn start(catalog_source: MockServer, sources: CatalogSources, writes: WriteMode) -> Self {
        let config = StorefrontConfig::with_catalog(CatalogSourceConfig {
            base_url: catalog_source.uri(),
            sources,
            writes,
            ..CatalogSourceConfig::default()
        });

        let static_products = static_catalog::bundled().expect("bundled catalog parses");
        let state = AppState::new(config, static_products).expect("Failed to build state");
        state.catalog().load().await;

        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("listener has an address");
        let router = app(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        let client = Client::builder()
            .cookie_store(true)
            .redirect(redirect::Policy::none())
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: format!("http://{addr}"),
            catalog_source,
            state,
        }
    }

    /// Absolute URL for a storefront path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// GET a page and return its status and body.
    pub async fn get(&self, path: &str) -> (StatusCode, String) {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("GET failed");
        let status = response.status();
        (status, response.text().await.expect("body is text"))
    }

    /// POST a form the way a browser without JavaScript would.
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("POST failed")
    }

    /// POST a form the way HTMX would.
    pub async fn post_htmx(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.client
            .post(self.url(path))
            .header("HX-Request", "true")
            .form(form)
            .send()
            .await
            .expect("POST failed")
    }
}

/// Mount a `GET /products` mock answering with `products`.
pub async fn mount_products(server: &MockServer, products: Value) {
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(products))
        .mount(server)
        .await;
}

/// The `Location` header of a redirect.
#[must_use]
pub fn location(response: &Response) -> &str {
    response
        .headers()
        .get("location")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

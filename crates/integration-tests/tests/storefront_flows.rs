//! Integration tests for browsing and the session cart.
//!
//! Run with: cargo test -p showroom-integration-tests

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;
use showroom_integration_tests::{TestContext, location};

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_endpoints() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");

    let (status, _) = ctx.get("/health/ready").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_security_and_request_id_headers() {
    let ctx = TestContext::new().await;

    let response = ctx.client.get(ctx.url("/")).send().await.unwrap();
    let headers = response.headers();

    assert!(headers.contains_key("content-security-policy"));
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert!(headers.contains_key("x-request-id"));
}

// ============================================================================
// Grid and filters
// ============================================================================

#[tokio::test]
async fn test_home_renders_merged_catalog() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx.get("/").await;
    assert_eq!(status, StatusCode::OK);

    // Remote records first, then the static catalog
    let backpack = body.find("Fjallraven Backpack").unwrap();
    let cayenne = body.find("Porsche Cayenne GTS").unwrap();
    assert!(backpack < cayenne);
    assert!(body.contains("Showing 15 of 15 products"));
    assert!(body.contains(r#"id="product-grid""#));
    assert!(body.contains(r#"id="cart""#));
    assert!(body.contains("Your cart is empty."));
}

#[tokio::test]
async fn test_grid_fragment_applies_filters() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx.get("/products?category=jewelery").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Solid Gold Petite Micropave"));
    assert!(!body.contains("Fjallraven Backpack"));
    assert!(body.contains("Showing 1 of 15 products"));
    // Fragment only, no layout
    assert!(!body.contains("<html"));

    let (_, body) = ctx.get("/products?max_price=20").await;
    assert!(body.contains("Mens Casual Slim Fit"));
    assert!(body.contains("Showing 1 of 15 products"));
}

#[tokio::test]
async fn test_grid_ignores_unparseable_filters() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx.get("/products?min_price=abc&year=soon").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Showing 15 of 15 products"));
}

#[tokio::test]
async fn test_filters_combine() {
    let ctx = TestContext::new().await;

    let (_, body) = ctx.get("/products?q=porsche&year=2024&max_price=80000").await;
    assert!(body.contains("Porsche Macan EV"));
    assert!(body.contains("Porsche Macan"));
    assert!(body.contains("Porsche 718 Boxster"));
    assert!(body.contains("Porsche Cayman 718"));
    assert!(!body.contains("Porsche Cayenne GTS"));
    assert!(body.contains("Showing 4 of 15 products"));
}

// ============================================================================
// Cart
// ============================================================================

#[tokio::test]
async fn test_htmx_add_increment_decrement_remove() {
    let ctx = TestContext::new().await;
    let line = [("product_id", "remote-1")];

    let response = ctx.post_htmx("/cart/add", &line).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("hx-trigger").unwrap(), "cart-updated");
    let body = response.text().await.unwrap();
    assert!(body.contains("Fjallraven Backpack"));
    assert!(body.contains("1 item"));
    assert!(body.contains("$109.95"));

    let body = ctx.post_htmx("/cart/add", &line).await.text().await.unwrap();
    assert!(body.contains("2 items"));
    assert!(body.contains("$219.90"));

    let body = ctx.post_htmx("/cart/increment", &line).await.text().await.unwrap();
    assert!(body.contains("3 items"));

    let body = ctx.post_htmx("/cart/decrement", &line).await.text().await.unwrap();
    assert!(body.contains("2 items"));

    let (_, count) = ctx.get("/cart/count").await;
    assert!(count.contains("Cart (2)"));

    let body = ctx.post_htmx("/cart/remove", &line).await.text().await.unwrap();
    assert!(body.contains("Your cart is empty."));
    assert!(body.contains("0 items"));
}

#[tokio::test]
async fn test_decrement_to_zero_removes_line() {
    let ctx = TestContext::new().await;
    let line = [("product_id", "local-2")];

    ctx.post_htmx("/cart/add", &line).await;
    let body = ctx.post_htmx("/cart/decrement", &line).await.text().await.unwrap();

    assert!(body.contains("Your cart is empty."));
    assert!(!body.contains("Porsche Macan EV"));
}

#[tokio::test]
async fn test_plain_post_redirects_back() {
    let ctx = TestContext::new().await;

    let response = ctx
        .post_form(
            "/cart/add",
            &[("product_id", "remote-3"), ("return_to", "/?category=jewelery")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/?category=jewelery");

    let (_, body) = ctx.get("/?category=jewelery").await;
    assert!(body.contains("1 item in cart"));
    assert!(body.contains("Cart (1)"));
}

#[tokio::test]
async fn test_foreign_return_to_is_ignored() {
    let ctx = TestContext::new().await;

    let response = ctx
        .post_form(
            "/cart/add",
            &[("product_id", "remote-1"), ("return_to", "//evil.example/")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_unknown_product_is_ignored() {
    let ctx = TestContext::new().await;

    let response = ctx.post_htmx("/cart/add", &[("product_id", "remote-99")]).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("Your cart is empty."));

    let response = ctx.post_htmx("/cart/add", &[("product_id", "not-an-id")]).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_cart_is_per_session() {
    let ctx = TestContext::new().await;
    ctx.post_htmx("/cart/add", &[("product_id", "remote-1")]).await;

    let other = reqwest::Client::builder().cookie_store(true).build().unwrap();
    let body = other
        .get(ctx.url("/cart/count"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Cart (0)"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_adds_from_one_session_all_count() {
    let ctx = TestContext::new().await;
    // First add establishes the session cookie
    ctx.post_htmx("/cart/add", &[("product_id", "remote-1")]).await;

    let mut adds = tokio::task::JoinSet::new();
    for _ in 0..20 {
        let client = ctx.client.clone();
        let url = ctx.url("/cart/add");
        adds.spawn(async move {
            client
                .post(url)
                .header("HX-Request", "true")
                .form(&[("product_id", "remote-1")])
                .send()
                .await
                .unwrap()
                .status()
        });
    }
    while let Some(status) = adds.join_next().await {
        assert_eq!(status.unwrap(), StatusCode::OK);
    }

    let (_, count) = ctx.get("/cart/count").await;
    assert!(count.contains("Cart (21)"), "unexpected count: {count}");
    assert_eq!(ctx.state.session_locks().active(), 0);
}

#[tokio::test]
async fn test_card_offers_decrement_only_for_products_in_cart() {
    let ctx = TestContext::new().await;

    let (_, grid) = ctx.get("/products").await;
    assert!(!grid.contains(r#"action="/cart/decrement""#));

    ctx.post_htmx("/cart/add", &[("product_id", "remote-2")]).await;
    ctx.post_htmx("/cart/add", &[("product_id", "remote-2")]).await;

    let (_, grid) = ctx.get("/products").await;
    assert_eq!(grid.matches(r#"action="/cart/decrement""#).count(), 1);
    assert!(grid.contains("2 items in cart"));

    let response = ctx
        .post_form("/cart/decrement", &[("product_id", "remote-2"), ("return_to", "/")])
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let (_, grid) = ctx.get("/products").await;
    assert!(grid.contains("1 item in cart"));
}

// ============================================================================
// Checkout
// ============================================================================

#[tokio::test]
async fn test_htmx_checkout_clears_cart() {
    let ctx = TestContext::new().await;
    ctx.post_htmx("/cart/add", &[("product_id", "remote-1")]).await;
    ctx.post_htmx("/cart/add", &[("product_id", "remote-2")]).await;

    let response = ctx.post_htmx("/cart/checkout", &[]).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("hx-trigger").unwrap(), "cart-updated");
    let body = response.text().await.unwrap();
    assert!(body.contains("Thank you for your purchase!"));
    assert!(body.contains("2 items for $125.94"));
    assert!(body.contains("Your cart is empty."));

    let (_, count) = ctx.get("/cart/count").await;
    assert!(count.contains("Cart (0)"));
}

#[tokio::test]
async fn test_plain_checkout_flashes_receipt_once() {
    let ctx = TestContext::new().await;
    ctx.post_htmx("/cart/add", &[("product_id", "remote-3")]).await;

    let response = ctx.post_form("/cart/checkout", &[]).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let (_, body) = ctx.get("/").await;
    assert!(body.contains("Thank you for your purchase!"));
    assert!(body.contains("$168.00"));
    assert!(body.contains("Your cart is empty."));

    let (_, body) = ctx.get("/").await;
    assert!(!body.contains("Thank you for your purchase!"));
}

#[tokio::test]
async fn test_checkout_of_empty_cart_is_noop() {
    let ctx = TestContext::new().await;

    let body = ctx.post_htmx("/cart/checkout", &[]).await.text().await.unwrap();
    assert!(!body.contains("Thank you for your purchase!"));
    assert!(body.contains("Your cart is empty."));
}

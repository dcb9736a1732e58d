//! Integration test harness for Shopfront.
//!
//! Runs the real storefront router against [`FakeShopify`], an in-process
//! GraphQL endpoint that answers the Storefront API operations the
//! storefront sends, and records the cart mutations it receives.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopfront-integration-tests
//! ```
//!
//! No network access or Shopify credentials are needed.

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{Json, Router, extract::State, routing::post};
use secrecy::SecretString;
use serde_json::{Value, json};
use shopfront::config::{
    BrandConfig, CartConfig, CatalogConfig, ShopifyStorefrontConfig, StorefrontConfig,
};
use shopfront::state::AppState;

/// Checkout URL handed out by `cartCreate`.
pub const CREATED_CHECKOUT_URL: &str = "https://checkout.example.com/cart/c/created";

/// Checkout URL handed out by `cartLinesAdd`.
pub const LINES_ADDED_CHECKOUT_URL: &str = "https://checkout.example.com/cart/c/with-lines";

/// Cart id returned by `cartCreate`.
pub const FAKE_CART_ID: &str = "gid://shopify/Cart/fake";

// =============================================================================
// Fake Shopify
// =============================================================================

#[derive(Default)]
struct FakeState {
    products: Mutex<Vec<Value>>,
    collections: Mutex<HashMap<String, Value>>,
    create_calls: AtomicUsize,
    add_calls: Mutex<Vec<Value>>,
    fail_create: AtomicBool,
    fail_add: AtomicBool,
    create_delay: Mutex<Option<Duration>>,
}

/// In-process stand-in for the Shopify Storefront GraphQL endpoint.
#[derive(Clone)]
pub struct FakeShopify {
    endpoint: String,
    state: Arc<FakeState>,
}

impl FakeShopify {
    /// Start the fake on an ephemeral port.
    pub async fn start() -> Self {
        let state = Arc::new(FakeState::default());

        let app = Router::new()
            .route("/graphql.json", post(graphql))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr: SocketAddr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            endpoint: format!("http://{addr}/graphql.json"),
            state,
        }
    }

    /// GraphQL endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Add a product to the catalog.
    pub fn add_product(&self, product: Value) {
        self.state.products.lock().unwrap().push(product);
    }

    /// Add a collection; `products` are full product nodes.
    pub fn add_collection(&self, handle: &str, title: &str, products: Vec<Value>) {
        let collection = json!({
            "id": format!("gid://shopify/Collection/{handle}"),
            "handle": handle,
            "title": title,
            "description": "",
            "image": {
                "url": format!("https://cdn.shopify.com/collections/{handle}.jpg"),
                "altText": null,
                "width": 1600,
                "height": 900
            },
            "products": { "nodes": products }
        });
        self.state
            .collections
            .lock()
            .unwrap()
            .insert(handle.to_string(), collection);
    }

    /// Number of `cartCreate` mutations received.
    #[must_use]
    pub fn create_calls(&self) -> usize {
        self.state.create_calls.load(Ordering::SeqCst)
    }

    /// Variables of every `cartLinesAdd` mutation received.
    #[must_use]
    pub fn add_calls(&self) -> Vec<Value> {
        self.state.add_calls.lock().unwrap().clone()
    }

    /// Make `cartCreate` answer with a GraphQL error.
    pub fn fail_create(&self, fail: bool) {
        self.state.fail_create.store(fail, Ordering::SeqCst);
    }

    /// Make `cartLinesAdd` answer with a user error.
    pub fn fail_add(&self, fail: bool) {
        self.state.fail_add.store(fail, Ordering::SeqCst);
    }

    /// Delay every `cartCreate` answer.
    pub fn delay_create(&self, delay: Duration) {
        *self.state.create_delay.lock().unwrap() = Some(delay);
    }
}

/// A product node as the Storefront API returns it, with one variant per
/// `(variant_id, title)` pair.
#[must_use]
pub fn product_json(handle: &str, title: &str, price: &str, variants: &[(&str, &str)]) -> Value {
    let variant_nodes: Vec<Value> = variants
        .iter()
        .map(|(id, variant_title)| {
            json!({
                "id": id,
                "title": variant_title,
                "availableForSale": true,
                "price": { "amount": price, "currencyCode": "USD" },
                "compareAtPrice": null,
                "selectedOptions": [{ "name": "Size", "value": variant_title }],
                "image": null
            })
        })
        .collect();

    json!({
        "id": format!("gid://shopify/Product/{handle}"),
        "handle": handle,
        "title": title,
        "description": format!("{title} description"),
        "availableForSale": true,
        "priceRange": { "minVariantPrice": { "amount": price, "currencyCode": "USD" } },
        "compareAtPriceRange": { "minVariantPrice": { "amount": "0.0", "currencyCode": "USD" } },
        "featuredImage": null,
        "images": { "nodes": [{
            "url": format!("https://cdn.shopify.com/products/{handle}.jpg"),
            "altText": null,
            "width": 800,
            "height": 800
        }] },
        "variants": { "nodes": variant_nodes }
    })
}

async fn graphql(State(state): State<Arc<FakeState>>, Json(body): Json<Value>) -> Json<Value> {
    let variables = body.get("variables").cloned().unwrap_or(Value::Null);
    let operation = body
        .get("operationName")
        .and_then(Value::as_str)
        .unwrap_or_default();

    let response = match operation {
        "GetProducts" => get_products(&state, &variables),
        "GetProductByHandle" => {
            let handle = variables["handle"].as_str().unwrap_or_default();
            let product = state
                .products
                .lock()
                .unwrap()
                .iter()
                .find(|p| p["handle"] == handle)
                .cloned();
            json!({ "data": { "product": product } })
        }
        "GetCollectionProducts" => {
            let handle = variables["handle"].as_str().unwrap_or_default();
            let collection = state.collections.lock().unwrap().get(handle).cloned();
            json!({ "data": { "collection": collection } })
        }
        "CartCreate" => {
            state.create_calls.fetch_add(1, Ordering::SeqCst);
            let delay = *state.create_delay.lock().unwrap();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            if state.fail_create.load(Ordering::SeqCst) {
                json!({ "errors": [{ "message": "Internal error creating cart" }] })
            } else {
                cart_payload("cartCreate", CREATED_CHECKOUT_URL)
            }
        }
        "CartLinesAdd" => {
            state.add_calls.lock().unwrap().push(variables);
            if state.fail_add.load(Ordering::SeqCst) {
                json!({ "data": { "cartLinesAdd": {
                    "cart": null,
                    "userErrors": [{
                        "field": ["lines", "0", "merchandiseId"],
                        "message": "The merchandise with id does not exist."
                    }]
                } } })
            } else {
                cart_payload("cartLinesAdd", LINES_ADDED_CHECKOUT_URL)
            }
        }
        other => json!({ "errors": [{ "message": format!("unknown operation {other}") }] }),
    };

    Json(response)
}

/// Pages through the catalog with `cursor-{index}` cursors.
fn get_products(state: &FakeState, variables: &Value) -> Value {
    let products = state.products.lock().unwrap();
    let first = variables["first"]
        .as_u64()
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(products.len());
    let start = variables["after"]
        .as_str()
        .and_then(|c| c.strip_prefix("cursor-"))
        .and_then(|n| n.parse::<usize>().ok())
        .unwrap_or(0);

    let page: Vec<Value> = products.iter().skip(start).take(first).cloned().collect();
    let end = start + page.len();

    json!({ "data": { "products": {
        "nodes": page,
        "pageInfo": {
            "hasNextPage": end < products.len(),
            "endCursor": format!("cursor-{end}")
        }
    } } })
}

fn cart_payload(field: &str, checkout_url: &str) -> Value {
    let payload = json!({
        "cart": { "id": FAKE_CART_ID, "checkoutUrl": checkout_url },
        "userErrors": []
    });
    let mut data = serde_json::Map::new();
    data.insert(field.to_string(), payload);
    json!({ "data": data })
}

// =============================================================================
// Test App
// =============================================================================

/// A running storefront wired to a [`FakeShopify`].
pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    pub shopify: FakeShopify,
}

impl TestApp {
    /// Serve the storefront with default configuration.
    pub async fn spawn(shopify: FakeShopify) -> Self {
        Self::spawn_with(shopify, |_| {}).await
    }

    /// Serve the storefront after adjusting its configuration.
    pub async fn spawn_with(
        shopify: FakeShopify,
        configure: impl FnOnce(&mut StorefrontConfig),
    ) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let mut config = test_config(&shopify, addr);
        configure(&mut config);

        let app = shopfront::app(AppState::new(config));
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();

        Self {
            address: format!("http://{addr}"),
            client,
            shopify,
        }
    }

    /// Absolute URL for a storefront path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.address)
    }

    /// `GET` a storefront path.
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client.get(self.url(path)).send().await.unwrap()
    }

    /// `POST` a form to a storefront path.
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .unwrap()
    }

    /// Add a variant through the cart form.
    pub async fn add_to_cart(
        &self,
        handle: &str,
        variant_id: &str,
        quantity: u32,
    ) -> reqwest::Response {
        let quantity = quantity.to_string();
        self.post_form(
            "/cart/add",
            &[
                ("handle", handle),
                ("variant_id", variant_id),
                ("quantity", &quantity),
                ("return_to", "/"),
            ],
        )
        .await
    }

    /// The session cart as JSON.
    pub async fn cart(&self) -> Value {
        self.get("/api/cart").await.json().await.unwrap()
    }

    /// Post the checkout form.
    pub async fn checkout(&self) -> reqwest::Response {
        self.post_form("/checkout", &[("return_to", "/")]).await
    }
}

fn test_config(shopify: &FakeShopify, addr: SocketAddr) -> StorefrontConfig {
    StorefrontConfig {
        host: addr.ip(),
        port: addr.port(),
        base_url: format!("http://{addr}"),
        shopify: ShopifyStorefrontConfig {
            store: "test-store.myshopify.com".to_string(),
            api_version: "2026-01".to_string(),
            storefront_private_token: SecretString::from("shpat_integration_test_token".to_string()),
            endpoint_override: Some(shopify.endpoint().to_string()),
        },
        catalog: CatalogConfig::default(),
        cart: CartConfig::default(),
        brand: BrandConfig::default(),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

//! Shopify Storefront API client implementation.
//!
//! Uses `graphql_client` query bodies with `reqwest` 0.13 for HTTP.
//! Caches catalog reads using `moka` (5-minute TTL).

mod cache;
mod conversions;
pub mod queries;

use std::sync::Arc;
use std::time::Duration;

use graphql_client::{GraphQLQuery, Response};
use moka::future::Cache;
use secrecy::ExposeSecret;
use shopfront_core::{CartId, CartLineInput};
use tracing::{debug, instrument};

use crate::config::ShopifyStorefrontConfig;
use crate::shopify::types::{
    CollectionProducts, CollectionProductsQuery, Product, ProductConnection, RemoteCart,
};
use crate::shopify::{GraphQLError, GraphQLErrorLocation, ShopifyError};

use cache::{CacheKey, CacheValue};
use conversions::{
    convert_cart_payload, convert_collection_products, convert_product,
    convert_product_connection,
};
use queries::{
    CartCreate, CartLinesAdd, GetCollectionProducts, GetProductByHandle, GetProducts,
    cart_create, cart_lines_add, get_collection_products, get_product_by_handle, get_products,
};

/// Longest response excerpt written to logs.
const LOG_BODY_LIMIT: usize = 500;

// =============================================================================
// StorefrontClient
// =============================================================================

/// Client for the Shopify Storefront API.
///
/// Provides typed access to products, collections, and the cart mutations
/// used by the checkout handoff. Catalog reads are cached for 5 minutes.
#[derive(Clone)]
pub struct StorefrontClient {
    inner: Arc<StorefrontClientInner>,
}

struct StorefrontClientInner {
    client: reqwest::Client,
    endpoint: String,
    access_token: String,
    cache: Cache<CacheKey, CacheValue>,
}

impl StorefrontClient {
    /// Create a new Storefront API client.
    #[must_use]
    pub fn new(config: &ShopifyStorefrontConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(StorefrontClientInner {
                client: reqwest::Client::new(),
                endpoint: config.endpoint(),
                access_token: config.storefront_private_token.expose_secret().to_string(),
                cache,
            }),
        }
    }

    /// Execute a GraphQL operation.
    async fn execute<Q: GraphQLQuery>(
        &self,
        variables: Q::Variables,
    ) -> Result<Q::ResponseData, ShopifyError> {
        let request_body = Q::build_query(variables);

        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            // Private access tokens use a different header than public tokens
            .header(
                "Shopify-Storefront-Private-Token",
                &self.inner.access_token,
            )
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ShopifyError::RateLimited(retry_after));
        }

        // Read the body as text first so failures can be logged verbatim
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                operation = request_body.operation_name,
                body = %excerpt(&response_text, LOG_BODY_LIMIT),
                "Shopify API returned non-success status"
            );
            return Err(ShopifyError::message(format!(
                "HTTP {status}: {}",
                excerpt(&response_text, 200)
            )));
        }

        let response: Response<Q::ResponseData> = match serde_json::from_str(&response_text) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    operation = request_body.operation_name,
                    body = %excerpt(&response_text, LOG_BODY_LIMIT),
                    "Failed to parse Shopify GraphQL response"
                );
                return Err(ShopifyError::Parse(e));
            }
        };

        if let Some(errors) = response.errors
            && !errors.is_empty()
        {
            debug!(errors = ?errors, "GraphQL errors in response");
            return Err(ShopifyError::GraphQL(
                errors.into_iter().map(convert_graphql_error).collect(),
            ));
        }

        response.data.ok_or_else(|| {
            tracing::error!(
                operation = request_body.operation_name,
                body = %excerpt(&response_text, LOG_BODY_LIMIT),
                "Shopify GraphQL response has no data and no errors"
            );
            ShopifyError::message("No data in response")
        })
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Get a product by its handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the API request fails.
    #[instrument(skip(self), fields(handle = %handle))]
    pub async fn get_product_by_handle(&self, handle: &str) -> Result<Product, ShopifyError> {
        let cache_key = CacheKey::Product(handle.to_string());

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let variables = get_product_by_handle::Variables {
            handle: handle.to_string(),
        };

        let data = self.execute::<GetProductByHandle>(variables).await?;

        let product = data
            .product
            .and_then(convert_product)
            .ok_or_else(|| ShopifyError::NotFound(format!("Product not found: {handle}")))?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Get a page of products in store order.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_products(
        &self,
        first: i64,
        after: Option<String>,
    ) -> Result<ProductConnection, ShopifyError> {
        let cache_key = CacheKey::Products {
            first,
            after: after.clone(),
        };

        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let data = self
            .execute::<GetProducts>(get_products::Variables { first, after })
            .await?;

        let connection = convert_product_connection(data.products);

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(connection.clone()))
            .await;

        Ok(connection)
    }

    // =========================================================================
    // Collection Methods
    // =========================================================================

    /// Get a collection and the first page of its products.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::NotFound` if no collection has the handle, or an
    /// error if the API request fails.
    #[instrument(skip(self), fields(handle = %query.collection))]
    pub async fn get_collection_products(
        &self,
        query: &CollectionProductsQuery,
    ) -> Result<CollectionProducts, ShopifyError> {
        let cache_key = CacheKey::CollectionProducts {
            handle: query.collection.clone(),
            limit: query.limit,
            sort_key: query.sort_key,
            reverse: query.reverse,
        };

        if let Some(CacheValue::CollectionProducts(collection)) =
            self.inner.cache.get(&cache_key).await
        {
            debug!("Cache hit for collection");
            return Ok(*collection);
        }

        let variables = get_collection_products::Variables {
            handle: query.collection.clone(),
            first: query.limit,
            sort_key: query.sort_key,
            reverse: query.reverse,
        };

        let data = self.execute::<GetCollectionProducts>(variables).await?;

        let collection = data.collection.map(convert_collection_products).ok_or_else(|| {
            ShopifyError::NotFound(format!("Collection not found: {}", query.collection))
        })?;

        self.inner
            .cache
            .insert(
                cache_key,
                CacheValue::CollectionProducts(Box::new(collection.clone())),
            )
            .await;

        Ok(collection)
    }

    // =========================================================================
    // Cart Methods (not cached - mutable state)
    // =========================================================================

    /// Create a new, empty cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart creation fails or user errors are returned.
    #[instrument(skip(self))]
    pub async fn create_cart(&self) -> Result<RemoteCart, ShopifyError> {
        let variables = cart_create::Variables {
            input: cart_create::CartInput::default(),
        };

        let data = self.execute::<CartCreate>(variables).await?;

        let payload = data
            .cart_create
            .ok_or_else(|| ShopifyError::message("Failed to create cart"))?;
        convert_cart_payload(payload.cart, payload.user_errors, "cartCreate")
    }

    /// Add lines to a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart update fails or user errors are returned.
    #[instrument(skip(self, lines), fields(cart_id = %cart_id, lines = lines.len()))]
    pub async fn add_cart_lines(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineInput>,
    ) -> Result<RemoteCart, ShopifyError> {
        let variables = cart_lines_add::Variables {
            cart_id: cart_id.to_string(),
            lines,
        };

        let data = self.execute::<CartLinesAdd>(variables).await?;

        let payload = data
            .cart_lines_add
            .ok_or_else(|| ShopifyError::message("Failed to add to cart"))?;
        convert_cart_payload(payload.cart, payload.user_errors, "cartLinesAdd")
    }
}

fn convert_graphql_error(error: graphql_client::Error) -> GraphQLError {
    GraphQLError {
        message: error.message,
        locations: error.locations.map_or_else(Vec::new, |locs| {
            locs.into_iter()
                .map(|l| GraphQLErrorLocation {
                    line: i64::from(l.line),
                    column: i64::from(l.column),
                })
                .collect()
        }),
        path: error.path.map_or_else(Vec::new, |p| {
            p.into_iter()
                .map(|fragment| match fragment {
                    graphql_client::PathFragment::Key(s) => serde_json::Value::String(s),
                    graphql_client::PathFragment::Index(i) => serde_json::Value::Number(i.into()),
                })
                .collect()
        }),
    }
}

/// First `limit` characters of a response body.
fn excerpt(body: &str, limit: usize) -> String {
    body.chars().take(limit).collect()
}

//! Cache types for Storefront API responses.

use crate::shopify::types::{CollectionProducts, Product, ProductConnection, ProductCollectionSortKey};

/// Cache key for catalog reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Product(String),
    Products {
        first: i64,
        after: Option<String>,
    },
    CollectionProducts {
        handle: String,
        limit: i64,
        sort_key: ProductCollectionSortKey,
        reverse: bool,
    },
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Products(ProductConnection),
    CollectionProducts(Box<CollectionProducts>),
}

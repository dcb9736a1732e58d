//! Domain types for the Shopify Storefront API.
//!
//! These types are what the rest of the storefront sees. They are built from
//! the raw query responses in `storefront::conversions`, where prices are
//! parsed into [`Money`] and malformed variants are discarded.

use serde::{Deserialize, Serialize};
use shopfront_core::{CartId, CollectionId, Money, ProductId, SelectedOption, VariantId};

// =============================================================================
// Image Types
// =============================================================================

/// Product or collection image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Image URL.
    pub url: String,
    /// Alt text for accessibility.
    pub alt_text: Option<String>,
    /// Image width in pixels.
    pub width: Option<i64>,
    /// Image height in pixels.
    pub height: Option<i64>,
}

// =============================================================================
// Product Types
// =============================================================================

/// A product variant (specific combination of options).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductVariant {
    /// Variant ID, used as the cart line identity.
    pub id: VariantId,
    /// Variant title (combination of option values).
    pub title: String,
    /// Whether this variant is available for sale.
    pub available_for_sale: bool,
    /// Current price.
    pub price: Money,
    /// Compare-at price (original price if on sale).
    pub compare_at_price: Option<Money>,
    /// Selected options for this variant.
    pub selected_options: Vec<SelectedOption>,
    /// Variant image.
    pub image: Option<Image>,
}

/// A product in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product ID.
    pub id: ProductId,
    /// URL handle.
    pub handle: String,
    /// Product title.
    pub title: String,
    /// Plain text description.
    pub description: String,
    /// Whether any variant is available.
    pub available_for_sale: bool,
    /// Lowest variant price.
    pub price: Money,
    /// Lowest compare-at price, when the product has one.
    pub compare_at_price: Option<Money>,
    /// Featured image.
    pub featured_image: Option<Image>,
    /// All product images.
    pub images: Vec<Image>,
    /// Product variants with a valid price.
    pub variants: Vec<ProductVariant>,
}

impl Product {
    /// Look up a variant by id.
    #[must_use]
    pub fn variant(&self, id: &VariantId) -> Option<&ProductVariant> {
        self.variants.iter().find(|v| &v.id == id)
    }

    /// The variant a quick "add to cart" would pick.
    #[must_use]
    pub fn first_variant(&self) -> Option<&ProductVariant> {
        self.variants.first()
    }

    /// Variants that can currently be bought.
    pub fn available_variants(&self) -> impl Iterator<Item = &ProductVariant> {
        self.variants.iter().filter(|v| v.available_for_sale)
    }

    /// Image shown on cards and cart lines.
    #[must_use]
    pub fn primary_image(&self) -> Option<&Image> {
        self.images.first().or(self.featured_image.as_ref())
    }
}

// =============================================================================
// Collection Types
// =============================================================================

/// A collection of products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    /// Collection ID.
    pub id: CollectionId,
    /// URL handle.
    pub handle: String,
    /// Collection title.
    pub title: String,
    /// Plain text description.
    pub description: String,
    /// Collection image (hero banner).
    pub image: Option<Image>,
}

/// A collection together with one page of its products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionProducts {
    pub collection: Collection,
    pub products: Vec<Product>,
}

/// Parameters for [`crate::shopify::StorefrontClient::get_collection_products`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionProductsQuery {
    /// Collection handle.
    pub collection: String,
    /// Maximum number of products returned.
    pub limit: i64,
    pub sort_key: ProductCollectionSortKey,
    pub reverse: bool,
}

impl CollectionProductsQuery {
    /// Default collection order, not reversed.
    #[must_use]
    pub fn new(collection: impl Into<String>, limit: i64) -> Self {
        Self {
            collection: collection.into(),
            limit,
            sort_key: ProductCollectionSortKey::CollectionDefault,
            reverse: false,
        }
    }
}

// =============================================================================
// Pagination Types
// =============================================================================

/// Pagination information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// Whether there are more items after this page.
    pub has_next_page: bool,
    /// Cursor for the last item.
    pub end_cursor: Option<String>,
}

impl PageInfo {
    /// Cursor for the next page, if there is one.
    #[must_use]
    pub fn next_cursor(&self) -> Option<&str> {
        if self.has_next_page {
            self.end_cursor.as_deref()
        } else {
            None
        }
    }
}

/// Paginated list of products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductConnection {
    /// Products in this page.
    pub products: Vec<Product>,
    /// Pagination info.
    pub page_info: PageInfo,
}

// =============================================================================
// Cart Types
// =============================================================================

/// A cart created on Shopify for the hosted checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteCart {
    /// Cart ID.
    pub id: CartId,
    /// Hosted checkout page for this cart.
    pub checkout_url: String,
}

// =============================================================================
// Sort Keys
// =============================================================================

/// Sort keys for collection product queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductCollectionSortKey {
    /// Default collection order.
    #[default]
    CollectionDefault,
    /// Sort by title.
    Title,
    /// Sort by price.
    Price,
    /// Sort by best selling.
    BestSelling,
    /// Sort by creation date.
    Created,
    /// Sort by ID.
    Id,
    /// Sort manually.
    Manual,
    /// Sort by relevance.
    Relevance,
}

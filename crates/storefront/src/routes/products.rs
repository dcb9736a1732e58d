//! Product card and product modal view models.
//!
//! Both the home grid and collection pages render products the same way, so
//! the conversions from Shopify types live here.

use shopfront_core::{discount_percent, truncate};

use crate::shopify::types::{Image, Product, ProductVariant};

/// Longest product title shown on a card before it is cut with `...`.
const CARD_TITLE_MAX_CHARS: usize = 60;

/// Query parameter that opens the product modal.
const PRODUCT_PARAM: &str = "product";

/// Image display data for templates.
#[derive(Clone)]
pub struct ImageView {
    pub url: String,
    pub alt: String,
}

impl ImageView {
    fn new(image: &Image, fallback_alt: &str) -> Self {
        Self {
            url: image.url.clone(),
            alt: image
                .alt_text
                .clone()
                .filter(|alt| !alt.is_empty())
                .unwrap_or_else(|| fallback_alt.to_string()),
        }
    }
}

/// Product card in a grid.
#[derive(Clone)]
pub struct ProductCardView {
    pub handle: String,
    pub title: String,
    pub title_short: String,
    pub price: String,
    pub discount_percent: Option<u32>,
    pub image: Option<ImageView>,
    /// Link that opens this product's modal on the current page.
    pub detail_href: String,
}

impl ProductCardView {
    /// Build a card; `page_path` and `page_params` describe the page the grid is on.
    #[must_use]
    pub fn new(product: &Product, page_path: &str, page_params: &[(&str, &str)]) -> Self {
        let mut params = page_params.to_vec();
        params.push((PRODUCT_PARAM, product.handle.as_str()));

        Self {
            handle: product.handle.clone(),
            title: product.title.clone(),
            title_short: truncate(&product.title, CARD_TITLE_MAX_CHARS),
            price: product.price.display(),
            discount_percent: product
                .compare_at_price
                .as_ref()
                .and_then(|compare_at| discount_percent(&product.price, compare_at)),
            image: product
                .primary_image()
                .map(|img| ImageView::new(img, &product.title)),
            detail_href: page_href(page_path, &params),
        }
    }
}

/// Purchasable variant choice in the product modal.
#[derive(Clone)]
pub struct VariantView {
    pub id: String,
    pub title: String,
    pub price: String,
}

impl From<&ProductVariant> for VariantView {
    fn from(variant: &ProductVariant) -> Self {
        Self {
            id: variant.id.to_string(),
            title: variant.title.clone(),
            price: variant.price.display(),
        }
    }
}

/// Product detail shown in the modal.
#[derive(Clone)]
pub struct ProductModalView {
    pub handle: String,
    pub title: String,
    pub description: String,
    pub price: String,
    pub compare_at_price: Option<String>,
    pub images: Vec<ImageView>,
    /// Only variants that are available for sale.
    pub variants: Vec<VariantView>,
    /// The page without the modal open.
    pub close_href: String,
}

impl ProductModalView {
    #[must_use]
    pub fn new(product: &Product, close_href: String) -> Self {
        let mut images: Vec<ImageView> = product
            .images
            .iter()
            .map(|img| ImageView::new(img, &product.title))
            .collect();
        if images.is_empty()
            && let Some(featured) = &product.featured_image
        {
            images.push(ImageView::new(featured, &product.title));
        }

        Self {
            handle: product.handle.clone(),
            title: product.title.clone(),
            description: product.description.clone(),
            price: product.price.display(),
            compare_at_price: product
                .compare_at_price
                .as_ref()
                .filter(|compare_at| discount_percent(&product.price, compare_at).is_some())
                .map(shopfront_core::Money::display),
            images,
            variants: product.available_variants().map(VariantView::from).collect(),
            close_href,
        }
    }

    /// Whether any variant can be added to the cart.
    #[must_use]
    pub fn can_add(&self) -> bool {
        !self.variants.is_empty()
    }
}

/// Build a local link from a path and query parameters.
#[must_use]
pub fn page_href(path: &str, params: &[(&str, &str)]) -> String {
    if params.is_empty() {
        return path.to_string();
    }
    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();
    format!("{path}?{query}")
}

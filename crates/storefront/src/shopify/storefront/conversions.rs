//! Conversions from raw query responses to domain types.
//!
//! This is the validation boundary for catalog data. Prices are parsed into
//! [`Money`] here; a variant whose price cannot be parsed is dropped with a
//! warning, and a product whose price range cannot be parsed is dropped
//! entirely, so nothing downstream ever sees a malformed amount.

use shopfront_core::{CartId, CollectionId, Money, ProductId, SelectedOption, VariantId};
use tracing::warn;

use crate::shopify::ShopifyError;
use crate::shopify::types::{
    Collection, CollectionProducts, Image, PageInfo, Product, ProductConnection, ProductVariant,
    RemoteCart,
};

use super::queries::fragments::{
    CartFields, ImageFields, MoneyV2, ProductFields, UserError, VariantFields,
};
use super::queries::{get_collection_products, get_products};

fn convert_money(money: &MoneyV2) -> Result<Money, shopfront_core::PriceError> {
    Money::parse(&money.amount, &money.currency_code)
}

pub fn convert_image(image: ImageFields) -> Image {
    Image {
        url: image.url,
        alt_text: image.alt_text,
        width: image.width,
        height: image.height,
    }
}

fn convert_variant(product_handle: &str, variant: VariantFields) -> Option<ProductVariant> {
    let price = match convert_money(&variant.price) {
        Ok(price) => price,
        Err(e) => {
            warn!(
                product = %product_handle,
                variant_id = %variant.id,
                error = %e,
                "Dropping variant with invalid price"
            );
            return None;
        }
    };

    Some(ProductVariant {
        id: VariantId::new(variant.id),
        title: variant.title,
        available_for_sale: variant.available_for_sale,
        price,
        compare_at_price: variant
            .compare_at_price
            .as_ref()
            .and_then(|m| convert_money(m).ok()),
        selected_options: variant
            .selected_options
            .into_iter()
            .map(|o| SelectedOption {
                name: o.name,
                value: o.value,
            })
            .collect(),
        image: variant.image.map(convert_image),
    })
}

/// Convert a product, or `None` if its price range is malformed.
pub fn convert_product(product: ProductFields) -> Option<Product> {
    let price = match convert_money(&product.price_range.min_variant_price) {
        Ok(price) => price,
        Err(e) => {
            warn!(
                product = %product.handle,
                error = %e,
                "Dropping product with invalid price range"
            );
            return None;
        }
    };
    let compare_at_price = product
        .compare_at_price_range
        .as_ref()
        .and_then(|r| convert_money(&r.min_variant_price).ok());

    let handle = product.handle;
    let variants = product
        .variants
        .nodes
        .into_iter()
        .filter_map(|v| convert_variant(&handle, v))
        .collect();

    Some(Product {
        id: ProductId::new(product.id),
        handle,
        title: product.title,
        description: product.description,
        available_for_sale: product.available_for_sale,
        price,
        compare_at_price,
        featured_image: product.featured_image.map(convert_image),
        images: product
            .images
            .nodes
            .into_iter()
            .map(convert_image)
            .collect(),
        variants,
    })
}

pub fn convert_product_connection(
    connection: get_products::ProductsConnection,
) -> ProductConnection {
    ProductConnection {
        products: connection
            .nodes
            .into_iter()
            .filter_map(convert_product)
            .collect(),
        page_info: PageInfo {
            has_next_page: connection.page_info.has_next_page,
            end_cursor: connection.page_info.end_cursor,
        },
    }
}

pub fn convert_collection_products(
    collection: get_collection_products::CollectionFields,
) -> CollectionProducts {
    CollectionProducts {
        collection: Collection {
            id: CollectionId::new(collection.id),
            handle: collection.handle,
            title: collection.title,
            description: collection.description,
            image: collection.image.map(convert_image),
        },
        products: collection
            .products
            .nodes
            .into_iter()
            .filter_map(convert_product)
            .collect(),
    }
}

/// Convert a cart mutation payload.
///
/// `userErrors` take precedence over a returned cart.
pub fn convert_cart_payload(
    cart: Option<CartFields>,
    user_errors: Vec<UserError>,
    operation: &str,
) -> Result<RemoteCart, ShopifyError> {
    if !user_errors.is_empty() {
        return Err(ShopifyError::UserError(
            user_errors
                .into_iter()
                .map(convert_user_error)
                .collect::<Vec<_>>()
                .join("; "),
        ));
    }

    cart.map(|c| RemoteCart {
        id: CartId::new(c.id),
        checkout_url: c.checkout_url,
    })
    .ok_or_else(|| ShopifyError::message(format!("{operation} returned no cart")))
}

fn convert_user_error(error: UserError) -> String {
    match error.field {
        Some(field) if !field.is_empty() => format!("{} ({})", error.message, field.join(".")),
        _ => error.message,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product_json(price: &str, variant_prices: &[&str]) -> serde_json::Value {
        let variants: Vec<_> = variant_prices
            .iter()
            .enumerate()
            .map(|(i, p)| {
                serde_json::json!({
                    "id": format!("gid://shopify/ProductVariant/{i}"),
                    "title": "Default Title",
                    "availableForSale": true,
                    "price": {"amount": p, "currencyCode": "USD"},
                    "compareAtPrice": null,
                    "selectedOptions": [{"name": "Size", "value": "M"}],
                    "image": null
                })
            })
            .collect();
        serde_json::json!({
            "id": "gid://shopify/Product/1",
            "handle": "tee",
            "title": "Tee",
            "description": "Soft",
            "availableForSale": true,
            "priceRange": {"minVariantPrice": {"amount": price, "currencyCode": "USD"}},
            "compareAtPriceRange": {"minVariantPrice": {"amount": "0.0", "currencyCode": "USD"}},
            "featuredImage": null,
            "images": {"nodes": [{"url": "https://cdn.shopify.com/tee.png", "altText": null, "width": 100, "height": 100}]},
            "variants": {"nodes": variants}
        })
    }

    #[test]
    fn test_convert_product_parses_prices() {
        let raw: ProductFields =
            serde_json::from_value(product_json("19.99", &["19.99", "24.00"])).unwrap();
        let product = convert_product(raw).unwrap();

        assert_eq!(product.price, Money::parse("19.99", "USD").unwrap());
        assert_eq!(product.variants.len(), 2);
        assert_eq!(product.variants[0].selected_options[0].value, "M");
        assert_eq!(product.images.len(), 1);
    }

    #[test]
    fn test_convert_product_drops_malformed_variant() {
        let raw: ProductFields =
            serde_json::from_value(product_json("19.99", &["19.99", "not-a-price"])).unwrap();
        let product = convert_product(raw).unwrap();

        assert_eq!(product.variants.len(), 1);
        assert_eq!(
            product.variants[0].id.as_str(),
            "gid://shopify/ProductVariant/0"
        );
    }

    #[test]
    fn test_convert_product_drops_product_with_bad_price_range() {
        let raw: ProductFields = serde_json::from_value(product_json("", &["1.00"])).unwrap();
        assert!(convert_product(raw).is_none());
    }

    #[test]
    fn test_convert_cart_payload_user_errors_win() {
        let err = convert_cart_payload(
            Some(CartFields {
                id: "gid://shopify/Cart/1".to_string(),
                checkout_url: "https://shop.example/checkouts/1".to_string(),
            }),
            vec![UserError {
                field: Some(vec!["lines".to_string(), "0".to_string()]),
                message: "Merchandise does not exist".to_string(),
            }],
            "cartLinesAdd",
        )
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "User error: Merchandise does not exist (lines.0)"
        );
    }

    #[test]
    fn test_convert_cart_payload_missing_cart() {
        let err = convert_cart_payload(None, vec![], "cartCreate").unwrap_err();
        assert_eq!(err.to_string(), "GraphQL errors: cartCreate returned no cart");
    }

    #[test]
    fn test_convert_cart_payload_ok() {
        let cart = convert_cart_payload(
            Some(CartFields {
                id: "gid://shopify/Cart/1".to_string(),
                checkout_url: "https://shop.example/checkouts/1".to_string(),
            }),
            vec![],
            "cartCreate",
        )
        .unwrap();
        assert_eq!(cart.id.as_str(), "gid://shopify/Cart/1");
        assert_eq!(cart.checkout_url, "https://shop.example/checkouts/1");
    }
}

//! GraphQL operations for the Shopify Storefront API.
//!
//! Each operation gets a unit struct implementing [`GraphQLQuery`] and a
//! snake_case module holding its `Variables`, `ResponseData` and query text,
//! the same shape `graphql_client` generates. Response structs only declare
//! the fields the storefront reads.

use graphql_client::{GraphQLQuery, QueryBody};

/// Implement [`GraphQLQuery`] for an operation struct backed by a module.
macro_rules! graphql_operation {
    ($name:ident, $module:ident) => {
        pub struct $name;

        impl GraphQLQuery for $name {
            type Variables = $module::Variables;
            type ResponseData = $module::ResponseData;

            fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
                QueryBody {
                    variables,
                    query: $module::QUERY,
                    operation_name: $module::OPERATION_NAME,
                }
            }
        }
    };
}

/// Product fields shared by every catalog query.
macro_rules! product_fields {
    () => {
        "
fragment ImageFields on Image {
  url
  altText
  width
  height
}

fragment ProductFields on Product {
  id
  handle
  title
  description
  availableForSale
  priceRange {
    minVariantPrice { amount currencyCode }
  }
  compareAtPriceRange {
    minVariantPrice { amount currencyCode }
  }
  featuredImage { ...ImageFields }
  images(first: 10) {
    nodes { ...ImageFields }
  }
  variants(first: 50) {
    nodes {
      id
      title
      availableForSale
      price { amount currencyCode }
      compareAtPrice { amount currencyCode }
      selectedOptions { name value }
      image { ...ImageFields }
    }
  }
}
"
    };
}

/// Raw response shapes shared across operations.
pub mod fragments {
    use serde::Deserialize;

    /// `{ nodes: [...] }` connection.
    #[derive(Debug, Clone, Deserialize)]
    pub struct Nodes<T> {
        pub nodes: Vec<T>,
    }

    impl<T> Default for Nodes<T> {
        fn default() -> Self {
            Self { nodes: Vec::new() }
        }
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MoneyV2 {
        pub amount: String,
        pub currency_code: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PriceRange {
        pub min_variant_price: MoneyV2,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ImageFields {
        pub url: String,
        pub alt_text: Option<String>,
        pub width: Option<i64>,
        pub height: Option<i64>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct SelectedOption {
        pub name: String,
        pub value: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct VariantFields {
        pub id: String,
        pub title: String,
        pub available_for_sale: bool,
        pub price: MoneyV2,
        pub compare_at_price: Option<MoneyV2>,
        #[serde(default)]
        pub selected_options: Vec<SelectedOption>,
        pub image: Option<ImageFields>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ProductFields {
        pub id: String,
        pub handle: String,
        pub title: String,
        #[serde(default)]
        pub description: String,
        pub available_for_sale: bool,
        pub price_range: PriceRange,
        pub compare_at_price_range: Option<PriceRange>,
        pub featured_image: Option<ImageFields>,
        #[serde(default)]
        pub images: Nodes<ImageFields>,
        #[serde(default)]
        pub variants: Nodes<VariantFields>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PageInfo {
        pub has_next_page: bool,
        pub end_cursor: Option<String>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CartFields {
        pub id: String,
        pub checkout_url: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct UserError {
        pub field: Option<Vec<String>>,
        pub message: String,
    }
}

// =============================================================================
// Product queries
// =============================================================================

graphql_operation!(GetProductByHandle, get_product_by_handle);

pub mod get_product_by_handle {
    use serde::{Deserialize, Serialize};

    use super::fragments::ProductFields;

    pub const OPERATION_NAME: &str = "GetProductByHandle";
    pub const QUERY: &str = concat!(
        "
query GetProductByHandle($handle: String!) {
  product(handle: $handle) {
    ...ProductFields
  }
}
",
        product_fields!()
    );

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub handle: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub product: Option<ProductFields>,
    }
}

graphql_operation!(GetProducts, get_products);

pub mod get_products {
    use serde::{Deserialize, Serialize};

    use super::fragments::{PageInfo, ProductFields};

    pub const OPERATION_NAME: &str = "GetProducts";
    pub const QUERY: &str = concat!(
        "
query GetProducts($first: Int!, $after: String) {
  products(first: $first, after: $after) {
    nodes {
      ...ProductFields
    }
    pageInfo {
      hasNextPage
      endCursor
    }
  }
}
",
        product_fields!()
    );

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub first: i64,
        pub after: Option<String>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub products: ProductsConnection,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ProductsConnection {
        pub nodes: Vec<ProductFields>,
        pub page_info: PageInfo,
    }
}

// =============================================================================
// Collection queries
// =============================================================================

graphql_operation!(GetCollectionProducts, get_collection_products);

pub mod get_collection_products {
    use serde::{Deserialize, Serialize};

    use super::fragments::{ImageFields, Nodes, ProductFields};
    use crate::shopify::types::ProductCollectionSortKey;

    pub const OPERATION_NAME: &str = "GetCollectionProducts";
    pub const QUERY: &str = concat!(
        "
query GetCollectionProducts(
  $handle: String!
  $first: Int!
  $sortKey: ProductCollectionSortKeys
  $reverse: Boolean
) {
  collection(handle: $handle) {
    id
    handle
    title
    description
    image { ...ImageFields }
    products(first: $first, sortKey: $sortKey, reverse: $reverse) {
      nodes {
        ...ProductFields
      }
    }
  }
}
",
        product_fields!()
    );

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub handle: String,
        pub first: i64,
        pub sort_key: ProductCollectionSortKey,
        pub reverse: bool,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub collection: Option<CollectionFields>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct CollectionFields {
        pub id: String,
        pub handle: String,
        pub title: String,
        #[serde(default)]
        pub description: String,
        pub image: Option<ImageFields>,
        #[serde(default)]
        pub products: Nodes<ProductFields>,
    }
}

// =============================================================================
// Cart mutations
// =============================================================================

graphql_operation!(CartCreate, cart_create);

pub mod cart_create {
    use serde::{Deserialize, Serialize};
    use shopfront_core::CartLineInput;

    use super::fragments::{CartFields, UserError};

    pub const OPERATION_NAME: &str = "CartCreate";
    pub const QUERY: &str = "
mutation CartCreate($input: CartInput!) {
  cartCreate(input: $input) {
    cart {
      id
      checkoutUrl
    }
    userErrors {
      field
      message
    }
  }
}
";

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub input: CartInput,
    }

    #[derive(Debug, Clone, Default, Serialize)]
    pub struct CartInput {
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub lines: Vec<CartLineInput>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub cart_create: Option<Payload>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Payload {
        pub cart: Option<CartFields>,
        #[serde(default)]
        pub user_errors: Vec<UserError>,
    }
}

graphql_operation!(CartLinesAdd, cart_lines_add);

pub mod cart_lines_add {
    use serde::{Deserialize, Serialize};
    use shopfront_core::CartLineInput;

    use super::fragments::{CartFields, UserError};

    pub const OPERATION_NAME: &str = "CartLinesAdd";
    pub const QUERY: &str = "
mutation CartLinesAdd($cartId: ID!, $lines: [CartLineInput!]!) {
  cartLinesAdd(cartId: $cartId, lines: $lines) {
    cart {
      id
      checkoutUrl
    }
    userErrors {
      field
      message
    }
  }
}
";

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub cart_id: String,
        pub lines: Vec<CartLineInput>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub cart_lines_add: Option<Payload>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Payload {
        pub cart: Option<CartFields>,
        #[serde(default)]
        pub user_errors: Vec<UserError>,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::shopify::types::ProductCollectionSortKey;
    use shopfront_core::{CartLineInput, VariantId};

    #[test]
    fn test_query_bodies_carry_operation_name() {
        let body = GetProducts::build_query(get_products::Variables {
            first: 12,
            after: None,
        });
        assert_eq!(body.operation_name, "GetProducts");
        assert!(body.query.contains("fragment ProductFields on Product"));

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["operationName"], "GetProducts");
        assert_eq!(json["variables"]["first"], 12);
    }

    #[test]
    fn test_collection_variables_are_camel_case() {
        let vars = get_collection_products::Variables {
            handle: "summer".to_string(),
            first: 20,
            sort_key: ProductCollectionSortKey::CollectionDefault,
            reverse: false,
        };
        assert_eq!(
            serde_json::to_value(vars).unwrap(),
            serde_json::json!({
                "handle": "summer",
                "first": 20,
                "sortKey": "COLLECTION_DEFAULT",
                "reverse": false
            })
        );
    }

    #[test]
    fn test_cart_lines_add_variables() {
        let vars = cart_lines_add::Variables {
            cart_id: "gid://shopify/Cart/1".to_string(),
            lines: vec![CartLineInput {
                merchandise_id: VariantId::new("gid://shopify/ProductVariant/1"),
                quantity: 2,
            }],
        };
        assert_eq!(
            serde_json::to_value(vars).unwrap(),
            serde_json::json!({
                "cartId": "gid://shopify/Cart/1",
                "lines": [{"merchandiseId": "gid://shopify/ProductVariant/1", "quantity": 2}]
            })
        );
    }

    #[test]
    fn test_cart_create_sends_empty_input() {
        let vars = cart_create::Variables {
            input: cart_create::CartInput::default(),
        };
        assert_eq!(
            serde_json::to_value(vars).unwrap(),
            serde_json::json!({"input": {}})
        );
    }

    #[test]
    fn test_products_response_parses() {
        let json = serde_json::json!({
            "products": {
                "nodes": [],
                "pageInfo": {"hasNextPage": true, "endCursor": "abc"}
            }
        });
        let data: get_products::ResponseData = serde_json::from_value(json).unwrap();
        assert!(data.products.nodes.is_empty());
        assert!(data.products.page_info.has_next_page);
    }
}

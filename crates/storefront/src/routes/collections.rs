//! Collection route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use super::cart::LayoutView;
use super::home::load_modal;
use super::products::{ImageView, ProductCardView, ProductModalView};
use crate::filters;
use crate::middleware::CurrentCart;
use crate::shopify::ShopifyError;
use crate::shopify::types::{Collection as ShopifyCollection, CollectionProductsQuery};
use crate::state::AppState;

/// Collection display data for templates.
#[derive(Clone)]
pub struct CollectionView {
    pub handle: String,
    pub title: String,
    pub description: Option<String>,
    /// Hero banner image.
    pub image: Option<ImageView>,
}

impl From<&ShopifyCollection> for CollectionView {
    fn from(collection: &ShopifyCollection) -> Self {
        Self {
            handle: collection.handle.clone(),
            title: collection.title.clone(),
            description: (!collection.description.is_empty())
                .then(|| collection.description.clone()),
            image: collection.image.as_ref().map(|img| ImageView {
                url: img.url.clone(),
                alt: img
                    .alt_text
                    .clone()
                    .filter(|alt| !alt.is_empty())
                    .unwrap_or_else(|| collection.title.clone()),
            }),
        }
    }
}

/// Collection page query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct CollectionQuery {
    /// Handle of the product to show in the modal.
    pub product: Option<String>,
}

/// Collection detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "collection.html")]
pub struct CollectionShowTemplate {
    pub layout: LayoutView,
    pub collection: Option<CollectionView>,
    pub products: Vec<ProductCardView>,
    /// Message for the "Failed to Load Collection" panel.
    pub error: Option<String>,
    pub modal: Option<ProductModalView>,
}

/// Display a collection with its products.
#[instrument(skip(state, cart))]
pub async fn show(
    State(state): State<AppState>,
    CurrentCart(cart): CurrentCart,
    Path(handle): Path<String>,
    Query(query): Query<CollectionQuery>,
) -> Response {
    let page_path = format!("/collections/{handle}");
    let request = CollectionProductsQuery::new(&handle, state.config().catalog.collection_limit);

    let (collection, products, error, status) =
        match state.storefront().get_collection_products(&request).await {
            Ok(result) => {
                let products = result
                    .products
                    .iter()
                    .map(|p| ProductCardView::new(p, &page_path, &[]))
                    .collect();
                (
                    Some(CollectionView::from(&result.collection)),
                    products,
                    None,
                    StatusCode::OK,
                )
            }
            Err(ShopifyError::NotFound(_)) => (
                None,
                Vec::new(),
                Some(format!("Collection \"{handle}\" not found.")),
                StatusCode::NOT_FOUND,
            ),
            Err(e) => {
                tracing::error!("Failed to fetch collection {handle}: {e}");
                (
                    None,
                    Vec::new(),
                    Some("Something went wrong loading this collection. Please try again.".to_string()),
                    StatusCode::BAD_GATEWAY,
                )
            }
        };

    let modal = load_modal(state.storefront(), query.product.as_deref(), &page_path).await;

    let template = CollectionShowTemplate {
        layout: LayoutView::load(&state, &cart, page_path).await,
        collection,
        products,
        error,
        modal,
    };

    (status, template).into_response()
}

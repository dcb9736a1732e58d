//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use super::cart::LayoutView;
use super::products::{ProductCardView, ProductModalView, page_href};
use crate::filters;
use crate::middleware::CurrentCart;
use crate::shopify::{ShopifyError, StorefrontClient};
use crate::state::AppState;

/// Query parameter carrying the product page cursor.
const AFTER_PARAM: &str = "after";

/// Home page query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct HomeQuery {
    /// Cursor of the last product on the previous page.
    pub after: Option<String>,
    /// Handle of the product to show in the modal.
    pub product: Option<String>,
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub layout: LayoutView,
    pub title: String,
    pub products: Vec<ProductCardView>,
    /// Link to the next page of products.
    pub load_more_href: Option<String>,
    /// Shown instead of the grid when the catalog could not be fetched.
    pub error: Option<String>,
    pub modal: Option<ProductModalView>,
}

/// Display the home page: the "Our Products" grid.
#[instrument(skip(state, cart))]
pub async fn home(
    State(state): State<AppState>,
    CurrentCart(cart): CurrentCart,
    Query(query): Query<HomeQuery>,
) -> Response {
    let after = query.after.as_deref().filter(|c| !c.is_empty());
    let page_params: Vec<(&str, &str)> = after.map(|c| (AFTER_PARAM, c)).into_iter().collect();
    let page_url = page_href("/", &page_params);

    let per_page = state.config().catalog.products_per_page;
    let (products, load_more_href, error, status) = match state
        .storefront()
        .get_products(per_page, after.map(String::from))
        .await
    {
        Ok(connection) => {
            let cards = connection
                .products
                .iter()
                .map(|p| ProductCardView::new(p, "/", &page_params))
                .collect();
            let more = connection
                .page_info
                .next_cursor()
                .map(|cursor| page_href("/", &[(AFTER_PARAM, cursor)]));
            (cards, more, None, StatusCode::OK)
        }
        Err(e) => {
            tracing::error!("Failed to fetch products: {e}");
            (
                Vec::new(),
                None,
                Some("We couldn't load products right now. Please try again.".to_string()),
                StatusCode::BAD_GATEWAY,
            )
        }
    };

    let modal = load_modal(state.storefront(), query.product.as_deref(), &page_url).await;

    // Drawer actions close the modal
    let template = HomeTemplate {
        layout: LayoutView::load(&state, &cart, page_url).await,
        title: "Our Products".to_string(),
        products,
        load_more_href,
        error,
        modal,
    };

    (status, template).into_response()
}

/// Fetch the product named by `?product=` for the modal.
///
/// A missing or failing product simply leaves the modal closed.
pub(crate) async fn load_modal(
    storefront: &StorefrontClient,
    handle: Option<&str>,
    close_href: &str,
) -> Option<ProductModalView> {
    let handle = handle.filter(|h| !h.is_empty())?;
    match storefront.get_product_by_handle(handle).await {
        Ok(product) => Some(ProductModalView::new(&product, close_href.to_string())),
        Err(ShopifyError::NotFound(_)) => {
            tracing::warn!(%handle, "Modal requested for unknown product");
            None
        }
        Err(e) => {
            tracing::error!(%handle, "Failed to fetch product for modal: {e}");
            None
        }
    }
}

//! Cart route handlers.
//!
//! The cart lives server-side in the session's [`CartSession`]. Drawer
//! actions are plain form posts that change the cart and answer with a
//! `303 See Other` back to the page they came from, so every page renders
//! the drawer from the current state.
//!
//! [`CartSession`]: crate::services::CartSession

use axum::{
    Form, Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use shopfront_core::{Cart, LineItem, LineItemInput, Money, VariantId, VariantSummary};
use tracing::instrument;

use crate::config::BrandConfig;
use crate::error::{Result, add_breadcrumb};
use crate::middleware::CurrentCart;
use crate::services::{CheckoutOutcome, SharedCart, hand_off};
use crate::shopify::ShopifyError;
use crate::state::AppState;

/// Badge text is capped at this count.
const BADGE_MAX: u64 = 99;

// =============================================================================
// View Models
// =============================================================================

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartLineView {
    pub variant_id: String,
    pub title: String,
    /// Selected option values joined with ` / `, if any.
    pub options: Option<String>,
    pub image: Option<String>,
    pub quantity: u32,
    pub price: String,
    pub decrement_quantity: u32,
    pub increment_quantity: u32,
    pub decrement_disabled: bool,
}

impl From<&LineItem> for CartLineView {
    fn from(item: &LineItem) -> Self {
        let options = item.variant.options_label();
        Self {
            variant_id: item.variant_id.to_string(),
            title: item.title.clone(),
            options: (!options.is_empty()).then_some(options),
            image: item.image.clone(),
            quantity: item.quantity,
            price: item.price.display(),
            decrement_quantity: item.quantity.saturating_sub(1),
            increment_quantity: item.quantity.saturating_add(1),
            decrement_disabled: item.quantity <= 1,
        }
    }
}

/// Cart drawer display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartLineView>,
    pub item_count: u64,
    /// Header badge text; `None` hides the badge.
    pub badge: Option<String>,
    pub subtotal: String,
    pub is_open: bool,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        let item_count = cart.item_count();
        let badge = match item_count {
            0 => None,
            n if n > BADGE_MAX => Some(format!("{BADGE_MAX}+")),
            n => Some(n.to_string()),
        };

        Self {
            items: cart.items().iter().map(CartLineView::from).collect(),
            item_count,
            badge,
            subtotal: cart.total_amount().display(),
            is_open: cart.is_open(),
        }
    }
}

/// Data every page needs for the header, drawer and footer.
#[derive(Clone)]
pub struct LayoutView {
    pub brand: BrandConfig,
    pub fonts_url: String,
    pub cart: CartView,
    /// One-time message, such as a failed checkout.
    pub notice: Option<String>,
    /// Where drawer forms send the shopper back to.
    pub return_to: String,
}

impl LayoutView {
    /// Snapshot the session cart for rendering and consume its pending notice.
    pub async fn load(state: &AppState, cart: &SharedCart, return_to: String) -> Self {
        let (cart, notice) = {
            let mut session = cart.lock().await;
            (CartView::from(&session.cart), session.take_notice())
        };

        let brand = state.config().brand.clone();
        Self {
            fonts_url: brand.fonts_url(),
            brand,
            cart,
            notice,
            return_to,
        }
    }
}

/// JSON snapshot served by `GET /api/cart`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    pub items: Vec<LineItem>,
    pub item_count: u64,
    pub total_amount: Money,
    pub is_open: bool,
}

impl From<&Cart> for CartSnapshot {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items().to_vec(),
            item_count: cart.item_count(),
            total_amount: cart.total_amount(),
            is_open: cart.is_open(),
        }
    }
}

// =============================================================================
// Forms
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub handle: String,
    pub variant_id: String,
    pub quantity: Option<u32>,
    pub return_to: Option<String>,
}

/// Update quantity form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub variant_id: String,
    pub quantity: i64,
    pub return_to: Option<String>,
}

/// Remove line form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub variant_id: String,
    pub return_to: Option<String>,
}

/// Form data for actions that only need a way back.
#[derive(Debug, Default, Deserialize)]
pub struct ReturnToForm {
    pub return_to: Option<String>,
}

/// Accept only local paths; anything else falls back to `/`.
///
/// Rejects `//host` and `/\host`, which browsers treat as other origins.
#[must_use]
pub fn sanitize_return_to(return_to: Option<&str>) -> &str {
    match return_to {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.starts_with("/\\")
                && !path.chars().any(char::is_control) =>
        {
            path
        }
        _ => "/",
    }
}

fn back(return_to: Option<&str>) -> Response {
    Redirect::to(sanitize_return_to(return_to)).into_response()
}

// =============================================================================
// Handlers
// =============================================================================

/// Add a variant to the cart and open the drawer.
///
/// The variant is looked up through the catalog so that only validated
/// prices reach the cart. Unknown products or variants are ignored.
#[instrument(skip(state, cart))]
pub async fn add(
    State(state): State<AppState>,
    CurrentCart(cart): CurrentCart,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let product = match state.storefront().get_product_by_handle(&form.handle).await {
        Ok(product) => product,
        Err(ShopifyError::NotFound(_)) => {
            tracing::warn!(handle = %form.handle, "Add to cart for unknown product");
            return Ok(back(form.return_to.as_deref()));
        }
        Err(e) => return Err(e.into()),
    };

    let variant_id = VariantId::new(form.variant_id);
    let Some(variant) = product
        .variant(&variant_id)
        .filter(|v| v.available_for_sale)
    else {
        tracing::warn!(handle = %form.handle, variant_id = %variant_id, "Add to cart for unavailable variant");
        return Ok(back(form.return_to.as_deref()));
    };

    let input = LineItemInput {
        variant_id: variant.id.clone(),
        product_id: product.id.clone(),
        title: product.title.clone(),
        price: variant.price.clone(),
        image: variant
            .image
            .as_ref()
            .or_else(|| product.primary_image())
            .map(|img| img.url.clone()),
        variant: VariantSummary {
            title: variant.title.clone(),
            selected_options: variant.selected_options.clone(),
        },
        quantity: form.quantity,
    };

    {
        let mut session = cart.lock().await;
        session.cart.add_item(input);
        session.cart.open();
    }

    add_breadcrumb(
        "cart",
        "Added item",
        Some(&[("variant_id", variant_id.as_str())]),
    );
    Ok(back(form.return_to.as_deref()))
}

/// Set a line's quantity (clamped to at least one).
#[instrument(skip(cart))]
pub async fn update(CurrentCart(cart): CurrentCart, Form(form): Form<UpdateCartForm>) -> Response {
    let variant_id = VariantId::new(form.variant_id);
    cart.lock()
        .await
        .cart
        .update_quantity(&variant_id, form.quantity);

    add_breadcrumb(
        "cart",
        "Updated quantity",
        Some(&[("variant_id", variant_id.as_str())]),
    );
    back(form.return_to.as_deref())
}

/// Remove a line from the cart.
#[instrument(skip(cart))]
pub async fn remove(
    CurrentCart(cart): CurrentCart,
    Form(form): Form<RemoveFromCartForm>,
) -> Response {
    let variant_id = VariantId::new(form.variant_id);
    cart.lock().await.cart.remove_item(&variant_id);

    add_breadcrumb(
        "cart",
        "Removed item",
        Some(&[("variant_id", variant_id.as_str())]),
    );
    back(form.return_to.as_deref())
}

/// Empty the cart.
#[instrument(skip(cart))]
pub async fn clear(CurrentCart(cart): CurrentCart, Form(form): Form<ReturnToForm>) -> Response {
    cart.lock().await.cart.clear();
    add_breadcrumb("cart", "Cleared cart", None);
    back(form.return_to.as_deref())
}

/// Show the drawer.
#[instrument(skip(cart))]
pub async fn open(CurrentCart(cart): CurrentCart, Form(form): Form<ReturnToForm>) -> Response {
    cart.lock().await.cart.open();
    back(form.return_to.as_deref())
}

/// Hide the drawer.
#[instrument(skip(cart))]
pub async fn close(CurrentCart(cart): CurrentCart, Form(form): Form<ReturnToForm>) -> Response {
    cart.lock().await.cart.close();
    back(form.return_to.as_deref())
}

/// Flip drawer visibility.
#[instrument(skip(cart))]
pub async fn toggle(CurrentCart(cart): CurrentCart, Form(form): Form<ReturnToForm>) -> Response {
    cart.lock().await.cart.toggle();
    back(form.return_to.as_deref())
}

/// Current cart as JSON.
#[instrument(skip(cart))]
pub async fn snapshot(CurrentCart(cart): CurrentCart) -> Json<CartSnapshot> {
    Json(CartSnapshot::from(&cart.lock().await.cart))
}

/// Hand the cart to the Shopify hosted checkout.
///
/// Redirects to the checkout page on success. A request that arrives while
/// a handoff is already running gets `204 No Content`. On failure the
/// shopper is sent back with a notice and the cart unchanged.
#[instrument(skip(state, cart))]
pub async fn checkout(
    State(state): State<AppState>,
    CurrentCart(cart): CurrentCart,
    Form(form): Form<ReturnToForm>,
) -> Response {
    add_breadcrumb("checkout", "Checkout requested", None);

    let gateway = state.storefront().clone();
    match hand_off(cart, gateway, state.config().cart.checkout_timeout).await {
        CheckoutOutcome::Redirected(checkout_url) => Redirect::to(&checkout_url).into_response(),
        CheckoutOutcome::AlreadyInProgress => StatusCode::NO_CONTENT.into_response(),
        CheckoutOutcome::Failed(_) => back(form.return_to.as_deref()),
    }
}

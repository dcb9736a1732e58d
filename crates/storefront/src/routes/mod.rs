//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page ("Our Products" grid)
//! GET  /health                 - Health check
//! GET  /theme.css              - Brand colours and fonts
//!
//! # Catalog
//! GET  /collections/{handle}   - Collection detail
//!
//! Both pages open the product modal with ?product={handle}.
//!
//! # Cart (form posts, answer 303 to return_to)
//! POST /cart/add               - Add a variant and open the drawer
//! POST /cart/update            - Set quantity
//! POST /cart/remove            - Remove a line
//! POST /cart/clear             - Empty the cart
//! POST /cart/open              - Show the drawer
//! POST /cart/close             - Hide the drawer
//! POST /cart/toggle            - Flip the drawer
//! GET  /api/cart               - Cart snapshot (JSON)
//!
//! # Checkout
//! POST /checkout               - Hand off to the Shopify hosted checkout
//! ```

pub mod cart;
pub mod collections;
pub mod home;
pub mod products;
pub mod theme;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/open", post(cart::open))
        .route("/close", post(cart::close))
        .route("/toggle", post(cart::toggle))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        .route("/theme.css", get(theme::stylesheet))
        // Collection routes
        .route("/collections/{handle}", get(collections::show))
        // Cart routes
        .nest("/cart", cart_routes())
        .route("/api/cart", get(cart::snapshot))
        // Checkout handoff
        .route("/checkout", post(cart::checkout))
}

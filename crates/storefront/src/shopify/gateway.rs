//! The commerce gateway seam used by the checkout handoff.
//!
//! Checkout only needs two remote operations, so it depends on this trait
//! rather than on [`StorefrontClient`] directly. Tests drive the handoff with
//! an in-memory gateway.

use std::future::Future;

use shopfront_core::{CartId, CartLineInput};

use super::{RemoteCart, ShopifyError, StorefrontClient};

/// Remote cart operations offered by the commerce platform.
pub trait CommerceGateway: Send + Sync {
    /// Create an empty remote cart.
    fn create_cart(&self) -> impl Future<Output = Result<RemoteCart, ShopifyError>> + Send;

    /// Add lines to an existing remote cart.
    fn add_cart_lines(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineInput>,
    ) -> impl Future<Output = Result<RemoteCart, ShopifyError>> + Send;
}

impl CommerceGateway for StorefrontClient {
    async fn create_cart(&self) -> Result<RemoteCart, ShopifyError> {
        Self::create_cart(self).await
    }

    async fn add_cart_lines(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineInput>,
    ) -> Result<RemoteCart, ShopifyError> {
        Self::add_cart_lines(self, cart_id, lines).await
    }
}

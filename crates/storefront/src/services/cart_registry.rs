//! Per-session cart state.
//!
//! Each browser session owns one [`CartSession`] behind a `tokio` mutex.
//! The registry maps the session's cart key to that state and drops carts
//! that have been idle longer than the configured timeout.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use shopfront_core::{Cart, CartLineInput, CheckoutHandoff};
use tokio::sync::Mutex;
use uuid::Uuid;

/// Upper bound on concurrently tracked session carts.
const MAX_CARTS: u64 = 100_000;

/// A session's cart, its checkout handoff, and a pending notice.
#[derive(Debug, Default)]
pub struct CartSession {
    pub cart: Cart,
    pub checkout: CheckoutHandoff,
    notice: Option<String>,
}

impl CartSession {
    /// Enter `CheckingOut` and snapshot the cart lines.
    ///
    /// Returns `None` if a handoff is already in flight.
    pub fn begin_checkout(&mut self) -> Option<Vec<CartLineInput>> {
        self.checkout.begin(&self.cart)
    }

    /// Queue a message for the next page render.
    pub fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
    }

    /// Take the pending message; it is shown once.
    pub const fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }
}

/// Shared handle to one session's cart.
pub type SharedCart = Arc<Mutex<CartSession>>;

/// In-memory map from session cart key to cart state.
#[derive(Clone)]
pub struct CartRegistry {
    carts: Cache<Uuid, SharedCart>,
}

impl CartRegistry {
    /// Create a registry that forgets carts idle for longer than `idle_timeout`.
    #[must_use]
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            carts: Cache::builder()
                .max_capacity(MAX_CARTS)
                .time_to_idle(idle_timeout)
                .build(),
        }
    }

    /// Get the cart for `key`, creating an empty one on first use.
    pub async fn get_or_create(&self, key: Uuid) -> SharedCart {
        self.carts
            .get_with(key, async { Arc::new(Mutex::new(CartSession::default())) })
            .await
    }

    /// Get the cart for `key` if it exists.
    pub async fn get(&self, key: &Uuid) -> Option<SharedCart> {
        self.carts.get(key).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use shopfront_core::{LineItemInput, Money, ProductId, VariantId, VariantSummary};

    fn input(variant: &str) -> LineItemInput {
        LineItemInput {
            variant_id: VariantId::new(variant),
            product_id: ProductId::new("p1"),
            title: "Tee".to_string(),
            price: Money::parse("10.00", "USD").unwrap(),
            image: None,
            variant: VariantSummary::default(),
            quantity: None,
        }
    }

    #[tokio::test]
    async fn test_get_or_create_returns_same_cart() {
        let registry = CartRegistry::new(Duration::from_secs(60));
        let key = Uuid::new_v4();

        let cart = registry.get_or_create(key).await;
        cart.lock().await.cart.add_item(input("v1"));

        let again = registry.get_or_create(key).await;
        assert!(Arc::ptr_eq(&cart, &again));
        assert_eq!(again.lock().await.cart.item_count(), 1);
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let registry = CartRegistry::new(Duration::from_secs(60));
        let a = registry.get_or_create(Uuid::new_v4()).await;
        let b = registry.get_or_create(Uuid::new_v4()).await;

        a.lock().await.cart.add_item(input("v1"));
        assert!(b.lock().await.cart.is_empty());
    }

    #[tokio::test]
    async fn test_get_unknown_key() {
        let registry = CartRegistry::new(Duration::from_secs(60));
        assert!(registry.get(&Uuid::new_v4()).await.is_none());
    }

    #[test]
    fn test_notice_is_taken_once() {
        let mut session = CartSession::default();
        session.set_notice("Failed");
        assert_eq!(session.take_notice().as_deref(), Some("Failed"));
        assert_eq!(session.take_notice(), None);
    }
}

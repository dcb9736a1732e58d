//! Checkout handoff orchestration.
//!
//! Moves a session cart to the Shopify hosted checkout:
//!
//! 1. Lock the session briefly, enter `CheckingOut` and snapshot the lines
//! 2. Release the lock and create a remote cart
//! 3. Add the snapshot lines to it (skipped for an empty snapshot)
//! 4. Re-lock and record the outcome
//!
//! Steps 2-4 run in a spawned task bounded by the checkout timeout, so the
//! phase always leaves `CheckingOut` even if the shopper's request is
//! dropped mid-flight. The local cart is never modified.

use std::sync::Arc;
use std::time::Duration;

use shopfront_core::CartLineInput;
use thiserror::Error;
use tracing::{error, info, instrument};

use crate::services::cart_registry::{CartSession, SharedCart};
use crate::shopify::{CommerceGateway, ShopifyError};

/// Message shown to the shopper when the handoff fails.
pub const CHECKOUT_FAILED_NOTICE: &str = "Failed to proceed to checkout. Please try again.";

/// Reasons a checkout handoff can fail.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The commerce gateway rejected or failed a call.
    #[error("Gateway error: {0}")]
    Gateway(#[from] ShopifyError),

    /// The remote calls did not finish in time.
    #[error("Checkout timed out after {0:?}")]
    Timeout(Duration),

    /// The handoff task stopped before reporting an outcome.
    #[error("Checkout task aborted")]
    Aborted,
}

/// Result of a checkout request.
#[derive(Debug)]
pub enum CheckoutOutcome {
    /// Send the shopper to this hosted checkout URL.
    Redirected(String),
    /// A handoff for this session is already in flight; nothing was done.
    AlreadyInProgress,
    /// The handoff failed; the session is back to `Idle` with a notice set.
    Failed(CheckoutError),
}

/// Hand the session cart over to the hosted checkout.
#[instrument(skip_all)]
pub async fn hand_off<G>(cart: SharedCart, gateway: G, timeout: Duration) -> CheckoutOutcome
where
    G: CommerceGateway + 'static,
{
    let Some(lines) = cart.lock().await.begin_checkout() else {
        info!("Checkout already in progress, ignoring request");
        return CheckoutOutcome::AlreadyInProgress;
    };

    let task_cart = Arc::clone(&cart);
    let task = tokio::spawn(async move {
        let result = match tokio::time::timeout(timeout, submit(&gateway, lines)).await {
            Ok(result) => result.map_err(CheckoutError::from),
            Err(_) => Err(CheckoutError::Timeout(timeout)),
        };
        let mut session = task_cart.lock().await;
        match &result {
            Ok(checkout_url) => record_success(&mut session, checkout_url),
            Err(e) => record_failure(&mut session, e),
        }
        result
    });

    match task.await {
        Ok(Ok(checkout_url)) => CheckoutOutcome::Redirected(checkout_url),
        Ok(Err(e)) => CheckoutOutcome::Failed(e),
        Err(join_error) => {
            error!(error = %join_error, "Checkout task did not complete");
            let e = CheckoutError::Aborted;
            record_failure(&mut *cart.lock().await, &e);
            CheckoutOutcome::Failed(e)
        }
    }
}

/// Create the remote cart and fill it with the snapshot lines.
async fn submit<G: CommerceGateway>(
    gateway: &G,
    lines: Vec<CartLineInput>,
) -> Result<String, ShopifyError> {
    let remote = gateway.create_cart().await?;
    if lines.is_empty() {
        return Ok(remote.checkout_url);
    }
    let remote = gateway.add_cart_lines(&remote.id, lines).await?;
    Ok(remote.checkout_url)
}

fn record_success(session: &mut CartSession, checkout_url: &str) {
    info!(checkout_url = %checkout_url, "Checkout handoff complete");
    session.checkout.redirected(checkout_url);
}

fn record_failure(session: &mut CartSession, e: &CheckoutError) {
    let event_id = sentry::capture_error(e);
    error!(error = %e, sentry_event_id = %event_id, "Checkout handoff failed");
    session.checkout.fail();
    session.set_notice(CHECKOUT_FAILED_NOTICE);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use shopfront_core::{
        CartId, CheckoutPhase, LineItemInput, Money, ProductId, VariantId, VariantSummary,
    };
    use tokio::sync::{Mutex, Notify};

    use crate::shopify::RemoteCart;

    #[derive(Default)]
    struct MockState {
        create_calls: AtomicUsize,
        add_calls: StdMutex<Vec<(CartId, Vec<CartLineInput>)>>,
        fail_create: AtomicBool,
        fail_add: AtomicBool,
        gated: AtomicBool,
        gate: Notify,
    }

    #[derive(Clone, Default)]
    struct MockGateway {
        state: Arc<MockState>,
    }

    impl MockGateway {
        fn failing_create() -> Self {
            let gateway = Self::default();
            gateway.state.fail_create.store(true, Ordering::SeqCst);
            gateway
        }

        fn failing_add() -> Self {
            let gateway = Self::default();
            gateway.state.fail_add.store(true, Ordering::SeqCst);
            gateway
        }

        fn gated() -> Self {
            let gateway = Self::default();
            gateway.state.gated.store(true, Ordering::SeqCst);
            gateway
        }

        fn release(&self) {
            self.state.gate.notify_one();
        }

        fn create_calls(&self) -> usize {
            self.state.create_calls.load(Ordering::SeqCst)
        }

        fn add_calls(&self) -> Vec<(CartId, Vec<CartLineInput>)> {
            self.state.add_calls.lock().unwrap().clone()
        }
    }

    impl CommerceGateway for MockGateway {
        async fn create_cart(&self) -> Result<RemoteCart, ShopifyError> {
            self.state.create_calls.fetch_add(1, Ordering::SeqCst);
            if self.state.gated.load(Ordering::SeqCst) {
                self.state.gate.notified().await;
            }
            if self.state.fail_create.load(Ordering::SeqCst) {
                return Err(ShopifyError::UserError("cart create rejected".to_string()));
            }
            Ok(RemoteCart {
                id: CartId::new("gid://shopify/Cart/c1"),
                checkout_url: "https://shop.example/cart/c1".to_string(),
            })
        }

        async fn add_cart_lines(
            &self,
            cart_id: &CartId,
            lines: Vec<CartLineInput>,
        ) -> Result<RemoteCart, ShopifyError> {
            self.state
                .add_calls
                .lock()
                .unwrap()
                .push((cart_id.clone(), lines));
            if self.state.fail_add.load(Ordering::SeqCst) {
                return Err(ShopifyError::UserError(
                    "Merchandise does not exist".to_string(),
                ));
            }
            Ok(RemoteCart {
                id: cart_id.clone(),
                checkout_url: "https://shop.example/checkouts/c1".to_string(),
            })
        }
    }

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn shared_cart(lines: &[(&str, u32)]) -> SharedCart {
        let mut session = CartSession::default();
        for (variant, quantity) in lines {
            session.cart.add_item(line(variant, *quantity));
        }
        Arc::new(Mutex::new(session))
    }

    fn line(variant: &str, quantity: u32) -> LineItemInput {
        LineItemInput {
            variant_id: VariantId::new(variant),
            product_id: ProductId::new("p1"),
            title: "Tee".to_string(),
            price: Money::parse("12.50", "USD").unwrap(),
            image: None,
            variant: VariantSummary::default(),
            quantity: Some(quantity),
        }
    }

    async fn wait_for_checking_out(cart: &SharedCart) {
        while !cart.lock().await.checkout.is_checking_out() {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_empty_cart_redirects_to_created_cart() {
        let gateway = MockGateway::default();
        let cart = shared_cart(&[]);

        let outcome = hand_off(Arc::clone(&cart), gateway.clone(), TIMEOUT).await;

        assert!(
            matches!(outcome, CheckoutOutcome::Redirected(ref url) if url == "https://shop.example/cart/c1")
        );
        assert_eq!(gateway.create_calls(), 1);
        assert!(gateway.add_calls().is_empty());
        assert_eq!(
            cart.lock().await.checkout.phase(),
            &CheckoutPhase::Redirected {
                checkout_url: "https://shop.example/cart/c1".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_cart_lines_are_sent_and_add_lines_url_used() {
        let gateway = MockGateway::default();
        let cart = shared_cart(&[("v1", 2)]);

        let outcome = hand_off(Arc::clone(&cart), gateway.clone(), TIMEOUT).await;

        assert!(
            matches!(outcome, CheckoutOutcome::Redirected(ref url) if url == "https://shop.example/checkouts/c1")
        );
        assert_eq!(gateway.create_calls(), 1);
        assert_eq!(
            gateway.add_calls(),
            vec![(
                CartId::new("gid://shopify/Cart/c1"),
                vec![CartLineInput {
                    merchandise_id: VariantId::new("v1"),
                    quantity: 2
                }]
            )]
        );
        // Local cart is untouched by a successful handoff
        assert_eq!(cart.lock().await.cart.item_count(), 2);
    }

    #[tokio::test]
    async fn test_create_failure_returns_to_idle_and_keeps_items() {
        let gateway = MockGateway::failing_create();
        let cart = shared_cart(&[("v1", 2), ("v2", 1)]);

        let outcome = hand_off(Arc::clone(&cart), gateway.clone(), TIMEOUT).await;

        assert!(matches!(
            outcome,
            CheckoutOutcome::Failed(CheckoutError::Gateway(_))
        ));
        assert!(gateway.add_calls().is_empty());

        let mut session = cart.lock().await;
        assert_eq!(session.checkout.phase(), &CheckoutPhase::Idle);
        assert_eq!(session.cart.items().len(), 2);
        assert_eq!(session.cart.item_count(), 3);
        assert_eq!(session.take_notice().as_deref(), Some(CHECKOUT_FAILED_NOTICE));
    }

    #[tokio::test]
    async fn test_add_lines_failure_returns_to_idle() {
        let gateway = MockGateway::failing_add();
        let cart = shared_cart(&[("v1", 1)]);

        let outcome = hand_off(Arc::clone(&cart), gateway.clone(), TIMEOUT).await;

        assert!(matches!(outcome, CheckoutOutcome::Failed(_)));
        assert_eq!(gateway.add_calls().len(), 1);
        assert_eq!(cart.lock().await.checkout.phase(), &CheckoutPhase::Idle);
        assert_eq!(cart.lock().await.cart.item_count(), 1);
    }

    #[tokio::test]
    async fn test_second_checkout_while_in_flight_is_ignored() {
        let gateway = MockGateway::gated();
        let cart = shared_cart(&[("v1", 1)]);

        let first = tokio::spawn(hand_off(Arc::clone(&cart), gateway.clone(), TIMEOUT));
        wait_for_checking_out(&cart).await;

        let second = hand_off(Arc::clone(&cart), gateway.clone(), TIMEOUT).await;
        assert!(matches!(second, CheckoutOutcome::AlreadyInProgress));

        gateway.release();
        let first = first.await.unwrap();
        assert!(matches!(first, CheckoutOutcome::Redirected(_)));
        assert_eq!(gateway.create_calls(), 1);
    }

    #[tokio::test]
    async fn test_edits_during_checkout_do_not_reach_remote_cart() {
        let gateway = MockGateway::gated();
        let cart = shared_cart(&[("v1", 2)]);

        let pending = tokio::spawn(hand_off(Arc::clone(&cart), gateway.clone(), TIMEOUT));
        wait_for_checking_out(&cart).await;

        {
            let mut session = cart.lock().await;
            session.cart.add_item(line("v2", 1));
            session.cart.update_quantity(&VariantId::new("v1"), 7);
        }

        gateway.release();
        assert!(matches!(
            pending.await.unwrap(),
            CheckoutOutcome::Redirected(_)
        ));

        let calls = gateway.add_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0].1,
            vec![CartLineInput {
                merchandise_id: VariantId::new("v1"),
                quantity: 2
            }]
        );
        assert_eq!(cart.lock().await.cart.item_count(), 8);
    }

    #[tokio::test]
    async fn test_timeout_is_a_failure() {
        let gateway = MockGateway::gated();
        let cart = shared_cart(&[("v1", 1)]);

        let outcome = hand_off(
            Arc::clone(&cart),
            gateway.clone(),
            Duration::from_millis(50),
        )
        .await;

        assert!(matches!(
            outcome,
            CheckoutOutcome::Failed(CheckoutError::Timeout(_))
        ));
        let session = cart.lock().await;
        assert_eq!(session.checkout.phase(), &CheckoutPhase::Idle);
        assert_eq!(session.cart.item_count(), 1);
    }

    #[tokio::test]
    async fn test_checkout_completes_when_caller_is_dropped() {
        let gateway = MockGateway::gated();
        let cart = shared_cart(&[("v1", 1)]);

        let request = tokio::spawn(hand_off(Arc::clone(&cart), gateway.clone(), TIMEOUT));
        wait_for_checking_out(&cart).await;
        request.abort();
        let _ = request.await;

        gateway.release();
        while cart.lock().await.checkout.is_checking_out() {
            tokio::task::yield_now().await;
        }
        assert!(matches!(
            cart.lock().await.checkout.phase(),
            CheckoutPhase::Redirected { .. }
        ));
    }

    #[tokio::test]
    async fn test_checkout_can_be_retried_after_failure() {
        let gateway = MockGateway::failing_create();
        let cart = shared_cart(&[("v1", 1)]);

        let _ = hand_off(Arc::clone(&cart), gateway.clone(), TIMEOUT).await;
        gateway.state.fail_create.store(false, Ordering::SeqCst);
        let outcome = hand_off(Arc::clone(&cart), gateway.clone(), TIMEOUT).await;

        assert!(matches!(outcome, CheckoutOutcome::Redirected(_)));
        assert_eq!(gateway.create_calls(), 2);
    }
}

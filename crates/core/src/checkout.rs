//! Checkout handoff state machine.
//!
//! ```text
//!            begin()                 redirected(url)
//!   Idle ───────────────► CheckingOut ─────────────► Redirected
//!    ▲                        │                          │
//!    └──────── fail() ────────┘                          │
//!    ▲                                                   │
//!    └───────────── begin() starts a new handoff ────────┘
//! ```
//!
//! [`CheckoutHandoff::begin`] is the only way into `CheckingOut` and refuses
//! while a handoff is already in flight, so one shopper can never create two
//! remote carts concurrently. It returns an owned snapshot of the cart lines;
//! edits made to the cart afterwards do not reach the remote cart.

use serde::{Deserialize, Serialize};

use crate::cart::{Cart, LineItem};
use crate::types::VariantId;

/// A line sent to the commerce platform when building the remote cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineInput {
    /// Variant being purchased.
    pub merchandise_id: VariantId,
    /// Quantity (at least one).
    pub quantity: u32,
}

impl From<&LineItem> for CartLineInput {
    fn from(item: &LineItem) -> Self {
        Self {
            merchandise_id: item.variant_id.clone(),
            quantity: item.quantity,
        }
    }
}

/// Where a shopper's checkout handoff currently stands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CheckoutPhase {
    /// No handoff in progress.
    #[default]
    Idle,
    /// Remote cart creation is in flight.
    CheckingOut,
    /// The shopper was sent to the hosted checkout page.
    Redirected {
        /// Checkout URL the shopper was sent to.
        checkout_url: String,
    },
}

/// Guarded state machine for handing a cart over to the hosted checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutHandoff {
    phase: CheckoutPhase,
}

impl CheckoutHandoff {
    /// Create an idle handoff.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> &CheckoutPhase {
        &self.phase
    }

    /// Whether a handoff is in flight.
    #[must_use]
    pub const fn is_checking_out(&self) -> bool {
        matches!(self.phase, CheckoutPhase::CheckingOut)
    }

    /// Enter `CheckingOut` and snapshot the cart lines.
    ///
    /// Returns `None`, leaving the phase untouched, if a handoff is already
    /// in flight.
    pub fn begin(&mut self, cart: &Cart) -> Option<Vec<CartLineInput>> {
        if self.is_checking_out() {
            return None;
        }
        self.phase = CheckoutPhase::CheckingOut;
        Some(cart.items().iter().map(CartLineInput::from).collect())
    }

    /// Record a successful handoff.
    ///
    /// Ignored unless a handoff is in flight.
    pub fn redirected(&mut self, checkout_url: impl Into<String>) {
        if self.is_checking_out() {
            self.phase = CheckoutPhase::Redirected {
                checkout_url: checkout_url.into(),
            };
        }
    }

    /// Record a failed handoff and return to `Idle`.
    ///
    /// Ignored unless a handoff is in flight.
    pub fn fail(&mut self) {
        if self.is_checking_out() {
            self.phase = CheckoutPhase::Idle;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cart::{LineItemInput, VariantSummary};
    use crate::types::{Money, ProductId};

    fn cart_with(lines: &[(&str, u32)]) -> Cart {
        let mut cart = Cart::new();
        for (variant, quantity) in lines {
            cart.add_item(LineItemInput {
                variant_id: VariantId::new(*variant),
                product_id: ProductId::new("p"),
                title: "Item".to_string(),
                price: Money::parse("5.00", "USD").unwrap(),
                image: None,
                variant: VariantSummary::default(),
                quantity: Some(*quantity),
            });
        }
        cart
    }

    #[test]
    fn test_begin_snapshots_lines() {
        let cart = cart_with(&[("v1", 2), ("v2", 1)]);
        let mut handoff = CheckoutHandoff::new();

        let lines = handoff.begin(&cart).unwrap();
        assert_eq!(
            lines,
            vec![
                CartLineInput {
                    merchandise_id: VariantId::new("v1"),
                    quantity: 2
                },
                CartLineInput {
                    merchandise_id: VariantId::new("v2"),
                    quantity: 1
                },
            ]
        );
        assert_eq!(handoff.phase(), &CheckoutPhase::CheckingOut);
    }

    #[test]
    fn test_begin_on_empty_cart_gives_empty_snapshot() {
        let mut handoff = CheckoutHandoff::new();
        assert_eq!(handoff.begin(&Cart::new()), Some(Vec::new()));
    }

    #[test]
    fn test_second_begin_is_refused() {
        let cart = cart_with(&[("v1", 1)]);
        let mut handoff = CheckoutHandoff::new();
        assert!(handoff.begin(&cart).is_some());
        assert!(handoff.begin(&cart).is_none());
        assert!(handoff.is_checking_out());
    }

    #[test]
    fn test_snapshot_is_detached_from_cart() {
        let mut cart = cart_with(&[("v1", 2)]);
        let mut handoff = CheckoutHandoff::new();
        let lines = handoff.begin(&cart).unwrap();

        cart.update_quantity(&VariantId::new("v1"), 9);
        cart.clear();

        assert_eq!(lines.len(), 1);
        assert_eq!(lines.first().map(|l| l.quantity), Some(2));
    }

    #[test]
    fn test_fail_returns_to_idle() {
        let cart = cart_with(&[("v1", 1)]);
        let mut handoff = CheckoutHandoff::new();
        handoff.begin(&cart);
        handoff.fail();
        assert_eq!(handoff.phase(), &CheckoutPhase::Idle);
        assert!(handoff.begin(&cart).is_some());
    }

    #[test]
    fn test_redirected_records_url_and_allows_new_handoff() {
        let cart = cart_with(&[("v1", 1)]);
        let mut handoff = CheckoutHandoff::new();
        handoff.begin(&cart);
        handoff.redirected("https://shop.example/checkouts/1");
        assert_eq!(
            handoff.phase(),
            &CheckoutPhase::Redirected {
                checkout_url: "https://shop.example/checkouts/1".to_string()
            }
        );
        assert!(handoff.begin(&cart).is_some());
    }

    #[test]
    fn test_outcomes_ignored_when_idle() {
        let mut handoff = CheckoutHandoff::new();
        handoff.redirected("https://shop.example/checkouts/1");
        assert_eq!(handoff.phase(), &CheckoutPhase::Idle);
        handoff.fail();
        assert_eq!(handoff.phase(), &CheckoutPhase::Idle);
    }
}

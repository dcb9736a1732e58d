//! Storefront services.
//!
//! # Services
//!
//! - `cart_registry` - Per-session cart state held in memory
//! - `checkout` - Hands a session cart over to the Shopify hosted checkout

pub mod cart_registry;
pub mod checkout;

pub use cart_registry::{CartRegistry, CartSession, SharedCart};
pub use checkout::{CHECKOUT_FAILED_NOTICE, CheckoutError, CheckoutOutcome, hand_off};

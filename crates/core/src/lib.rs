//! Shopfront Core - cart state and money types.
//!
//! This crate holds the pieces of the storefront that own state and
//! invariants, independent of any transport:
//! - [`cart`] - the session cart container (line items, drawer visibility, totals)
//! - [`checkout`] - the checkout handoff state machine
//! - [`types`] - ids, money, and small text helpers
//!
//! # Architecture
//!
//! No I/O, no HTTP clients, no async. The `shopfront` crate wires these
//! types to the Shopify Storefront API and to the HTTP layer.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod types;

pub use cart::{Cart, LineItem, LineItemInput, SelectedOption, VariantSummary};
pub use checkout::{CartLineInput, CheckoutHandoff, CheckoutPhase};
pub use types::*;

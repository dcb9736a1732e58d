//! The session cart container.
//!
//! [`Cart`] is the single owner of a shopper's line items and of the cart
//! drawer's visibility. Every change goes through its command methods; item
//! count and total are recomputed from the lines on every read.
//!
//! # Invariants
//!
//! - At most one [`LineItem`] per [`VariantId`]. Adding a variant that is
//!   already present increases its quantity instead of appending a line.
//! - Every line has `quantity >= 1`.
//! - Lines keep insertion order; re-adding a variant does not move it.
//!
//! Unknown variant IDs passed to [`Cart::remove_item`] or
//! [`Cart::update_quantity`] are ignored.

use serde::{Deserialize, Serialize};

use crate::types::{CurrencyCode, Money, ProductId, VariantId};

/// Selected option on a product variant (e.g., `Size: Large`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedOption {
    /// Option name (e.g., "Size", "Color").
    pub name: String,
    /// Selected value (e.g., "Large", "Blue").
    pub value: String,
}

/// Variant details shown under a cart line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantSummary {
    /// Variant title (e.g., "Large / Blue").
    pub title: String,
    /// Selected options, in the order the product defines them.
    pub selected_options: Vec<SelectedOption>,
}

impl VariantSummary {
    /// Option values joined for display (e.g., `"Large / Blue"`).
    #[must_use]
    pub fn options_label(&self) -> String {
        self.selected_options
            .iter()
            .map(|o| o.value.as_str())
            .collect::<Vec<_>>()
            .join(" / ")
    }
}

/// Data needed to add a variant to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemInput {
    pub variant_id: VariantId,
    pub product_id: ProductId,
    pub title: String,
    pub price: Money,
    pub image: Option<String>,
    pub variant: VariantSummary,
    /// Quantity to add; `None` means one.
    pub quantity: Option<u32>,
}

/// One distinct purchasable unit in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub variant_id: VariantId,
    pub product_id: ProductId,
    pub title: String,
    pub price: Money,
    pub image: Option<String>,
    pub variant: VariantSummary,
    pub quantity: u32,
}

impl LineItem {
    /// Price multiplied by quantity.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.price.times(self.quantity)
    }
}

/// Session cart: ordered line items plus drawer visibility.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    items: Vec<LineItem>,
    is_open: bool,
}

impl Cart {
    /// Create an empty, closed cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variant, merging with an existing line for the same variant.
    ///
    /// The input's display data (title, price, image, options) only seeds a
    /// new line; an existing line keeps what it was created with.
    pub fn add_item(&mut self, input: LineItemInput) {
        let quantity = input.quantity.unwrap_or(1).max(1);

        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|item| item.variant_id == input.variant_id)
        {
            existing.quantity = existing.quantity.saturating_add(quantity);
            return;
        }

        self.items.push(LineItem {
            variant_id: input.variant_id,
            product_id: input.product_id,
            title: input.title,
            price: input.price,
            image: input.image,
            variant: input.variant,
            quantity,
        });
    }

    /// Remove the line for `variant_id`, if any.
    pub fn remove_item(&mut self, variant_id: &VariantId) {
        self.items.retain(|item| &item.variant_id != variant_id);
    }

    /// Set the quantity of the line for `variant_id`.
    ///
    /// Values below one are clamped to one; use [`Cart::remove_item`] to
    /// drop a line.
    pub fn update_quantity(&mut self, variant_id: &VariantId, quantity: i64) {
        let Some(item) = self
            .items
            .iter_mut()
            .find(|item| &item.variant_id == variant_id)
        else {
            return;
        };
        item.quantity = u32::try_from(quantity.max(1)).unwrap_or(u32::MAX);
    }

    /// Remove every line. Drawer visibility is left as is.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Show the drawer.
    pub const fn open(&mut self) {
        self.is_open = true;
    }

    /// Hide the drawer.
    pub const fn close(&mut self) {
        self.is_open = false;
    }

    /// Flip drawer visibility.
    pub const fn toggle(&mut self) {
        self.is_open = !self.is_open;
    }

    /// Whether the drawer is visible.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.is_open
    }

    /// Lines in display order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Line for `variant_id`, if present.
    #[must_use]
    pub fn get(&self, variant_id: &VariantId) -> Option<&LineItem> {
        self.items.iter().find(|item| &item.variant_id == variant_id)
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all line quantities.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Sum of `quantity * price` over all lines.
    ///
    /// Uses the first line's currency; an empty cart totals zero USD.
    #[must_use]
    pub fn total_amount(&self) -> Money {
        let currency = self
            .items
            .first()
            .map_or(CurrencyCode::USD, |item| item.price.currency_code.clone());

        self.items
            .iter()
            .fold(Money::zero(currency), |mut total, item| {
                let line = item.line_total();
                total.amount = total
                    .amount
                    .checked_add(line.amount)
                    .unwrap_or(rust_decimal::Decimal::MAX);
                total
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn input(variant: &str, amount: &str, quantity: Option<u32>) -> LineItemInput {
        LineItemInput {
            variant_id: VariantId::new(variant),
            product_id: ProductId::new("gid://shopify/Product/1"),
            title: format!("Item {variant}"),
            price: Money::parse(amount, "USD").unwrap(),
            image: None,
            variant: VariantSummary {
                title: "Default Title".to_string(),
                selected_options: Vec::new(),
            },
            quantity,
        }
    }

    fn sum_quantities(cart: &Cart) -> u64 {
        cart.items().iter().map(|i| u64::from(i.quantity)).sum()
    }

    #[test]
    fn test_new_cart_is_empty_and_closed() {
        let cart = Cart::new();
        assert!(cart.is_empty());
        assert!(!cart.is_open());
        assert_eq!(cart.item_count(), 0);
        assert_eq!(cart.total_amount(), Money::zero(CurrencyCode::USD));
    }

    #[test]
    fn test_add_new_variant_defaults_to_one() {
        let mut cart = Cart::new();
        cart.add_item(input("v1", "10.00", None));
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.get(&VariantId::new("v1")).unwrap().quantity, 1);
    }

    #[test]
    fn test_add_existing_variant_increments() {
        let mut cart = Cart::new();
        cart.add_item(input("v1", "10.00", None));
        cart.add_item(input("v1", "10.00", Some(2)));
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.get(&VariantId::new("v1")).unwrap().quantity, 3);
    }

    #[test]
    fn test_add_sequence_keeps_one_line_per_variant() {
        let calls = [
            ("a", Some(2)),
            ("b", None),
            ("a", Some(1)),
            ("c", Some(5)),
            ("b", Some(4)),
            ("a", None),
        ];
        let mut cart = Cart::new();
        for (variant, quantity) in calls {
            cart.add_item(input(variant, "1.00", quantity));
        }

        assert_eq!(cart.items().len(), 3);
        for variant in ["a", "b", "c"] {
            let expected: u32 = calls
                .iter()
                .filter(|(v, _)| *v == variant)
                .map(|(_, q)| q.unwrap_or(1))
                .sum();
            assert_eq!(
                cart.get(&VariantId::new(variant)).unwrap().quantity,
                expected
            );
        }
    }

    #[test]
    fn test_readd_does_not_move_line() {
        let mut cart = Cart::new();
        cart.add_item(input("a", "1.00", None));
        cart.add_item(input("b", "1.00", None));
        cart.add_item(input("a", "1.00", None));
        let order: Vec<&str> = cart.items().iter().map(|i| i.variant_id.as_str()).collect();
        assert_eq!(order, vec!["a", "b"]);
    }

    #[test]
    fn test_readd_keeps_original_display_data() {
        let mut cart = Cart::new();
        cart.add_item(input("a", "1.00", None));
        let mut renamed = input("a", "9.00", None);
        renamed.title = "Renamed".to_string();
        cart.add_item(renamed);
        let line = cart.get(&VariantId::new("a")).unwrap();
        assert_eq!(line.title, "Item a");
        assert_eq!(line.price.amount, Decimal::new(100, 2));
    }

    #[test]
    fn test_zero_quantity_input_counts_as_one() {
        let mut cart = Cart::new();
        cart.add_item(input("a", "1.00", Some(0)));
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn test_item_count_tracks_every_mutation() {
        let mut cart = Cart::new();
        cart.add_item(input("a", "1.00", Some(2)));
        assert_eq!(cart.item_count(), sum_quantities(&cart));
        cart.add_item(input("b", "1.00", Some(3)));
        assert_eq!(cart.item_count(), 5);
        cart.update_quantity(&VariantId::new("a"), 7);
        assert_eq!(cart.item_count(), 10);
        cart.remove_item(&VariantId::new("b"));
        assert_eq!(cart.item_count(), 7);
        assert_eq!(cart.item_count(), sum_quantities(&cart));
    }

    #[test]
    fn test_total_amount_sums_lines() {
        let mut cart = Cart::new();
        cart.add_item(input("a", "19.99", Some(2)));
        cart.add_item(input("b", "0.10", Some(3)));
        let total = cart.total_amount();
        assert_eq!(total.amount, Decimal::new(4028, 2));
        assert_eq!(total.display(), "$40.28");
    }

    #[test]
    fn test_total_amount_rounds_on_display() {
        let mut cart = Cart::new();
        cart.add_item(input("a", "0.333", Some(3)));
        assert_eq!(cart.total_amount().amount, Decimal::new(999, 3));
        assert_eq!(cart.total_amount().display(), "$1.00");
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut cart = Cart::new();
        cart.add_item(input("a", "1.00", None));
        cart.add_item(input("b", "1.00", None));
        cart.remove_item(&VariantId::new("a"));
        let after_first = cart.clone();
        cart.remove_item(&VariantId::new("a"));
        assert_eq!(cart, after_first);
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let mut cart = Cart::new();
        cart.add_item(input("a", "1.00", None));
        let before = cart.clone();
        cart.remove_item(&VariantId::new("missing"));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_update_quantity_clamps_to_one() {
        let mut cart = Cart::new();
        cart.add_item(input("a", "1.00", Some(4)));
        for value in [0, -1, -100, i64::MIN] {
            cart.update_quantity(&VariantId::new("a"), value);
            assert_eq!(cart.get(&VariantId::new("a")).unwrap().quantity, 1);
        }
    }

    #[test]
    fn test_update_quantity_sets_value() {
        let mut cart = Cart::new();
        cart.add_item(input("a", "1.00", None));
        cart.update_quantity(&VariantId::new("a"), 12);
        assert_eq!(cart.get(&VariantId::new("a")).unwrap().quantity, 12);
        cart.update_quantity(&VariantId::new("a"), i64::MAX);
        assert_eq!(cart.get(&VariantId::new("a")).unwrap().quantity, u32::MAX);
    }

    #[test]
    fn test_update_unknown_is_noop() {
        let mut cart = Cart::new();
        cart.add_item(input("a", "1.00", None));
        let before = cart.clone();
        cart.update_quantity(&VariantId::new("missing"), 5);
        assert_eq!(cart, before);
    }

    #[test]
    fn test_clear_keeps_visibility() {
        let mut cart = Cart::new();
        cart.add_item(input("a", "1.00", None));
        cart.open();
        cart.clear();
        assert!(cart.items().is_empty());
        assert!(cart.is_open());

        cart.add_item(input("a", "1.00", None));
        cart.close();
        cart.clear();
        assert!(cart.items().is_empty());
        assert!(!cart.is_open());
    }

    #[test]
    fn test_visibility_toggles_leave_items_alone() {
        let mut cart = Cart::new();
        cart.add_item(input("a", "1.00", Some(2)));
        let items = cart.items().to_vec();

        cart.toggle();
        assert!(cart.is_open());
        cart.toggle();
        assert!(!cart.is_open());
        cart.open();
        cart.open();
        assert!(cart.is_open());
        cart.close();
        assert!(!cart.is_open());

        assert_eq!(cart.items(), items.as_slice());
    }

    #[test]
    fn test_options_label() {
        let summary = VariantSummary {
            title: "Large / Blue".to_string(),
            selected_options: vec![
                SelectedOption {
                    name: "Size".to_string(),
                    value: "Large".to_string(),
                },
                SelectedOption {
                    name: "Color".to_string(),
                    value: "Blue".to_string(),
                },
            ],
        };
        assert_eq!(summary.options_label(), "Large / Blue");
        assert_eq!(VariantSummary::default().options_label(), "");
    }
}

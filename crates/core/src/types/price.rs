//! Type-safe price representation using decimal arithmetic.
//!
//! Shopify sends amounts as decimal strings (`"19.99"`). They are parsed once,
//! at the API boundary, into a [`Decimal`] so that summing cart lines never
//! goes through floating point. Formatting follows `en-US` currency
//! conventions: symbol prefix, thousands separators, two fraction digits
//! (none for zero-decimal currencies such as JPY).

use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when parsing a [`Money`] value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    /// The amount string is not a decimal number.
    #[error("invalid amount {0:?}")]
    InvalidAmount(String),
    /// The amount is below zero.
    #[error("amount cannot be negative: {0}")]
    Negative(Decimal),
    /// The currency code is empty.
    #[error("currency code cannot be empty")]
    MissingCurrency,
}

/// A price with currency information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Money {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// A zero amount in the given currency.
    #[must_use]
    pub const fn zero(currency_code: CurrencyCode) -> Self {
        Self::new(Decimal::ZERO, currency_code)
    }

    /// Parse a decimal string and currency code as returned by Shopify.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError`] if the amount is not a non-negative decimal or
    /// the currency code is empty.
    pub fn parse(amount: &str, currency_code: &str) -> Result<Self, PriceError> {
        let trimmed = amount.trim();
        let amount = Decimal::from_str(trimmed)
            .map_err(|_| PriceError::InvalidAmount(amount.to_string()))?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        let currency_code = currency_code.trim();
        if currency_code.is_empty() {
            return Err(PriceError::MissingCurrency);
        }
        Ok(Self::new(amount, CurrencyCode::from(currency_code)))
    }

    /// Multiply the amount by a line quantity.
    ///
    /// Saturates at [`Decimal::MAX`] instead of overflowing.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        let amount = self
            .amount
            .checked_mul(Decimal::from(quantity))
            .unwrap_or(Decimal::MAX);
        Self::new(amount, self.currency_code.clone())
    }

    /// Format for display (e.g., `"$1,234.50"`).
    #[must_use]
    pub fn display(&self) -> String {
        format_amount(self.amount, &self.currency_code)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// ISO 4217 currency codes.
///
/// The common storefront currencies get their own variant so they can carry a
/// symbol; anything else is kept verbatim in [`CurrencyCode::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
    JPY,
    Other(String),
}

impl CurrencyCode {
    /// The three-letter code.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::CAD => "CAD",
            Self::AUD => "AUD",
            Self::JPY => "JPY",
            Self::Other(code) => code,
        }
    }

    /// Symbol used as a display prefix, if the currency has one.
    #[must_use]
    pub const fn symbol(&self) -> Option<&'static str> {
        match self {
            Self::USD => Some("$"),
            Self::EUR => Some("€"),
            Self::GBP => Some("£"),
            Self::CAD => Some("CA$"),
            Self::AUD => Some("A$"),
            Self::JPY => Some("¥"),
            Self::Other(_) => None,
        }
    }

    /// Number of fraction digits shown for this currency.
    #[must_use]
    pub const fn minor_units(&self) -> u32 {
        match self {
            Self::JPY => 0,
            _ => 2,
        }
    }
}

impl From<&str> for CurrencyCode {
    fn from(code: &str) -> Self {
        match code.to_ascii_uppercase().as_str() {
            "USD" => Self::USD,
            "EUR" => Self::EUR,
            "GBP" => Self::GBP,
            "CAD" => Self::CAD,
            "AUD" => Self::AUD,
            "JPY" => Self::JPY,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for CurrencyCode {
    fn from(code: String) -> Self {
        Self::from(code.as_str())
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.code().to_string()
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Format an amount in a currency, rounding half away from zero.
#[must_use]
pub fn format_amount(amount: Decimal, currency: &CurrencyCode) -> String {
    let scale = currency.minor_units();
    let mut rounded = amount.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(scale);

    let text = rounded.abs().to_string();
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));
    let grouped = group_thousands(whole);
    let number = if fraction.is_empty() {
        grouped
    } else {
        format!("{grouped}.{fraction}")
    };
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    match currency.symbol() {
        Some(symbol) => format!("{sign}{symbol}{number}"),
        None => format!("{sign}{} {number}", currency.code()),
    }
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Whole-number percentage saved when `compare_at` is higher than `price`.
///
/// Returns `None` when there is no discount (equal, lower, or zero
/// compare-at price) or the currencies differ.
#[must_use]
pub fn discount_percent(price: &Money, compare_at: &Money) -> Option<u32> {
    if price.currency_code != compare_at.currency_code
        || compare_at.amount <= price.amount
        || compare_at.amount.is_zero()
    {
        return None;
    }
    let saved = (compare_at.amount - price.amount) / compare_at.amount * Decimal::ONE_HUNDRED;
    saved
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u32()
}

//! Money amounts using decimal arithmetic.
//!
//! Backend price fields arrive as strings and are not guaranteed to be
//! clean numerics (some carry currency symbols). [`parse_amount`] is the
//! lenient parser used everywhere a backend price string is consumed.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A monetary amount with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// Amount in the currency's standard unit (e.g., dinars, not fils).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Money {
    /// Create a new money amount.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Format the amount with two decimal places, without currency.
    #[must_use]
    pub fn amount_2dp(&self) -> String {
        format!("{:.2}", self.amount)
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    JOD,
    USD,
    EUR,
}

impl CurrencyCode {
    /// The ISO code as a string.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::JOD => "JOD",
            Self::USD => "USD",
            Self::EUR => "EUR",
        }
    }
}

/// Parse a backend price string, ignoring any non-numeric decoration.
///
/// Keeps digits and the first decimal point, so `"JD 12.50"` parses to
/// `12.50`. Returns `None` when no digits remain.
#[must_use]
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let mut cleaned = String::with_capacity(raw.len());
    let mut seen_dot = false;
    for c in raw.chars() {
        if c.is_ascii_digit() {
            cleaned.push(c);
        } else if c == '.' && !seen_dot {
            cleaned.push(c);
            seen_dot = true;
        }
    }
    if cleaned.is_empty() || cleaned == "." {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}

//! Wire types for the commerce backend API.
//!
//! Field names mirror the backend's JSON exactly. Prices arrive as strings
//! and stay strings on the wire; [`mashtal_core::parse_amount`] is used
//! wherever arithmetic is needed.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use mashtal_core::{AddressId, CategoryId, CouponId, ProductId, ServiceId, parse_amount};

use crate::i18n::Locale;

/// An ID that the backend serializes as either a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Number(i64),
    Text(String),
}

impl std::fmt::Display for RawId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// A line in the customer's server-side cart.
///
/// Immutable snapshot; the storefront never mutates cart lines, it only
/// submits them at checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    /// Price per unit, as the backend sends it (string).
    pub price: String,
    pub quantity: u32,
    pub name_en: String,
    pub name_ar: String,
}

impl CartItem {
    /// Localized display name.
    #[must_use]
    pub fn name(&self, locale: Locale) -> &str {
        match locale {
            Locale::En => &self.name_en,
            Locale::Ar => &self.name_ar,
        }
    }

    /// Price of this line (unit price times quantity), zero when the
    /// price string is unparseable.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        parse_amount(&self.price).unwrap_or_default() * Decimal::from(self.quantity)
    }
}

/// A saved customer address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    pub address_line: String,
    pub city: String,
    pub country_name: String,
}

/// Customer profile record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub default_address_id: Option<AddressId>,
}

/// A service shown on the landing page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: ServiceId,
    pub name_en: String,
    pub name_ar: String,
    pub description_en: String,
    pub description_ar: String,
    pub image: Option<String>,
}

impl Service {
    #[must_use]
    pub fn name(&self, locale: Locale) -> &str {
        match locale {
            Locale::En => &self.name_en,
            Locale::Ar => &self.name_ar,
        }
    }

    #[must_use]
    pub fn description(&self, locale: Locale) -> &str {
        match locale {
            Locale::En => &self.description_en,
            Locale::Ar => &self.description_ar,
        }
    }
}

/// A top-selling product shown on the landing page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopProduct {
    pub id: ProductId,
    pub name_en: String,
    pub name_ar: String,
    pub price: String,
    pub image: Option<String>,
}

impl TopProduct {
    #[must_use]
    pub fn name(&self, locale: Locale) -> &str {
        match locale {
            Locale::En => &self.name_en,
            Locale::Ar => &self.name_ar,
        }
    }
}

/// A product category shown on the landing page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name_en: String,
    pub name_ar: String,
    pub image: Option<String>,
}

impl Category {
    #[must_use]
    pub fn name(&self, locale: Locale) -> &str {
        match locale {
            Locale::En => &self.name_en,
            Locale::Ar => &self.name_ar,
        }
    }
}

/// A coupon the customer applied earlier in the cart flow.
///
/// Held in the client store under `appliedCoupon` until checkout succeeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppliedCoupon {
    pub id: CouponId,
    pub code: String,
    pub discount: Decimal,
}

/// One item line inside a [`CheckoutRequest`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutItem {
    pub product_id: ProductId,
    pub price: String,
    pub quantity: u32,
}

/// The checkout submission payload.
///
/// Gift fields are present only for gift orders; `coupon_id` is always
/// present and null when no coupon is applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub customer_id: String,
    pub address_id: AddressId,
    pub items: Vec<CheckoutItem>,
    pub is_gift: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gift_first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gift_last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gift_phone_number: Option<String>,
    pub coupon_id: Option<CouponId>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub delivery_cost: Decimal,
}

/// Raw checkout response body.
///
/// Both fields are required for the order to count as placed; the client
/// turns absence into an error rather than exposing the raw shape.
#[derive(Debug, Deserialize)]
pub(crate) struct CheckoutResponseBody {
    pub order_code: Option<RawId>,
    pub total: Option<f64>,
}

/// A successfully placed order, as confirmed by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutConfirmation {
    pub order_code: String,
    /// Confirmed order total, formatted to two decimal places.
    pub total: String,
}

/// Login request payload.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub language: Locale,
}

/// Raw login response body.
#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponseBody {
    pub token: Option<String>,
    pub user: Option<LoginUser>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginUser {
    pub id: Option<RawId>,
}

/// An authenticated backend session: token plus the customer id.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub user_id: String,
}

//! Checkout confirmation flow.
//!
//! The flow has three parts, each independently testable:
//!
//! - [`rules`] - the form validator, a flat rule set with a fixed focus
//!   priority order
//! - [`eligibility`] - the pure predicate behind the confirm control
//! - [`submit`] - the submission orchestrator: validate, build the
//!   request, call the backend once, persist the receipt, run post-commit
//!   steps
//!
//! [`receipt`] holds the persisted order snapshot the success page reads.

pub mod eligibility;
pub mod form;
pub mod receipt;
pub mod rules;
pub mod submit;

pub use eligibility::{EligibilityInput, confirm_disabled};
pub use form::{CheckoutForm, Field, FormErrors, PaymentMethod};
pub use receipt::OrderReceipt;
pub use rules::{YearMonth, validate};
pub use submit::{CheckoutContext, ConfirmOutcome, OrderGateway, submit};

use rust_decimal::Decimal;

use crate::commerce::{AppliedCoupon, CartItem};

/// Flat delivery cost applied to every order.
pub const DELIVERY_COST: Decimal = Decimal::TWO;

/// Totals displayed on the confirmation page and sent with the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub delivery: Decimal,
    pub total: Decimal,
}

/// Compute order totals from the cart snapshot and any applied coupon.
#[must_use]
pub fn order_totals(items: &[CartItem], coupon: Option<&AppliedCoupon>) -> OrderTotals {
    let subtotal: Decimal = items.iter().map(CartItem::line_total).sum();
    let discount = coupon.map(|c| c.discount).unwrap_or_default();
    let total = subtotal - discount + DELIVERY_COST;

    OrderTotals {
        subtotal,
        discount,
        delivery: DELIVERY_COST,
        total,
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use mashtal_core::{CouponId, ProductId};

    use super::*;

    fn item(price: &str, quantity: u32) -> CartItem {
        CartItem {
            product_id: ProductId::new(1),
            price: price.to_string(),
            quantity,
            name_en: String::new(),
            name_ar: String::new(),
        }
    }

    #[test]
    fn test_totals_without_coupon() {
        let totals = order_totals(&[item("4.25", 2), item("10.00", 1)], None);
        assert_eq!(totals.subtotal, Decimal::from_str("18.50").expect("dec"));
        assert_eq!(totals.discount, Decimal::ZERO);
        assert_eq!(totals.total, Decimal::from_str("20.50").expect("dec"));
    }

    #[test]
    fn test_totals_with_coupon() {
        let coupon = AppliedCoupon {
            id: CouponId::new(3),
            code: "SPRING10".to_string(),
            discount: Decimal::from_str("1.50").expect("dec"),
        };
        let totals = order_totals(&[item("10.00", 1)], Some(&coupon));
        assert_eq!(totals.total, Decimal::from_str("10.50").expect("dec"));
    }

    #[test]
    fn test_totals_empty_cart_is_delivery_only() {
        let totals = order_totals(&[], None);
        assert_eq!(totals.subtotal, Decimal::ZERO);
        assert_eq!(totals.total, DELIVERY_COST);
    }
}

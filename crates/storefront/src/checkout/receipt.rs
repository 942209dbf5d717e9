//! The locally persisted order receipt.
//!
//! Written once on successful checkout, read by the success page, removed
//! when the customer continues shopping. Its presence is the only signal
//! the success page uses to choose between the skeleton and order details.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::checkout::form::CheckoutForm;
use crate::commerce::{Address, AppliedCoupon, CartItem, CheckoutConfirmation, UserProfile};

/// Snapshot of a completed order, as handed to the success page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReceipt {
    pub order_id: String,
    pub items: Vec<ReceiptItem>,
    /// Confirmed total, two decimal places.
    pub total: String,
    /// RFC 3339 order timestamp.
    pub order_date: String,
    pub coupon_applied: bool,
    #[serde(with = "rust_decimal::serde::float")]
    pub coupon_discount: Decimal,
    pub billing: BillingSnapshot,
    pub gift: Option<GiftSnapshot>,
}

/// One ordered item, with both localized names so the success page can
/// render either locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptItem {
    pub id: String,
    pub name_ar: String,
    pub name_en: String,
    pub quantity: u32,
    pub price: String,
}

/// Name, phone, and address the order was billed to. For gift orders the
/// name and phone are the recipient's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingSnapshot {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub address_line: String,
    pub city: String,
    pub country: String,
}

/// Gift recipient details, present only for gift orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftSnapshot {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
}

/// Assemble the receipt for a confirmed order.
#[must_use]
pub fn build_receipt(
    confirmation: &CheckoutConfirmation,
    items: &[CartItem],
    form: &CheckoutForm,
    profile: &UserProfile,
    address: &Address,
    coupon: Option<&AppliedCoupon>,
    placed_at: DateTime<Utc>,
) -> OrderReceipt {
    let (first_name, last_name, phone_number) = if form.is_gift {
        (
            form.gift_first_name.clone(),
            form.gift_last_name.clone(),
            form.gift_phone_number.clone(),
        )
    } else {
        (
            profile.first_name.clone(),
            profile.last_name.clone(),
            profile.phone_number.clone(),
        )
    };

    OrderReceipt {
        order_id: confirmation.order_code.clone(),
        items: items
            .iter()
            .map(|item| ReceiptItem {
                id: item.product_id.to_string(),
                name_ar: item.name_ar.clone(),
                name_en: item.name_en.clone(),
                quantity: item.quantity,
                price: item.price.clone(),
            })
            .collect(),
        total: confirmation.total.clone(),
        order_date: placed_at.to_rfc3339(),
        coupon_applied: coupon.is_some(),
        coupon_discount: coupon.map(|c| c.discount).unwrap_or_default(),
        billing: BillingSnapshot {
            first_name,
            last_name,
            phone_number,
            address_line: address.address_line.clone(),
            city: address.city.clone(),
            country: address.country_name.clone(),
        },
        gift: form.is_gift.then(|| GiftSnapshot {
            first_name: form.gift_first_name.clone(),
            last_name: form.gift_last_name.clone(),
            phone_number: form.gift_phone_number.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use mashtal_core::{AddressId, CouponId, ProductId};

    use super::*;

    fn sample_items() -> Vec<CartItem> {
        vec![CartItem {
            product_id: ProductId::new(12),
            price: "4.25".to_string(),
            quantity: 2,
            name_en: "Mint seedling".to_string(),
            name_ar: "شتلة نعنع".to_string(),
        }]
    }

    fn sample_profile() -> UserProfile {
        UserProfile {
            first_name: "Rana".to_string(),
            last_name: "Haddad".to_string(),
            phone_number: "962790000001".to_string(),
            default_address_id: Some(AddressId::new(4)),
        }
    }

    fn sample_address() -> Address {
        Address {
            id: AddressId::new(4),
            address_line: "12 Rainbow St".to_string(),
            city: "Amman".to_string(),
            country_name: "Jordan".to_string(),
        }
    }

    fn confirmation() -> CheckoutConfirmation {
        CheckoutConfirmation {
            order_code: "1001".to_string(),
            total: "45.50".to_string(),
        }
    }

    #[test]
    fn test_receipt_billing_uses_profile_for_regular_orders() {
        let receipt = build_receipt(
            &confirmation(),
            &sample_items(),
            &CheckoutForm::default(),
            &sample_profile(),
            &sample_address(),
            None,
            Utc::now(),
        );

        assert_eq!(receipt.order_id, "1001");
        assert_eq!(receipt.total, "45.50");
        assert_eq!(receipt.billing.first_name, "Rana");
        assert_eq!(receipt.billing.country, "Jordan");
        assert!(!receipt.coupon_applied);
        assert_eq!(receipt.gift, None);
        assert_eq!(receipt.items[0].id, "12");
        assert_eq!(receipt.items[0].name_ar, "شتلة نعنع");
    }

    #[test]
    fn test_receipt_billing_uses_recipient_for_gift_orders() {
        let form = CheckoutForm {
            is_gift: true,
            gift_first_name: "Omar".to_string(),
            gift_last_name: "Khalil".to_string(),
            gift_phone_number: "962791234567".to_string(),
            ..CheckoutForm::default()
        };
        let receipt = build_receipt(
            &confirmation(),
            &sample_items(),
            &form,
            &sample_profile(),
            &sample_address(),
            None,
            Utc::now(),
        );

        assert_eq!(receipt.billing.first_name, "Omar");
        assert_eq!(receipt.billing.phone_number, "962791234567");
        let gift = receipt.gift.expect("gift snapshot");
        assert_eq!(gift.last_name, "Khalil");
    }

    #[test]
    fn test_receipt_records_coupon() {
        let coupon = AppliedCoupon {
            id: CouponId::new(3),
            code: "SPRING10".to_string(),
            discount: Decimal::from_str("1.50").expect("dec"),
        };
        let receipt = build_receipt(
            &confirmation(),
            &sample_items(),
            &CheckoutForm::default(),
            &sample_profile(),
            &sample_address(),
            Some(&coupon),
            Utc::now(),
        );

        assert!(receipt.coupon_applied);
        assert_eq!(receipt.coupon_discount, coupon.discount);
    }

    #[test]
    fn test_receipt_serialized_key_shape() {
        let receipt = build_receipt(
            &confirmation(),
            &sample_items(),
            &CheckoutForm::default(),
            &sample_profile(),
            &sample_address(),
            None,
            Utc::now(),
        );
        let json = serde_json::to_value(&receipt).expect("serialize");

        assert!(json.get("orderId").is_some());
        assert!(json.get("orderDate").is_some());
        assert!(json.get("couponApplied").is_some());
        assert!(json["items"][0].get("name_ar").is_some());
        assert!(json["billing"].get("first_name").is_some());
        assert!(json["gift"].is_null());
    }
}

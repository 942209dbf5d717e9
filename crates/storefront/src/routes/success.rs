//! Order success page route handlers.
//!
//! The page keys entirely off the persisted receipt: present means order
//! details, absent (or unreadable) means the loading skeleton. The receipt
//! is only removed when the customer continues shopping.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::Path,
    response::{IntoResponse, Redirect, Response},
};
use chrono::{DateTime, Utc};
use tower_sessions::Session;
use tracing::instrument;

use mashtal_core::parse_amount;

use crate::checkout::OrderReceipt;
use crate::filters;
use crate::i18n::{Locale, Messages};
use crate::models::session_keys;

// =============================================================================
// View Types
// =============================================================================

/// One receipt line, localized.
pub struct ReceiptItemView {
    pub name: String,
    pub quantity: u32,
    pub price: String,
}

/// The receipt as rendered on the success page.
pub struct ReceiptView {
    pub order_id: String,
    pub order_date: String,
    pub items: Vec<ReceiptItemView>,
    pub total: String,
}

fn format_amount(amount: rust_decimal::Decimal, locale: Locale) -> String {
    match locale {
        Locale::En => format!("{amount:.2} JOD"),
        Locale::Ar => format!("{amount:.2} د.أ"),
    }
}

impl ReceiptView {
    fn build(receipt: &OrderReceipt, locale: Locale) -> Self {
        let order_date = receipt
            .order_date
            .parse::<DateTime<Utc>>()
            .map_or_else(
                |_| receipt.order_date.clone(),
                |date| match locale {
                    Locale::En => date.format("%B %e, %Y").to_string(),
                    Locale::Ar => date.format("%Y/%m/%d").to_string(),
                },
            );

        Self {
            order_id: receipt.order_id.clone(),
            order_date,
            items: receipt
                .items
                .iter()
                .map(|item| ReceiptItemView {
                    name: match locale {
                        Locale::En => item.name_en.clone(),
                        Locale::Ar => item.name_ar.clone(),
                    },
                    quantity: item.quantity,
                    price: parse_amount(&item.price).map_or_else(
                        || item.price.clone(),
                        |amount| format_amount(amount, locale),
                    ),
                })
                .collect(),
            total: parse_amount(&receipt.total).map_or_else(
                || receipt.total.clone(),
                |amount| format_amount(amount, locale),
            ),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Success page template with order details.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/success.html")]
pub struct SuccessTemplate {
    pub locale: Locale,
    pub t: &'static Messages,
    pub receipt: ReceiptView,
}

/// Skeleton shown while there is no receipt to render.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/success_skeleton.html")]
pub struct SuccessSkeletonTemplate {
    pub locale: Locale,
    pub t: &'static Messages,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the success page.
///
/// Reads the receipt without consuming it; a reload still shows the order.
#[instrument(skip(session))]
pub async fn show(Path(locale): Path<Locale>, session: Session) -> Response {
    let t = Messages::for_locale(locale);

    let receipt = match session_keys::LAST_ORDER.load(&session).await {
        Ok(receipt) => receipt,
        Err(e) => {
            tracing::error!("Failed to read last order: {e}");
            None
        }
    };

    match receipt {
        Some(receipt) => SuccessTemplate {
            locale,
            t,
            receipt: ReceiptView::build(&receipt, locale),
        }
        .into_response(),
        None => SuccessSkeletonTemplate { locale, t }.into_response(),
    }
}

/// Continue shopping: drop the receipt and go back to the landing page.
#[instrument(skip(session))]
pub async fn continue_shopping(Path(locale): Path<Locale>, session: Session) -> Response {
    if let Err(e) = session_keys::LAST_ORDER.clear(&session).await {
        tracing::error!("Failed to clear last order: {e}");
    }
    Redirect::to(&format!("/{locale}")).into_response()
}

#[cfg(test)]
mod tests {
    use crate::checkout::receipt::{BillingSnapshot, ReceiptItem};

    use super::*;

    fn receipt() -> OrderReceipt {
        OrderReceipt {
            order_id: "1001".to_string(),
            items: vec![ReceiptItem {
                id: "12".to_string(),
                name_ar: "شتلة تين".to_string(),
                name_en: "Fig sapling".to_string(),
                quantity: 2,
                price: "21.75".to_string(),
            }],
            total: "45.50".to_string(),
            order_date: "2026-08-06T10:15:00+00:00".to_string(),
            coupon_applied: false,
            coupon_discount: rust_decimal::Decimal::ZERO,
            billing: BillingSnapshot {
                first_name: "Rana".to_string(),
                last_name: "Haddad".to_string(),
                phone_number: "962790000001".to_string(),
                address_line: "12 Rainbow St".to_string(),
                city: "Amman".to_string(),
                country: "Jordan".to_string(),
            },
            gift: None,
        }
    }

    #[test]
    fn test_receipt_view_localizes_names_and_prices() {
        let view = ReceiptView::build(&receipt(), Locale::En);
        assert_eq!(view.items[0].name, "Fig sapling");
        assert_eq!(view.items[0].price, "21.75 JOD");
        assert_eq!(view.total, "45.50 JOD");
        assert_eq!(view.order_date, "August  6, 2026");

        let view = ReceiptView::build(&receipt(), Locale::Ar);
        assert_eq!(view.items[0].name, "شتلة تين");
        assert_eq!(view.order_date, "2026/08/06");
    }

    #[test]
    fn test_receipt_view_keeps_unparseable_date() {
        let mut damaged = receipt();
        damaged.order_date = "yesterday".to_string();
        let view = ReceiptView::build(&damaged, Locale::En);
        assert_eq!(view.order_date, "yesterday");
    }
}

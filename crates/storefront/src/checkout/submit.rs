//! The submission orchestrator.
//!
//! One sequential chain per confirm: preconditions, full validation,
//! re-entrancy guard, request build, a single backend checkout call,
//! receipt persistence, then post-commit steps. The guard is released in a
//! final step on every exit path.

use std::future::Future;

use chrono::Utc;
use thiserror::Error;
use tracing::instrument;

use mashtal_core::AddressId;

use crate::checkout::form::{CheckoutForm, FormErrors};
use crate::checkout::receipt::build_receipt;
use crate::checkout::rules::{YearMonth, validate};
use crate::checkout::{DELIVERY_COST, OrderTotals, order_totals};
use crate::commerce::{
    Address, AppliedCoupon, CartItem, CheckoutConfirmation, CheckoutItem, CheckoutRequest,
    CommerceClient, CommerceError, UserProfile,
};
use crate::i18n::{Locale, Messages};
use crate::models::session_keys as keys;
use crate::storage::{KeyValueStore, StoreError};

/// The backend operations the orchestrator needs.
///
/// Implemented by [`CommerceClient`]; tests substitute a scripted double.
pub trait OrderGateway: Send + Sync {
    /// Submit the checkout request. Called exactly once per confirm.
    fn place_order(
        &self,
        request: &CheckoutRequest,
    ) -> impl Future<Output = Result<CheckoutConfirmation, CommerceError>> + Send;

    /// Clear the customer's remote cart after a placed order.
    fn clear_cart(
        &self,
        user_id: &str,
        locale: Locale,
    ) -> impl Future<Output = Result<(), CommerceError>> + Send;
}

impl OrderGateway for CommerceClient {
    async fn place_order(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutConfirmation, CommerceError> {
        self.checkout(request).await
    }

    async fn clear_cart(&self, user_id: &str, locale: Locale) -> Result<(), CommerceError> {
        Self::clear_cart(self, user_id, locale).await
    }
}

/// Order-entry state loaded for the confirmation page.
#[derive(Debug, Clone, Copy)]
pub struct CheckoutContext<'a> {
    pub locale: Locale,
    pub items: &'a [CartItem],
    pub addresses: &'a [Address],
    pub profile: &'a UserProfile,
}

impl CheckoutContext<'_> {
    /// The address selected as shipping/billing target, if it resolves.
    #[must_use]
    pub fn default_address(&self) -> Option<&Address> {
        let id = self.profile.default_address_id?;
        self.addresses.iter().find(|address| address.id == id)
    }
}

/// What the confirm attempt produced, for the handler to render or follow.
#[derive(Debug)]
pub enum ConfirmOutcome {
    /// Order placed and receipt persisted; navigate to the success page.
    Completed,
    /// No usable default address; nothing was submitted.
    AddressIncomplete { message: &'static str },
    /// Validation failed; all errors surfaced, none submitted.
    Invalid { errors: FormErrors },
    /// Submission failed; one generic message, no navigation.
    Failed { message: &'static str },
}

#[derive(Debug, Error)]
enum SubmitError {
    #[error("no user id in the client store")]
    MissingUserId,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Commerce(#[from] CommerceError),
}

/// Run the confirm sequence.
///
/// The processing flag is set before the backend call and cleared in a
/// final step whatever happens in between.
#[instrument(skip_all, fields(locale = %ctx.locale))]
pub async fn submit<G: OrderGateway, S: KeyValueStore>(
    gateway: &G,
    store: &S,
    ctx: &CheckoutContext<'_>,
    form: &CheckoutForm,
    now: YearMonth,
    messages: &'static Messages,
) -> ConfirmOutcome {
    // Preconditions: a default address with a usable address line
    let Some(address) = ctx
        .default_address()
        .filter(|address| !address.address_line.trim().is_empty())
    else {
        return ConfirmOutcome::AddressIncomplete {
            message: messages.address_incomplete,
        };
    };
    let address = address.clone();

    // Authoritative validation
    let errors = validate(form, now, messages);
    if !errors.is_empty() {
        return ConfirmOutcome::Invalid { errors };
    }

    // Re-entrancy guard
    if let Err(e) = keys::CHECKOUT_PROCESSING.save(store, &true).await {
        tracing::error!("Failed to set processing flag: {e}");
        return ConfirmOutcome::Failed {
            message: messages.checkout_failed,
        };
    }

    let result = place_and_record(gateway, store, ctx, form, &address).await;

    // Final step: release the guard on every path
    if let Err(e) = keys::CHECKOUT_PROCESSING.clear(store).await {
        tracing::error!("Failed to clear processing flag: {e}");
    }

    match result {
        Ok(()) => ConfirmOutcome::Completed,
        Err(e) => {
            tracing::error!("Checkout failed: {e}");
            ConfirmOutcome::Failed {
                message: messages.checkout_failed,
            }
        }
    }
}

/// Steps 4-6: read store state, build the request, call the backend once,
/// persist the receipt, run post-commit steps.
async fn place_and_record<G: OrderGateway, S: KeyValueStore>(
    gateway: &G,
    store: &S,
    ctx: &CheckoutContext<'_>,
    form: &CheckoutForm,
    address: &Address,
) -> Result<(), SubmitError> {
    let user_id = keys::USER_ID
        .load(store)
        .await?
        .ok_or(SubmitError::MissingUserId)?;
    let coupon = keys::APPLIED_COUPON.load(store).await?;

    let totals = order_totals(ctx.items, coupon.as_ref());
    let request = build_request(&user_id, address.id, ctx.items, form, coupon.as_ref(), &totals);

    let confirmation = gateway.place_order(&request).await?;

    let receipt = build_receipt(
        &confirmation,
        ctx.items,
        form,
        ctx.profile,
        address,
        coupon.as_ref(),
        Utc::now(),
    );
    keys::LAST_ORDER.save(store, &receipt).await?;

    run_post_commit_steps(gateway, store, ctx.locale, &user_id, coupon.is_some()).await;

    Ok(())
}

/// Build the checkout payload. Gift fields ride along only in gift mode;
/// the coupon id is null unless a coupon record is present.
#[must_use]
pub fn build_request(
    customer_id: &str,
    address_id: AddressId,
    items: &[CartItem],
    form: &CheckoutForm,
    coupon: Option<&AppliedCoupon>,
    totals: &OrderTotals,
) -> CheckoutRequest {
    CheckoutRequest {
        customer_id: customer_id.to_string(),
        address_id,
        items: items
            .iter()
            .map(|item| CheckoutItem {
                product_id: item.product_id,
                price: item.price.clone(),
                quantity: item.quantity,
            })
            .collect(),
        is_gift: form.is_gift,
        gift_first_name: form.is_gift.then(|| form.gift_first_name.clone()),
        gift_last_name: form.is_gift.then(|| form.gift_last_name.clone()),
        gift_phone_number: form.is_gift.then(|| form.gift_phone_number.clone()),
        coupon_id: coupon.map(|c| c.id),
        total: totals.total,
        delivery_cost: DELIVERY_COST,
    }
}

/// Post-commit side effects of a placed order. Each step is independent,
/// retried once, and logged on failure; none of them fails the order.
async fn run_post_commit_steps<G: OrderGateway, S: KeyValueStore>(
    gateway: &G,
    store: &S,
    locale: Locale,
    user_id: &str,
    coupon_applied: bool,
) {
    if coupon_applied {
        with_retry("clear applied coupon", || keys::APPLIED_COUPON.clear(store)).await;
    }

    with_retry("clear remote cart", || gateway.clear_cart(user_id, locale)).await;
}

/// Run a post-commit step, retrying once on failure.
async fn with_retry<F, Fut, E>(step: &str, mut operation: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: std::fmt::Display,
{
    match operation().await {
        Ok(()) => {}
        Err(e) => {
            tracing::warn!("Post-commit step '{step}' failed: {e}; retrying once");
            if let Err(e) = operation().await {
                tracing::error!("Post-commit step '{step}' failed after retry: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use rust_decimal::Decimal;

    use mashtal_core::{CouponId, ProductId};

    use crate::checkout::form::{Field, PaymentMethod};
    use crate::storage::memory::MemoryStore;

    use super::*;

    /// Scripted gateway double with call counters.
    #[derive(Default)]
    struct MockGateway {
        fail_checkout: bool,
        fail_clear_cart: bool,
        checkout_calls: AtomicUsize,
        clear_cart_calls: AtomicUsize,
    }

    impl OrderGateway for MockGateway {
        async fn place_order(
            &self,
            _request: &CheckoutRequest,
        ) -> Result<CheckoutConfirmation, CommerceError> {
            self.checkout_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_checkout {
                return Err(CommerceError::Api {
                    status: 500,
                    message: "boom".to_string(),
                });
            }
            Ok(CheckoutConfirmation {
                order_code: "1001".to_string(),
                total: "45.50".to_string(),
            })
        }

        async fn clear_cart(&self, _user_id: &str, _locale: Locale) -> Result<(), CommerceError> {
            self.clear_cart_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_clear_cart {
                return Err(CommerceError::Api {
                    status: 500,
                    message: "boom".to_string(),
                });
            }
            Ok(())
        }
    }

    fn items() -> Vec<CartItem> {
        vec![CartItem {
            product_id: ProductId::new(12),
            price: "21.75".to_string(),
            quantity: 2,
            name_en: "Fig sapling".to_string(),
            name_ar: "شتلة تين".to_string(),
        }]
    }

    fn addresses() -> Vec<Address> {
        vec![Address {
            id: mashtal_core::AddressId::new(4),
            address_line: "12 Rainbow St".to_string(),
            city: "Amman".to_string(),
            country_name: "Jordan".to_string(),
        }]
    }

    fn profile() -> UserProfile {
        UserProfile {
            first_name: "Rana".to_string(),
            last_name: "Haddad".to_string(),
            phone_number: "962790000001".to_string(),
            default_address_id: Some(mashtal_core::AddressId::new(4)),
        }
    }

    fn messages() -> &'static Messages {
        Messages::for_locale(Locale::En)
    }

    const NOW: YearMonth = YearMonth::new(2025, 6);

    async fn store_with_user() -> MemoryStore {
        let store = MemoryStore::new();
        keys::USER_ID
            .save(&store, &"u-42".to_string())
            .await
            .expect("seed user id");
        store
    }

    #[tokio::test]
    async fn test_successful_cash_checkout() {
        let gateway = MockGateway::default();
        let store = store_with_user().await;
        let items = items();
        let addresses = addresses();
        let profile = profile();
        let ctx = CheckoutContext {
            locale: Locale::En,
            items: &items,
            addresses: &addresses,
            profile: &profile,
        };

        let outcome = submit(
            &gateway,
            &store,
            &ctx,
            &CheckoutForm::default(),
            NOW,
            messages(),
        )
        .await;

        assert!(matches!(outcome, ConfirmOutcome::Completed));
        assert_eq!(gateway.checkout_calls.load(Ordering::SeqCst), 1);
        assert_eq!(gateway.clear_cart_calls.load(Ordering::SeqCst), 1);

        let receipt = keys::LAST_ORDER
            .load(&store)
            .await
            .expect("load receipt")
            .expect("receipt persisted");
        assert_eq!(receipt.order_id, "1001");
        assert_eq!(receipt.total, "45.50");

        // Guard released
        assert!(!store.contains(keys::CHECKOUT_PROCESSING.name()));
    }

    #[tokio::test]
    async fn test_successful_checkout_removes_applied_coupon() {
        let gateway = MockGateway::default();
        let store = store_with_user().await;
        keys::APPLIED_COUPON
            .save(
                &store,
                &AppliedCoupon {
                    id: CouponId::new(3),
                    code: "SPRING10".to_string(),
                    discount: Decimal::from_str("1.50").expect("dec"),
                },
            )
            .await
            .expect("seed coupon");

        let items = items();
        let addresses = addresses();
        let profile = profile();
        let ctx = CheckoutContext {
            locale: Locale::Ar,
            items: &items,
            addresses: &addresses,
            profile: &profile,
        };

        let outcome = submit(
            &gateway,
            &store,
            &ctx,
            &CheckoutForm::default(),
            NOW,
            messages(),
        )
        .await;

        assert!(matches!(outcome, ConfirmOutcome::Completed));
        assert!(!store.contains(keys::APPLIED_COUPON.name()));

        let receipt = keys::LAST_ORDER
            .load(&store)
            .await
            .expect("load receipt")
            .expect("receipt persisted");
        assert!(receipt.coupon_applied);
    }

    #[tokio::test]
    async fn test_missing_default_address_skips_network() {
        let gateway = MockGateway::default();
        let store = store_with_user().await;
        let items = items();
        let addresses: Vec<Address> = Vec::new();
        let profile = profile();
        let ctx = CheckoutContext {
            locale: Locale::En,
            items: &items,
            addresses: &addresses,
            profile: &profile,
        };

        let outcome = submit(
            &gateway,
            &store,
            &ctx,
            &CheckoutForm::default(),
            NOW,
            messages(),
        )
        .await;

        assert!(matches!(
            outcome,
            ConfirmOutcome::AddressIncomplete { message } if message == messages().address_incomplete
        ));
        assert_eq!(gateway.checkout_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_blank_address_line_is_incomplete() {
        let gateway = MockGateway::default();
        let store = store_with_user().await;
        let items = items();
        let addresses = vec![Address {
            address_line: "   ".to_string(),
            ..addresses()[0].clone()
        }];
        let profile = profile();
        let ctx = CheckoutContext {
            locale: Locale::En,
            items: &items,
            addresses: &addresses,
            profile: &profile,
        };

        let outcome = submit(
            &gateway,
            &store,
            &ctx,
            &CheckoutForm::default(),
            NOW,
            messages(),
        )
        .await;

        assert!(matches!(outcome, ConfirmOutcome::AddressIncomplete { .. }));
        assert_eq!(gateway.checkout_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_validation_errors_abort_before_guard() {
        let gateway = MockGateway::default();
        let store = store_with_user().await;
        let items = items();
        let addresses = addresses();
        let profile = profile();
        let ctx = CheckoutContext {
            locale: Locale::En,
            items: &items,
            addresses: &addresses,
            profile: &profile,
        };
        let form = CheckoutForm {
            payment_method: PaymentMethod::CreditCard,
            ..CheckoutForm::default()
        };

        let outcome = submit(&gateway, &store, &ctx, &form, NOW, messages()).await;

        let ConfirmOutcome::Invalid { errors } = outcome else {
            panic!("expected Invalid outcome");
        };
        assert_eq!(errors.first_focus(), Some(Field::CardNumber));
        assert_eq!(gateway.checkout_calls.load(Ordering::SeqCst), 0);
        assert!(!store.contains(keys::CHECKOUT_PROCESSING.name()));
    }

    #[tokio::test]
    async fn test_missing_user_id_fails_generically() {
        let gateway = MockGateway::default();
        let store = MemoryStore::new();
        let items = items();
        let addresses = addresses();
        let profile = profile();
        let ctx = CheckoutContext {
            locale: Locale::En,
            items: &items,
            addresses: &addresses,
            profile: &profile,
        };

        let outcome = submit(
            &gateway,
            &store,
            &ctx,
            &CheckoutForm::default(),
            NOW,
            messages(),
        )
        .await;

        assert!(matches!(
            outcome,
            ConfirmOutcome::Failed { message } if message == messages().checkout_failed
        ));
        assert_eq!(gateway.checkout_calls.load(Ordering::SeqCst), 0);
        assert!(!store.contains(keys::CHECKOUT_PROCESSING.name()));
    }

    #[tokio::test]
    async fn test_backend_failure_releases_guard_and_keeps_coupon() {
        let gateway = MockGateway {
            fail_checkout: true,
            ..MockGateway::default()
        };
        let store = store_with_user().await;
        keys::APPLIED_COUPON
            .save(
                &store,
                &AppliedCoupon {
                    id: CouponId::new(3),
                    code: "SPRING10".to_string(),
                    discount: Decimal::ONE,
                },
            )
            .await
            .expect("seed coupon");

        let items = items();
        let addresses = addresses();
        let profile = profile();
        let ctx = CheckoutContext {
            locale: Locale::En,
            items: &items,
            addresses: &addresses,
            profile: &profile,
        };

        let outcome = submit(
            &gateway,
            &store,
            &ctx,
            &CheckoutForm::default(),
            NOW,
            messages(),
        )
        .await;

        assert!(matches!(outcome, ConfirmOutcome::Failed { .. }));
        assert_eq!(gateway.checkout_calls.load(Ordering::SeqCst), 1);
        // No receipt, coupon untouched, guard released
        assert!(!store.contains(keys::LAST_ORDER.name()));
        assert!(store.contains(keys::APPLIED_COUPON.name()));
        assert!(!store.contains(keys::CHECKOUT_PROCESSING.name()));
        assert_eq!(gateway.clear_cart_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cart_clear_failure_does_not_fail_the_order() {
        let gateway = MockGateway {
            fail_clear_cart: true,
            ..MockGateway::default()
        };
        let store = store_with_user().await;
        let items = items();
        let addresses = addresses();
        let profile = profile();
        let ctx = CheckoutContext {
            locale: Locale::En,
            items: &items,
            addresses: &addresses,
            profile: &profile,
        };

        let outcome = submit(
            &gateway,
            &store,
            &ctx,
            &CheckoutForm::default(),
            NOW,
            messages(),
        )
        .await;

        assert!(matches!(outcome, ConfirmOutcome::Completed));
        // Retried once, then gave up without undoing the order
        assert_eq!(gateway.clear_cart_calls.load(Ordering::SeqCst), 2);
        assert!(store.contains(keys::LAST_ORDER.name()));
    }

    #[test]
    fn test_build_request_gift_and_coupon_shape() {
        let items = items();
        let totals = order_totals(&items, None);
        let form = CheckoutForm {
            is_gift: true,
            gift_first_name: "Omar".to_string(),
            gift_last_name: "Khalil".to_string(),
            gift_phone_number: "962791234567".to_string(),
            ..CheckoutForm::default()
        };

        let request = build_request(
            "u-42",
            mashtal_core::AddressId::new(4),
            &items,
            &form,
            None,
            &totals,
        );

        assert_eq!(request.customer_id, "u-42");
        assert!(request.is_gift);
        assert_eq!(request.gift_first_name.as_deref(), Some("Omar"));
        assert_eq!(request.coupon_id, None);
        assert_eq!(request.delivery_cost, DELIVERY_COST);
        assert_eq!(request.items.len(), 1);
        assert_eq!(request.items[0].price, "21.75");

        // Non-gift orders carry no gift fields at all
        let request = build_request(
            "u-42",
            mashtal_core::AddressId::new(4),
            &items,
            &CheckoutForm::default(),
            None,
            &totals,
        );
        assert_eq!(request.gift_first_name, None);
    }
}

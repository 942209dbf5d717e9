//! Checkout confirmation route handlers.
//!
//! GET renders the order-entry form with the eligibility-gated confirm
//! control; POST runs the submission orchestrator and either redirects to
//! the success page or re-renders the form with every error surfaced and
//! the first failing field focused.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use mashtal_core::parse_amount;

use crate::checkout::{
    CheckoutContext, CheckoutForm, ConfirmOutcome, EligibilityInput, Field, FormErrors,
    OrderTotals, YearMonth, confirm_disabled, order_totals, submit,
};
use crate::commerce::{Address, AppliedCoupon, CartItem, UserProfile};
use crate::error::Result;
use crate::filters;
use crate::i18n::{Locale, Messages};
use crate::middleware::RequireUser;
use crate::models::session_keys;
use crate::state::AppState;

// =============================================================================
// View Types
// =============================================================================

/// Cart line display data.
pub struct CartItemView {
    pub name: String,
    pub quantity: u32,
    pub price: String,
    pub line_total: String,
}

/// Shipping address display data.
pub struct AddressView {
    pub address_line: String,
    pub city: String,
    pub country: String,
}

/// Order totals display data.
pub struct TotalsView {
    pub subtotal: String,
    pub discount: String,
    pub delivery: String,
    pub total: String,
    pub has_discount: bool,
}

/// Per-field error messages for the template, plus the two non-field
/// slots (address precondition, generic failure).
#[derive(Default)]
pub struct FieldErrorsView {
    pub address: Option<&'static str>,
    pub general: Option<&'static str>,
    pub gift_first_name: Option<&'static str>,
    pub gift_last_name: Option<&'static str>,
    pub gift_phone: Option<&'static str>,
    pub card_number: Option<&'static str>,
    pub card_holder: Option<&'static str>,
    pub expiry: Option<&'static str>,
    pub cvv: Option<&'static str>,
}

impl FieldErrorsView {
    fn from_form_errors(errors: &FormErrors) -> Self {
        Self {
            address: None,
            general: None,
            gift_first_name: errors.get(Field::GiftFirstName),
            gift_last_name: errors.get(Field::GiftLastName),
            gift_phone: errors.get(Field::GiftPhone),
            card_number: errors.get(Field::CardNumber),
            card_holder: errors.get(Field::CardHolder),
            expiry: errors.get(Field::Expiry),
            cvv: errors.get(Field::Cvv),
        }
    }
}

fn format_amount(amount: rust_decimal::Decimal, locale: Locale) -> String {
    match locale {
        Locale::En => format!("{amount:.2} JOD"),
        Locale::Ar => format!("{amount:.2} د.أ"),
    }
}

impl TotalsView {
    fn build(totals: &OrderTotals, locale: Locale) -> Self {
        Self {
            subtotal: format_amount(totals.subtotal, locale),
            discount: format_amount(totals.discount, locale),
            delivery: format_amount(totals.delivery, locale),
            total: format_amount(totals.total, locale),
            has_discount: !totals.discount.is_zero(),
        }
    }
}

impl CartItemView {
    fn build(item: &CartItem, locale: Locale) -> Self {
        let unit = parse_amount(&item.price).unwrap_or_default();
        Self {
            name: item.name(locale).to_string(),
            quantity: item.quantity,
            price: format_amount(unit, locale),
            line_total: format_amount(item.line_total(), locale),
        }
    }
}

// =============================================================================
// Template
// =============================================================================

/// Order confirmation page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/confirm.html")]
pub struct ConfirmTemplate {
    pub locale: Locale,
    pub t: &'static Messages,
    pub items: Vec<CartItemView>,
    pub address: Option<AddressView>,
    pub totals: TotalsView,
    pub form: CheckoutForm,
    pub errors: FieldErrorsView,
    /// Input name of the field to autofocus, empty for none.
    pub focus: &'static str,
    pub disabled: bool,
    /// A submission is in flight; changes the confirm label.
    pub processing: bool,
}

// =============================================================================
// Handlers
// =============================================================================

/// Everything the confirmation page needs from the backend.
struct OrderEntry {
    items: Vec<CartItem>,
    addresses: Vec<Address>,
    profile: UserProfile,
}

async fn load_order_entry(state: &AppState, user_id: &str, locale: Locale) -> Result<OrderEntry> {
    let commerce = state.commerce();
    let items = commerce.get_cart(user_id, locale).await?;
    let addresses = commerce.get_addresses(user_id).await?;
    let profile = commerce.get_profile(user_id).await?;
    Ok(OrderEntry {
        items,
        addresses,
        profile,
    })
}

/// Coupon for display purposes: a corrupt record renders as no coupon,
/// the orchestrator will still surface it as a failure on submit.
async fn load_coupon_lenient(session: &Session) -> Option<AppliedCoupon> {
    match session_keys::APPLIED_COUPON.load(session).await {
        Ok(coupon) => coupon,
        Err(e) => {
            tracing::warn!("Ignoring unreadable coupon record: {e}");
            None
        }
    }
}

fn render_confirm(
    locale: Locale,
    entry: &OrderEntry,
    coupon: Option<&AppliedCoupon>,
    form: CheckoutForm,
    errors: FieldErrorsView,
    focus: &'static str,
    processing: bool,
) -> ConfirmTemplate {
    let default_address = entry.profile.default_address_id.and_then(|id| {
        entry
            .addresses
            .iter()
            .find(|address| address.id == id)
    });

    let input = EligibilityInput {
        form: &form,
        processing,
        cart_empty: entry.items.is_empty(),
        has_default_address: default_address.is_some(),
    };
    let disabled = confirm_disabled(&input);

    ConfirmTemplate {
        locale,
        t: Messages::for_locale(locale),
        items: entry
            .items
            .iter()
            .map(|item| CartItemView::build(item, locale))
            .collect(),
        address: default_address.map(|address| AddressView {
            address_line: address.address_line.clone(),
            city: address.city.clone(),
            country: address.country_name.clone(),
        }),
        totals: TotalsView::build(&order_totals(&entry.items, coupon), locale),
        form,
        errors,
        focus,
        disabled,
        processing,
    }
}

/// Display the order confirmation page.
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    Path(locale): Path<Locale>,
    RequireUser(user): RequireUser,
    session: Session,
) -> Result<Response> {
    let entry = load_order_entry(&state, &user.user_id, locale).await?;
    let coupon = load_coupon_lenient(&session).await;
    let processing = session_keys::CHECKOUT_PROCESSING
        .load(&session)
        .await
        .ok()
        .flatten()
        .unwrap_or(false);

    Ok(render_confirm(
        locale,
        &entry,
        coupon.as_ref(),
        CheckoutForm::default(),
        FieldErrorsView::default(),
        "",
        processing,
    )
    .into_response())
}

/// Handle the confirm action.
///
/// Success is the only path that navigates; every failure re-renders the
/// form in place.
#[instrument(skip(state, session, user, form))]
pub async fn confirm(
    State(state): State<AppState>,
    Path(locale): Path<Locale>,
    RequireUser(user): RequireUser,
    session: Session,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let entry = load_order_entry(&state, &user.user_id, locale).await?;
    let ctx = CheckoutContext {
        locale,
        items: &entry.items,
        addresses: &entry.addresses,
        profile: &entry.profile,
    };

    let outcome = submit(
        state.commerce(),
        &session,
        &ctx,
        &form,
        YearMonth::current(),
        Messages::for_locale(locale),
    )
    .await;

    match outcome {
        ConfirmOutcome::Completed => {
            Ok(Redirect::to(&format!("/{locale}/success")).into_response())
        }
        ConfirmOutcome::AddressIncomplete { message } => {
            let coupon = load_coupon_lenient(&session).await;
            let errors = FieldErrorsView {
                address: Some(message),
                ..FieldErrorsView::default()
            };
            Ok(render_confirm(locale, &entry, coupon.as_ref(), form, errors, "", false)
                .into_response())
        }
        ConfirmOutcome::Invalid { errors } => {
            let coupon = load_coupon_lenient(&session).await;
            let focus = errors.first_focus().map_or("", Field::input_name);
            let view = FieldErrorsView::from_form_errors(&errors);
            Ok(render_confirm(locale, &entry, coupon.as_ref(), form, view, focus, false)
                .into_response())
        }
        ConfirmOutcome::Failed { message } => {
            let coupon = load_coupon_lenient(&session).await;
            let errors = FieldErrorsView {
                general: Some(message),
                ..FieldErrorsView::default()
            };
            Ok(render_confirm(locale, &entry, coupon.as_ref(), form, errors, "", false)
                .into_response())
        }
    }
}

//! Submit eligibility gate.
//!
//! A pure predicate over the rendered form state that decides whether the
//! confirm control is enabled. This is a UI affordance only - the rule set
//! in [`super::rules`] remains the authoritative check at submit time.

use crate::checkout::form::{CheckoutForm, PaymentMethod};

/// Everything the gate looks at, captured by value/reference with no
/// access to the store or the network.
#[derive(Debug, Clone, Copy)]
pub struct EligibilityInput<'a> {
    pub form: &'a CheckoutForm,
    /// A submission is already in flight.
    pub processing: bool,
    /// The cart snapshot has no items.
    pub cart_empty: bool,
    /// A default address resolved from the address list.
    pub has_default_address: bool,
}

/// Whether the confirm control is disabled.
///
/// Pure and idempotent: identical input always yields identical output.
///
/// Cash payments may not carry gift metadata; a cash order with any gift
/// field filled is blocked here even when gift mode is off.
#[must_use]
pub fn confirm_disabled(input: &EligibilityInput<'_>) -> bool {
    // Disable if processing or cart is empty
    if input.processing || input.cart_empty {
        return true;
    }

    // Disable if no valid default address
    if !input.has_default_address {
        return true;
    }

    let form = input.form;

    // If gift option is enabled, require all gift fields
    if form.is_gift && !form.gift_fields_complete() {
        return true;
    }

    // Cash payments may not carry gift metadata
    if form.payment_method == PaymentMethod::Cash && form.any_gift_field_filled() {
        return true;
    }

    // Cash needs no further checks
    if form.payment_method == PaymentMethod::Cash {
        return false;
    }

    // For credit-card, require non-empty card fields (presence only)
    !form.card_fields_present()
}

//! Checkout form state and field-scoped errors.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Payment method selected on the confirmation form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[default]
    #[serde(rename = "cash")]
    Cash,
    #[serde(rename = "credit-card")]
    CreditCard,
}

impl PaymentMethod {
    /// The wire/form value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::CreditCard => "credit-card",
        }
    }
}

/// The order-entry form as posted from the confirmation page.
///
/// Field names match the form input names.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutForm {
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub card_number: String,
    #[serde(default)]
    pub card_holder: String,
    #[serde(default)]
    pub expiry_date: String,
    #[serde(default)]
    pub cvv: String,
    #[serde(default, deserialize_with = "checkbox")]
    pub is_gift: bool,
    #[serde(default)]
    pub gift_first_name: String,
    #[serde(default)]
    pub gift_last_name: String,
    #[serde(default)]
    pub gift_phone_number: String,
}

/// HTML checkboxes post "on" when checked and nothing otherwise.
fn checkbox<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(matches!(raw.as_deref(), Some("on" | "true" | "1")))
}

impl CheckoutForm {
    /// True when every gift field is non-blank after trimming.
    #[must_use]
    pub fn gift_fields_complete(&self) -> bool {
        !self.gift_first_name.trim().is_empty()
            && !self.gift_last_name.trim().is_empty()
            && !self.gift_phone_number.trim().is_empty()
    }

    /// True when any gift field carries a non-blank value.
    #[must_use]
    pub fn any_gift_field_filled(&self) -> bool {
        !self.gift_first_name.trim().is_empty()
            || !self.gift_last_name.trim().is_empty()
            || !self.gift_phone_number.trim().is_empty()
    }

    /// True when every card field is non-blank. A presence check only;
    /// format validation lives in the rule set.
    #[must_use]
    pub fn card_fields_present(&self) -> bool {
        !self.card_number.trim().is_empty()
            && !self.card_holder.trim().is_empty()
            && !self.expiry_date.trim().is_empty()
            && !self.cvv.trim().is_empty()
    }
}

/// A validatable form field.
///
/// Declaration order is the focus priority order: when several fields fail
/// at once, the first of them in this order receives input focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Field {
    GiftFirstName,
    GiftLastName,
    GiftPhone,
    CardNumber,
    CardHolder,
    Expiry,
    Cvv,
}

impl Field {
    /// Focus priority order. This is a fixed contract.
    pub const FOCUS_ORDER: [Self; 7] = [
        Self::GiftFirstName,
        Self::GiftLastName,
        Self::GiftPhone,
        Self::CardNumber,
        Self::CardHolder,
        Self::Expiry,
        Self::Cvv,
    ];

    /// The form input name this field maps to.
    #[must_use]
    pub const fn input_name(self) -> &'static str {
        match self {
            Self::GiftFirstName => "giftFirstName",
            Self::GiftLastName => "giftLastName",
            Self::GiftPhone => "giftPhoneNumber",
            Self::CardNumber => "cardNumber",
            Self::CardHolder => "cardHolder",
            Self::Expiry => "expiryDate",
            Self::Cvv => "cvv",
        }
    }
}

/// Field-to-message mapping produced by the validator.
///
/// Empty means the form is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    entries: BTreeMap<Field, &'static str>,
}

impl FormErrors {
    /// Record an error for a field, replacing any earlier one.
    pub fn insert(&mut self, field: Field, message: &'static str) {
        self.entries.insert(field, message);
    }

    /// The error message for a field, if any.
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&'static str> {
        self.entries.get(&field).copied()
    }

    /// True when no field has an error.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of failing fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The field that should receive input focus: the first failing field
    /// in [`Field::FOCUS_ORDER`].
    #[must_use]
    pub fn first_focus(&self) -> Option<Field> {
        Field::FOCUS_ORDER
            .into_iter()
            .find(|field| self.entries.contains_key(field))
    }
}

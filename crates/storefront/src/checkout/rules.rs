//! Checkout form validation rules.
//!
//! Validation is a flat rule set evaluated top-to-bottom in focus priority
//! order. Every applicable rule runs, so a form can fail several fields at
//! once; precedence only decides which field gets focus.

use std::sync::LazyLock;

use chrono::{DateTime, Datelike, Utc};
use regex::Regex;

use crate::checkout::form::{CheckoutForm, Field, FormErrors, PaymentMethod};
use crate::i18n::Messages;

/// Four groups of four digits separated by single spaces.
static CARD_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4} \d{4} \d{4} \d{4}$").expect("card number regex"));

/// MM/YY with month 01-12 and a two-digit year 20-99.
static EXPIRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(0[1-9]|1[0-2])/([2-9][0-9])$").expect("expiry regex"));

/// Country-code-prefixed subscriber number: 8-15 digits, no leading zero.
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[1-9][0-9]{7,14}$").expect("phone regex"));

/// A calendar year-month, used to evaluate card expiry.
///
/// Passed in explicitly so expiry checks are deterministic under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    #[must_use]
    pub const fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    /// The current UTC year-month.
    #[must_use]
    pub fn current() -> Self {
        Self::from(Utc::now())
    }
}

impl From<DateTime<Utc>> for YearMonth {
    fn from(moment: DateTime<Utc>) -> Self {
        Self {
            year: moment.year(),
            month: moment.month(),
        }
    }
}

/// One validation rule.
///
/// Variants are ordered by focus priority; [`Rule::ALL`] preserves that
/// order for the evaluation loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    GiftFirstNamePresent,
    GiftLastNamePresent,
    GiftPhoneStructure,
    CardNumberFormat,
    CardHolderPresent,
    ExpiryCurrent,
    CvvFormat,
}

impl Rule {
    /// Evaluation order, matching [`Field::FOCUS_ORDER`].
    pub const ALL: [Self; 7] = [
        Self::GiftFirstNamePresent,
        Self::GiftLastNamePresent,
        Self::GiftPhoneStructure,
        Self::CardNumberFormat,
        Self::CardHolderPresent,
        Self::ExpiryCurrent,
        Self::CvvFormat,
    ];

    /// The field this rule reports against.
    #[must_use]
    pub const fn field(self) -> Field {
        match self {
            Self::GiftFirstNamePresent => Field::GiftFirstName,
            Self::GiftLastNamePresent => Field::GiftLastName,
            Self::GiftPhoneStructure => Field::GiftPhone,
            Self::CardNumberFormat => Field::CardNumber,
            Self::CardHolderPresent => Field::CardHolder,
            Self::ExpiryCurrent => Field::Expiry,
            Self::CvvFormat => Field::Cvv,
        }
    }

    /// Whether this rule applies to the given form state.
    ///
    /// Gift rules apply only in gift mode; card rules only for card
    /// payment. Cash without gift mode has no applicable rules at all.
    #[must_use]
    pub fn applies(self, form: &CheckoutForm) -> bool {
        match self {
            Self::GiftFirstNamePresent | Self::GiftLastNamePresent | Self::GiftPhoneStructure => {
                form.is_gift
            }
            Self::CardNumberFormat
            | Self::CardHolderPresent
            | Self::ExpiryCurrent
            | Self::CvvFormat => form.payment_method == PaymentMethod::CreditCard,
        }
    }

    /// Check the rule, returning the localized message on violation.
    #[must_use]
    pub fn violation(
        self,
        form: &CheckoutForm,
        now: YearMonth,
        messages: &'static Messages,
    ) -> Option<&'static str> {
        match self {
            Self::GiftFirstNamePresent => form
                .gift_first_name
                .trim()
                .is_empty()
                .then_some(messages.gift_first_name_required),
            Self::GiftLastNamePresent => form
                .gift_last_name
                .trim()
                .is_empty()
                .then_some(messages.gift_last_name_required),
            Self::GiftPhoneStructure => {
                (!is_structurally_valid_phone(&form.gift_phone_number))
                    .then_some(messages.invalid_gift_phone)
            }
            Self::CardNumberFormat => (!CARD_NUMBER_RE.is_match(&form.card_number))
                .then_some(messages.invalid_card_number),
            Self::CardHolderPresent => form
                .card_holder
                .trim()
                .is_empty()
                .then_some(messages.card_holder_required),
            Self::ExpiryCurrent => match parse_expiry(&form.expiry_date) {
                None => Some(messages.invalid_expiry_date),
                Some((year, month)) => {
                    let expired = year < now.year || (year == now.year && month < now.month);
                    expired.then_some(messages.expired_card)
                }
            },
            Self::CvvFormat => {
                let digits: String = form.cvv.chars().filter(char::is_ascii_digit).collect();
                (!matches!(digits.len(), 3 | 4)).then_some(messages.invalid_cvv)
            }
        }
    }
}

/// Run the full rule set against the form.
///
/// Returns every violation at once; an empty result means the form is
/// valid.
#[must_use]
pub fn validate(form: &CheckoutForm, now: YearMonth, messages: &'static Messages) -> FormErrors {
    let mut errors = FormErrors::default();
    for rule in Rule::ALL {
        if !rule.applies(form) {
            continue;
        }
        if let Some(message) = rule.violation(form, now, messages) {
            errors.insert(rule.field(), message);
        }
    }
    errors
}

/// Parse an `MM/YY` expiry into `(full_year, month)`.
fn parse_expiry(raw: &str) -> Option<(i32, u32)> {
    let captures = EXPIRY_RE.captures(raw)?;
    let month: u32 = captures.get(1)?.as_str().parse().ok()?;
    let year: i32 = captures.get(2)?.as_str().parse().ok()?;
    Some((2000 + year, month))
}

/// Structural phone validation: after stripping separators, the value must
/// be a country-code-prefixed digit string (E.164 shape, without the plus).
fn is_structurally_valid_phone(raw: &str) -> bool {
    let stripped: String = raw
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();
    PHONE_RE.is_match(&stripped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Locale;

    fn messages() -> &'static Messages {
        Messages::for_locale(Locale::En)
    }

    fn credit_card_form() -> CheckoutForm {
        CheckoutForm {
            payment_method: PaymentMethod::CreditCard,
            card_number: "4111 1111 1111 1111".to_string(),
            card_holder: "Rana Haddad".to_string(),
            expiry_date: "12/29".to_string(),
            cvv: "123".to_string(),
            ..CheckoutForm::default()
        }
    }

    const NOW: YearMonth = YearMonth::new(2025, 6);

    #[test]
    fn test_cash_without_gift_is_always_valid() {
        let form = CheckoutForm::default();
        assert!(validate(&form, NOW, messages()).is_empty());

        // Garbage card fields are ignored for cash payments
        let form = CheckoutForm {
            card_number: "garbage".to_string(),
            cvv: "x".to_string(),
            ..CheckoutForm::default()
        };
        assert!(validate(&form, NOW, messages()).is_empty());
    }

    #[test]
    fn test_card_number_must_match_grouped_pattern() {
        for bad in ["4111111111111111", "4111-1111-1111-1111", "4111 1111 1111", ""] {
            let form = CheckoutForm {
                card_number: bad.to_string(),
                ..credit_card_form()
            };
            let errors = validate(&form, NOW, messages());
            assert_eq!(
                errors.get(Field::CardNumber),
                Some(messages().invalid_card_number),
                "expected card number error for {bad:?}"
            );
        }
    }

    #[test]
    fn test_valid_credit_card_form() {
        let errors = validate(&credit_card_form(), NOW, messages());
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    }

    #[test]
    fn test_expiry_boundary() {
        let form = CheckoutForm {
            expiry_date: "01/24".to_string(),
            ..credit_card_form()
        };

        // After January 2024 the card is expired
        let errors = validate(&form, YearMonth::new(2024, 2), messages());
        assert_eq!(errors.get(Field::Expiry), Some(messages().expired_card));

        // Before January 2024 it is fine
        let errors = validate(&form, YearMonth::new(2023, 12), messages());
        assert_eq!(errors.get(Field::Expiry), None);

        // The current month itself is still valid
        let errors = validate(&form, YearMonth::new(2024, 1), messages());
        assert_eq!(errors.get(Field::Expiry), None);
    }

    #[test]
    fn test_expiry_format_errors() {
        for bad in ["1/24", "13/24", "01/1", "01-24", "0124"] {
            let form = CheckoutForm {
                expiry_date: bad.to_string(),
                ..credit_card_form()
            };
            let errors = validate(&form, NOW, messages());
            assert_eq!(
                errors.get(Field::Expiry),
                Some(messages().invalid_expiry_date),
                "expected format error for {bad:?}"
            );
        }
    }

    #[test]
    fn test_cvv_strips_non_digits() {
        let form = CheckoutForm {
            cvv: " 1 2 3 ".to_string(),
            ..credit_card_form()
        };
        assert!(validate(&form, NOW, messages()).is_empty());

        let form = CheckoutForm {
            cvv: "12".to_string(),
            ..credit_card_form()
        };
        assert_eq!(
            validate(&form, NOW, messages()).get(Field::Cvv),
            Some(messages().invalid_cvv)
        );

        let form = CheckoutForm {
            cvv: "12345".to_string(),
            ..credit_card_form()
        };
        assert_eq!(
            validate(&form, NOW, messages()).get(Field::Cvv),
            Some(messages().invalid_cvv)
        );
    }

    #[test]
    fn test_gift_rules_apply_only_in_gift_mode() {
        let form = CheckoutForm {
            is_gift: false,
            gift_phone_number: "not a phone".to_string(),
            ..CheckoutForm::default()
        };
        assert!(validate(&form, NOW, messages()).is_empty());

        let form = CheckoutForm {
            is_gift: true,
            gift_first_name: "Omar".to_string(),
            gift_last_name: "Khalil".to_string(),
            gift_phone_number: "962791234567".to_string(),
            ..CheckoutForm::default()
        };
        assert!(validate(&form, NOW, messages()).is_empty());
    }

    #[test]
    fn test_gift_phone_structure() {
        for bad in ["", "0791234567", "12345", "96279abc4567", "1234567890123456"] {
            let form = CheckoutForm {
                is_gift: true,
                gift_first_name: "Omar".to_string(),
                gift_last_name: "Khalil".to_string(),
                gift_phone_number: bad.to_string(),
                ..CheckoutForm::default()
            };
            let errors = validate(&form, NOW, messages());
            assert_eq!(
                errors.get(Field::GiftPhone),
                Some(messages().invalid_gift_phone),
                "expected phone error for {bad:?}"
            );
        }

        assert!(is_structurally_valid_phone("962 79 123 4567"));
        assert!(is_structurally_valid_phone("1-212-555-0100"));
    }

    #[test]
    fn test_multiple_errors_reported_together() {
        let form = CheckoutForm {
            payment_method: PaymentMethod::CreditCard,
            is_gift: true,
            ..CheckoutForm::default()
        };
        let errors = validate(&form, NOW, messages());
        assert_eq!(errors.len(), 7);
        assert_eq!(errors.first_focus(), Some(Field::GiftFirstName));
    }

    #[test]
    fn test_gift_errors_localized() {
        let form = CheckoutForm {
            is_gift: true,
            ..CheckoutForm::default()
        };
        let ar = Messages::for_locale(Locale::Ar);
        let errors = validate(&form, NOW, ar);
        assert_eq!(
            errors.get(Field::GiftFirstName),
            Some(ar.gift_first_name_required)
        );
    }
}

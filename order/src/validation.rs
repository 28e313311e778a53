//! Submission rules for an order draft.
//!
//! Nothing is validated while the customer types. At submission three checks
//! run in a fixed order and the first failure wins: name, phone, base.

use crate::types::{BaseKind, OrderDraft};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// North-American phone number: optional `+1`/`1` prefix, optional
/// parenthesized area code, then 3-3-4 digits with optional space, dot or
/// hyphen separators.
#[allow(clippy::expect_used)] // Literal pattern, checked by tests
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\+?1[-.\s]?)?\(?[0-9]{3}\)?[-.\s]?[0-9]{3}[-.\s]?[0-9]{4}$")
        .expect("Invalid phone regex")
});

/// Errors reported back to the customer
///
/// None of them is fatal: the session stays usable and the customer may
/// correct the input and try again.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// Name is empty after trimming
    #[error("Please enter your name")]
    MissingName,

    /// Phone number does not look like a North-American number
    #[error("Please enter a valid phone number")]
    InvalidPhone,

    /// No base has been picked
    #[error("Please choose Matcha or Viet Coffee")]
    MissingBase,

    /// The order was already placed; only a reset is accepted
    #[error("This order has already been placed, start a new order to make changes")]
    NotEditing,

    /// No order id unique within the session could be drawn
    #[error("Could not assign an order number, please submit again")]
    OrderIdUnavailable,
}

impl OrderError {
    /// Short machine-readable reason, used as a metrics label
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::MissingName => "missing_name",
            Self::InvalidPhone => "invalid_phone",
            Self::MissingBase => "missing_base",
            Self::NotEditing => "not_editing",
            Self::OrderIdUnavailable => "order_id_unavailable",
        }
    }
}

/// Whether the name is non-empty after trimming
#[must_use]
pub fn validate_name(name: &str) -> bool {
    !name.trim().is_empty()
}

/// Whether the trimmed input is a North-American phone number
#[must_use]
pub fn validate_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone.trim())
}

/// Runs the submission checks in order, returning the chosen base on success
///
/// # Errors
///
/// Returns the first failing check: [`OrderError::MissingName`],
/// [`OrderError::InvalidPhone`] or [`OrderError::MissingBase`].
pub fn validate_for_submit(draft: &OrderDraft) -> Result<BaseKind, OrderError> {
    if !validate_name(&draft.name) {
        return Err(OrderError::MissingName);
    }

    if !validate_phone(&draft.phone) {
        return Err(OrderError::InvalidPhone);
    }

    draft.base.ok_or(OrderError::MissingBase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_phone_layouts() {
        for phone in [
            "555-123-4567",
            "(555) 123-4567",
            "+1 555.123.4567",
            "5551234567",
            "1-555-123-4567",
            "+1(555)123-4567",
            "  555 123 4567  ",
        ] {
            assert!(validate_phone(phone), "expected {phone:?} to validate");
        }
    }

    #[test]
    fn rejects_malformed_phones() {
        for phone in [
            "12345",
            "555-123-456",
            "",
            "   ",
            "555-123-45678",
            "+44 20 7946 0958",
            "555_123_4567",
            "abc-def-ghij",
        ] {
            assert!(!validate_phone(phone), "expected {phone:?} to be rejected");
        }
    }

    #[test]
    fn rejects_non_ascii_digits() {
        // Arabic-Indic digits are decimal digits but not phone digits
        assert!(!validate_phone("٥٥٥-١٢٣-٤٥٦٧"));
    }

    #[test]
    fn name_must_have_visible_text() {
        assert!(validate_name("Mina"));
        assert!(validate_name("  Mina "));
        assert!(!validate_name(""));
        assert!(!validate_name(" \t\n"));
    }

    #[test]
    fn name_is_checked_first() {
        let draft = OrderDraft::new();
        assert_eq!(validate_for_submit(&draft), Err(OrderError::MissingName));
    }

    #[test]
    fn phone_is_checked_before_base() {
        let mut draft = OrderDraft::new();
        draft.set_name("Mina");
        draft.set_phone("12345");
        assert_eq!(validate_for_submit(&draft), Err(OrderError::InvalidPhone));
    }

    #[test]
    fn base_is_required() {
        let mut draft = OrderDraft::new();
        draft.set_name("Mina");
        draft.set_phone("555-123-4567");
        assert_eq!(validate_for_submit(&draft), Err(OrderError::MissingBase));

        draft.set_base(BaseKind::VietCoffee);
        assert_eq!(validate_for_submit(&draft), Ok(BaseKind::VietCoffee));
    }

    #[test]
    fn messages_match_the_form() {
        assert_eq!(OrderError::MissingName.to_string(), "Please enter your name");
        assert_eq!(
            OrderError::InvalidPhone.to_string(),
            "Please enter a valid phone number"
        );
        assert_eq!(
            OrderError::MissingBase.to_string(),
            "Please choose Matcha or Viet Coffee"
        );
    }
}

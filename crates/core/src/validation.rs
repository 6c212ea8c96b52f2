//! Field-level validation.
//!
//! Validation returns either the validated value or a [`ValidationErrors`]
//! collecting one message per failed check, keyed by the form field name so
//! templates can show the message next to the input.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Card expiration in `MM/YY` form.
static CARD_EXPIRATION: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)] // Pattern is a compile-time constant
    Regex::new(r"^(0[1-9]|1[0-2])/([1-9][0-9])$").unwrap()
});

/// A failed check on one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// All failed checks for one submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{} validation error(s)", .errors.len())]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    /// An empty set of errors.
    #[must_use]
    pub const fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Record a failed check.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Record `message` on `field` unless `ok` holds.
    pub fn check(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.add(field, message);
        }
    }

    /// Whether no check failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of failed checks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Whether `field` has at least one error.
    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// First message recorded for `field`.
    #[must_use]
    pub fn first(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// All failed checks in the order they were recorded.
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// `Ok(value)` when no check failed, otherwise `Err(self)`.
    ///
    /// # Errors
    ///
    /// Returns `self` if any check failed.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

/// Whether `value` is present and holds a non-whitespace character.
#[must_use]
pub fn is_present(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

/// Whether `value`, once trimmed, has at most `max` characters.
///
/// An absent value fits; presence is checked separately.
#[must_use]
pub fn fits_within(value: Option<&str>, max: usize) -> bool {
    value.is_none_or(|v| v.trim().chars().count() <= max)
}

/// Luhn checksum over the digits of a card number.
///
/// Spaces and dashes are ignored. Anything else that is not a digit fails, as
/// do inputs with fewer than 12 or more than 19 digits.
#[must_use]
pub fn is_valid_card_number(number: &str) -> bool {
    let mut digits = Vec::with_capacity(number.len());
    for c in number.chars() {
        match c {
            ' ' | '-' => {}
            _ => match c.to_digit(10) {
                Some(d) => digits.push(d),
                None => return false,
            },
        }
    }

    if !(12..=19).contains(&digits.len()) {
        return false;
    }

    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();

    sum % 10 == 0
}

/// Whether `value` is a card expiration in `MM/YY` form.
#[must_use]
pub fn is_valid_card_expiration(value: &str) -> bool {
    CARD_EXPIRATION.is_match(value)
}

/// Whether `value` is a three digit CVV.
#[must_use]
pub fn is_valid_cvv(value: &str) -> bool {
    value.len() == 3 && value.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_luhn_accepts_known_test_numbers() {
        assert!(is_valid_card_number("4111111111111111"));
        assert!(is_valid_card_number("4111 1111 1111 1111"));
        assert!(is_valid_card_number("5500-0000-0000-0004"));
        assert!(is_valid_card_number("378282246310005"));
    }

    #[test]
    fn test_luhn_rejects_bad_numbers() {
        assert!(!is_valid_card_number("4111111111111112"));
        assert!(!is_valid_card_number(""));
        assert!(!is_valid_card_number("4111x11111111111"));
        assert!(!is_valid_card_number("00000"));
    }

    #[test]
    fn test_card_expiration_format() {
        assert!(is_valid_card_expiration("01/27"));
        assert!(is_valid_card_expiration("12/30"));
        assert!(!is_valid_card_expiration("13/27"));
        assert!(!is_valid_card_expiration("00/27"));
        assert!(!is_valid_card_expiration("1/27"));
        assert!(!is_valid_card_expiration("01/07"));
        assert!(!is_valid_card_expiration("01-27"));
    }

    #[test]
    fn test_cvv() {
        assert!(is_valid_cvv("123"));
        assert!(!is_valid_cvv("12"));
        assert!(!is_valid_cvv("1234"));
        assert!(!is_valid_cvv("12a"));
    }

    #[test]
    fn test_errors_lookup() {
        let mut errors = ValidationErrors::new();
        errors.check(true, "name", "unused");
        errors.add("name", "too short");
        errors.add("name", "second");
        errors.add("ingredients", "pick one");

        assert_eq!(errors.len(), 3);
        assert!(errors.has("ingredients"));
        assert!(!errors.has("zip"));
        assert_eq!(errors.first("name"), Some("too short"));
        assert_eq!(errors.to_string(), "3 validation error(s)");
        assert!(errors.into_result(()).is_err());
        assert_eq!(ValidationErrors::new().into_result(5), Ok(5));
    }

    #[test]
    fn test_fits_within() {
        assert!(fits_within(None, 3));
        assert!(fits_within(Some("  abc  "), 3));
        assert!(fits_within(Some("ñañ"), 3));
        assert!(!fits_within(Some("abcd"), 3));
    }

    #[test]
    fn test_is_present() {
        assert!(is_present(Some("x")));
        assert!(!is_present(Some("  ")));
        assert!(!is_present(None));
    }
}

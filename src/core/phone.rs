//! Phone number cleanup shared by every source.
//!
//! Numbers come in every shape exhibitors type them: `+34 (91) 722-30-00`,
//! `0034917223000`, `917 22 30 00`. They are reduced to a bare digit string,
//! checked against a loose international pattern, and given a default
//! country code when they look too short to carry one.

use regex::Regex;
use std::sync::LazyLock;

/// Digit count from which a number is assumed to already carry its country code.
pub const MIN_INTERNATIONAL_DIGITS: usize = 11;

/// Longest digit string still accepted as a phone number.
pub const MAX_PHONE_DIGITS: usize = 13;

static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\+\d{1,3})?\s?\(?\d{1,4}\)?[\s.-]?\d{3}[\s.-]?\d{4}").expect("valid phone regex")
});

/// Keeps the ASCII digits of `raw` and drops leading zeros, so an `00`
/// international prefix collapses onto the country code.
/// Returns `None` when `raw` has no digit at all.
pub fn digits_only(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() {
        Some("0".to_string())
    } else {
        Some(trimmed.to_string())
    }
}

pub fn is_valid_phone(candidate: &str) -> bool {
    if candidate.chars().any(char::is_alphabetic) {
        return false;
    }
    match digits_only(candidate) {
        Some(digits) => digits.len() <= MAX_PHONE_DIGITS && PHONE_PATTERN.is_match(&digits),
        None => false,
    }
}

/// Digit form of `raw` if it passes [`is_valid_phone`].
pub fn recreate_phone_number(raw: Option<&str>) -> Option<String> {
    let raw = raw?;
    if !is_valid_phone(raw) {
        return None;
    }
    digits_only(raw)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneNormalizer {
    country_code: String,
    min_digits: usize,
}

impl PhoneNormalizer {
    pub fn new(country_code: impl Into<String>) -> Self {
        Self {
            country_code: country_code.into(),
            min_digits: MIN_INTERNATIONAL_DIGITS,
        }
    }

    /// Numbering plans whose national numbers already reach 11 digits
    /// (Chinese mobiles) need a higher threshold.
    pub fn with_min_digits(mut self, min_digits: usize) -> Self {
        self.min_digits = min_digits;
        self
    }

    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    /// Strips everything but digits and prefixes the country code when the
    /// number is shorter than [`MIN_INTERNATIONAL_DIGITS`].
    pub fn normalize(&self, raw: Option<&str>) -> Option<String> {
        let digits = digits_only(raw?)?;
        if digits.len() < self.min_digits {
            Some(format!("{}{}", self.country_code, digits))
        } else {
            Some(digits)
        }
    }
}

impl Default for PhoneNormalizer {
    fn default() -> Self {
        Self::new("34")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_numbers_pass_through() {
        let normalizer = PhoneNormalizer::new("34");
        assert_eq!(
            normalizer.normalize(Some("34917223000")),
            Some("34917223000".to_string())
        );
        assert_eq!(
            normalizer.normalize(Some("+86 138 0013 8000")),
            Some("8613800138000".to_string())
        );
    }

    #[test]
    fn test_short_numbers_get_country_code() {
        let spain = PhoneNormalizer::new("34");
        assert_eq!(
            spain.normalize(Some("917 22 30 00")),
            Some("34917223000".to_string())
        );

        let china = PhoneNormalizer::new("86");
        assert_eq!(china.normalize(Some("1380013800")), Some("861380013800".to_string()));
    }

    #[test]
    fn test_min_digits_override() {
        let china = PhoneNormalizer::new("86").with_min_digits(12);
        assert_eq!(
            china.normalize(Some("138 0013 8000")),
            Some("8613800138000".to_string())
        );
        assert_eq!(
            china.normalize(Some("8613800138000")),
            Some("8613800138000".to_string())
        );
    }

    #[test]
    fn test_absent_input_is_not_an_error() {
        let normalizer = PhoneNormalizer::default();
        assert_eq!(normalizer.normalize(None), None);
        assert_eq!(normalizer.normalize(Some("")), None);
        assert_eq!(normalizer.normalize(Some("n/a")), None);
    }

    #[test]
    fn test_international_prefix_collapses() {
        assert_eq!(digits_only("0034 917 223 000"), Some("34917223000".to_string()));
        assert_eq!(digits_only("000"), Some("0".to_string()));
        assert_eq!(digits_only("tel:"), None);
    }

    #[test]
    fn test_is_valid_phone() {
        assert!(is_valid_phone("+34 917 223 000"));
        assert!(is_valid_phone("(91) 722-3000"));
        assert!(!is_valid_phone("+34 917 ext 3000"));
        assert!(!is_valid_phone("12345"));
        assert!(!is_valid_phone("12345678901234"));
        assert!(!is_valid_phone(""));
        assert!(!is_valid_phone("info@example.com"));
    }

    #[test]
    fn test_recreate_phone_number() {
        assert_eq!(
            recreate_phone_number(Some("+34 (91) 722-30-00")),
            Some("34917223000".to_string())
        );
        assert_eq!(recreate_phone_number(Some("Call us")), None);
        assert_eq!(recreate_phone_number(None), None);
    }
}

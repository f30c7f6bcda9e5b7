//! Phone number normalization.
//!
//! Two rules exist and are deliberately kept apart:
//!
//! - [`normalize_phone`] is used for cell values. It accepts an 11-digit number with a leading
//!   country code `1`.
//! - [`strict_phone`] is used while building the contact index. It accepts exactly ten digits
//!   and nothing else.

use crate::types::NormalizedPhone;

/// Keep only the ASCII digits of `raw`.
pub fn digits_of(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Normalize a raw phone cell to `DDD.DDD.DDDD`.
///
/// Non-digits are stripped; an 11-digit result starting with `1` loses that `1`. Any digit
/// count other than ten yields `None`.
pub fn normalize_phone(raw: &str) -> Option<NormalizedPhone> {
    let digits = digits_of(raw);
    let digits = match digits.strip_prefix('1') {
        Some(rest) if digits.len() == 11 => rest,
        _ => digits.as_str(),
    };
    NormalizedPhone::from_ten_digits(digits)
}

/// Ten digits exactly, no country-code handling.
pub fn strict_phone(raw: &str) -> Option<NormalizedPhone> {
    NormalizedPhone::from_ten_digits(&digits_of(raw.trim()))
}

#[cfg(test)]
mod tests {
    use super::{normalize_phone, strict_phone};

    fn norm(raw: &str) -> Option<String> {
        normalize_phone(raw).map(|p| p.as_str().to_string())
    }

    #[test]
    fn formats_common_ten_digit_shapes() {
        for raw in ["(555) 123-4567", "555-123-4567", "555.123.4567", "5551234567", " 555 123 4567 "] {
            assert_eq!(norm(raw).as_deref(), Some("555.123.4567"), "input {raw:?}");
        }
    }

    #[test]
    fn drops_leading_country_code() {
        assert_eq!(norm("+1 (555) 123-4567").as_deref(), Some("555.123.4567"));
        assert_eq!(norm("15551234567").as_deref(), Some("555.123.4567"));
    }

    #[test]
    fn eleven_digits_without_leading_one_is_invalid() {
        assert_eq!(norm("25551234567"), None);
    }

    #[test]
    fn other_digit_counts_are_invalid() {
        for raw in ["", "bad", "555-1234", "555123456", "555 123 4567 ext 89", "1-555-123-45678"] {
            assert_eq!(norm(raw), None, "input {raw:?}");
        }
    }

    #[test]
    fn output_keeps_the_input_digits() {
        let p = normalize_phone("1 (206) 555-0199").unwrap();
        assert_eq!(p.as_str().replace('.', ""), "2065550199");
    }

    #[test]
    fn strict_rule_rejects_country_code() {
        assert_eq!(
            strict_phone("(555) 123-4567").map(|p| p.to_string()).as_deref(),
            Some("555.123.4567")
        );
        assert_eq!(strict_phone("1-555-123-4567"), None);
        assert_eq!(strict_phone(""), None);
    }
}

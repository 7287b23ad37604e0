#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Agency and ground-staff identity rules.
//!
//! Mobile numbers are login credentials, so their shape is enforced the same
//! way everywhere: input is sanitized per keystroke (digits only, capped at
//! 10) and validated before submission. Agency logins accept any 10-digit
//! number; ground-staff numbers must additionally start 6-9.

use std::sync::OnceLock;

use regex::Regex;

fn agency_mobile_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{10}$").expect("valid mobile number regex"))
}

fn staff_mobile_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[6-9]\d{9}$").expect("valid staff number regex"))
}

/// Strips non-digit characters and caps the result at 10 digits.
///
/// Applied per keystroke in the entry flows, so invalid characters never
/// accumulate in the field rather than being rejected after submit.
#[must_use]
pub fn sanitize_mobile_input(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).take(10).collect()
}

/// Returns `true` if `number` is exactly 10 digits (agency login format).
#[must_use]
pub fn is_valid_agency_mobile(number: &str) -> bool {
    agency_mobile_re().is_match(number)
}

/// Returns `true` if `number` is a valid Indian mobile number: 10 digits
/// starting 6-9 (ground-staff onboarding format).
#[must_use]
pub fn is_valid_staff_number(number: &str) -> bool {
    staff_mobile_re().is_match(number)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_non_digits() {
        assert_eq!(sanitize_mobile_input("98-613 749a62"), "9861374962");
        assert_eq!(sanitize_mobile_input("+91 98613 74962"), "9198613749");
        assert_eq!(sanitize_mobile_input(""), "");
    }

    #[test]
    fn sanitize_caps_at_ten_digits() {
        assert_eq!(sanitize_mobile_input("123456789012345"), "1234567890");
    }

    #[test]
    fn agency_mobile_requires_exactly_ten_digits() {
        assert!(is_valid_agency_mobile("1234567890"));
        assert!(!is_valid_agency_mobile("123456789"));
        assert!(!is_valid_agency_mobile("12345678901"));
        assert!(!is_valid_agency_mobile("12345abcde"));
    }

    #[test]
    fn staff_number_must_start_six_through_nine() {
        assert!(is_valid_staff_number("9861374962"));
        assert!(is_valid_staff_number("6000000000"));
        assert!(!is_valid_staff_number("1234567890"));
        assert!(!is_valid_staff_number("586137496"));
    }
}

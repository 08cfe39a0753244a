/// Canonical digit form of a submitted phone number so two submissions of
/// the same number compare equal regardless of separators or country code.
///
/// Indian mobile numbers (10 digits starting 6-9) are reduced to their bare
/// 10-digit form; anything else keeps its full digit string.
pub fn normalize_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return String::new();
    }

    if digits.len() >= 10 {
        if digits.starts_with("91") && digits.len() == 12 {
            let mobile = &digits[2..];
            if starts_with_mobile_digit(mobile) {
                return mobile.to_string();
            }
        } else if digits.len() == 10 && starts_with_mobile_digit(&digits) {
            return digits;
        } else if digits.len() > 10 {
            let last10 = &digits[digits.len() - 10..];
            if starts_with_mobile_digit(last10) {
                return last10.to_string();
            }
        }
    }

    digits
}

fn starts_with_mobile_digit(s: &str) -> bool {
    matches!(s.as_bytes().first(), Some(b'6'..=b'9'))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneValidation {
    pub valid: bool,
    pub error: Option<&'static str>,
    pub normalized: String,
}

/// Plausibility check only: a 7-15 digit band after stripping separators.
/// No checksum or region rules beyond the Indian heuristic above.
pub fn validate_phone(phone: &str) -> PhoneValidation {
    if phone.is_empty() {
        return PhoneValidation {
            valid: false,
            error: Some("Phone number is required"),
            normalized: String::new(),
        };
    }

    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() < 7 {
        return PhoneValidation {
            valid: false,
            error: Some("Phone number too short"),
            normalized: digits,
        };
    }

    if digits.len() > 15 {
        return PhoneValidation {
            valid: false,
            error: Some("Phone number too long"),
            normalized: digits,
        };
    }

    PhoneValidation {
        valid: true,
        error: None,
        normalized: normalize_phone(phone),
    }
}

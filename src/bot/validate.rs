use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::LazyLock;

/// A single word of letters: no digits, punctuation or whitespace.
static NAME_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\p{Alphabetic}+$").ok());

/// Largest magnitude a single record may carry. Keeps every per-friend
/// total far inside `Decimal`'s range.
pub(crate) const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0); // 1_000_000_000_000

/// Optional sign, then digits with an optional fraction, or a bare fraction.
static AMOUNT_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[+-]?([0-9]+(\.[0-9]+)?|\.[0-9]+)$").ok());

pub(crate) fn is_valid_name(input: &str) -> bool {
    NAME_RE.as_ref().is_some_and(|re| re.is_match(input))
}

pub(crate) fn is_valid_amount(input: &str) -> bool {
    AMOUNT_RE.as_ref().is_some_and(|re| re.is_match(input))
}

/// Parse a user-typed amount. Returns `None` for anything outside the
/// amount grammar, and for magnitudes above [`MAX_AMOUNT`].
pub(crate) fn parse_amount(input: &str) -> Option<Decimal> {
    if !is_valid_amount(input) {
        return None;
    }
    let (negative, digits) = match input.as_bytes().first() {
        Some(b'-') => (true, &input[1..]),
        Some(b'+') => (false, &input[1..]),
        _ => (false, input),
    };
    let digits = if digits.starts_with('.') {
        format!("0{digits}")
    } else {
        digits.to_string()
    };
    let value = Decimal::from_str(&digits).ok()?;
    if value > MAX_AMOUNT {
        return None;
    }
    Some(if negative { -value } else { value })
}

/// Parse a record id as typed or tapped: `12` or `#12`.
pub(crate) fn parse_record_id(input: &str) -> Option<i64> {
    let trimmed = input.trim();
    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Only a case-insensitive "yes" confirms a destructive action.
pub(crate) fn is_yes(input: &str) -> bool {
    input.trim().eq_ignore_ascii_case("yes")
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
